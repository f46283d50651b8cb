//! Custom Test Assertions
//!
//! Assertion helpers for billing types with more useful failure messages
//! than a plain `assert_eq!` on large structs.

use domain_billing::{BillingRunReport, Invoice, Subscriber};

/// Expected counts of a billing run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedCounts {
    pub generated: usize,
    pub authorized: usize,
    pub failed: usize,
    pub notified: usize,
}

/// Asserts the counters of a report
///
/// # Panics
///
/// Panics naming every counter that differs
pub fn assert_report_counts(report: &BillingRunReport, expected: ExpectedCounts) {
    let actual = ExpectedCounts {
        generated: report.invoices_generated,
        authorized: report.authorized_count,
        failed: report.failed_count(),
        notified: report.notified_count,
    };
    assert_eq!(
        actual, expected,
        "Report counts differ for run {} ({})",
        report.run_id, report.period
    );
    assert_eq!(
        report.subscribers_processed, report.invoices_generated,
        "Every processed subscriber must yield exactly one invoice"
    );
}

/// Asserts that an invoice is a faithful snapshot of the subscriber
///
/// # Panics
///
/// Panics if any copied field differs
pub fn assert_invoice_snapshot_of(invoice: &Invoice, subscriber: &Subscriber) {
    assert_eq!(invoice.subscriber_id(), subscriber.id, "subscriber id");
    assert_eq!(invoice.first_name(), subscriber.first_name, "first name");
    assert_eq!(invoice.last_name(), subscriber.last_name, "last name");
    assert_eq!(invoice.email(), subscriber.email, "email");
    assert_eq!(invoice.billing_address(), &subscriber.billing_address, "billing address");
    assert_eq!(invoice.plan_name(), subscriber.plan.name, "plan name");
    assert_eq!(invoice.price(), subscriber.plan.price, "plan price");
}

/// Asserts the paid/open state of a batch against a per-invoice expectation
pub fn assert_paid_states(invoices: &[Invoice], expected_paid: &[bool]) {
    assert_eq!(invoices.len(), expected_paid.len(), "batch length");
    for (index, (invoice, paid)) in invoices.iter().zip(expected_paid).enumerate() {
        assert_eq!(
            invoice.is_paid(),
            *paid,
            "invoice #{} ({}) expected {}",
            index + 1,
            invoice,
            if *paid { "paid" } else { "open" }
        );
    }
}
