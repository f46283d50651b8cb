//! Billing run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, InvoiceId, RunId, SubscriberId};

use crate::ports::ExportLocation;

/// One invoice whose payment could not be collected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationFailure {
    pub invoice_id: InvoiceId,
    pub subscriber_id: SubscriberId,
    pub reason: String,
}

/// Result of a completed billing run
///
/// Only produced when every stage finished. A run that aborted returns a
/// `BillingRunError` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRunReport {
    pub run_id: RunId,
    pub period: BillingPeriod,
    pub subscribers_processed: usize,
    pub invoices_generated: usize,
    pub authorized_count: usize,
    /// Failed authorizations, in processing order
    pub failures: Vec<AuthorizationFailure>,
    pub notified_count: usize,
    pub export_location: ExportLocation,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BillingRunReport {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every generated invoice was paid
    pub fn is_fully_collected(&self) -> bool {
        self.failures.is_empty()
    }

    /// Invoices left open by this run
    pub fn unpaid_invoice_ids(&self) -> Vec<InvoiceId> {
        self.failures.iter().map(|f| f.invoice_id).collect()
    }

    /// Wall-clock time the run took
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
