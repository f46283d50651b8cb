//! Billing domain errors
//!
//! [`BillingRunError`] is the fatal taxonomy of a run: if `run` returns one,
//! no report exists. Payment declines are not errors at this level; they are
//! counted in the report.

use thiserror::Error;

use core_kernel::{BillingPeriod, InvoiceId, PortError};

use crate::observer::RunStage;

/// Errors on individual billing records
#[derive(Debug, Error)]
pub enum BillingError {
    /// Subscriber record cannot be invoiced
    #[error("Subscriber {subscriber_id} cannot be billed: {reason}")]
    InvalidSubscriber {
        subscriber_id: String,
        reason: String,
    },
}

/// Errors that abort a billing run
///
/// Side effects that happened before the failure (authorized payments,
/// delivered notifications) are not rolled back.
#[derive(Debug, Error)]
pub enum BillingRunError {
    /// The active subscribers could not be loaded
    #[error("Failed to load active subscribers: {source}")]
    SubscriberSource {
        #[source]
        source: PortError,
    },

    /// Rendering or delivering one notification failed
    #[error("Notification failed for invoice {invoice_id} after {notified} of {total} were sent: {source}")]
    Notification {
        invoice_id: InvoiceId,
        notified: usize,
        total: usize,
        #[source]
        source: PortError,
    },

    /// The batch export could not be written
    #[error("Export for period {period} failed: {source}")]
    Export {
        period: BillingPeriod,
        #[source]
        source: PortError,
    },
}

impl BillingRunError {
    /// The stage the run was in when it aborted
    pub fn stage(&self) -> RunStage {
        match self {
            BillingRunError::SubscriberSource { .. } => RunStage::Load,
            BillingRunError::Notification { .. } => RunStage::Notify,
            BillingRunError::Export { .. } => RunStage::Export,
        }
    }

    /// The collaborator error behind the abort
    pub fn port_error(&self) -> &PortError {
        match self {
            BillingRunError::SubscriberSource { source }
            | BillingRunError::Notification { source, .. }
            | BillingRunError::Export { source, .. } => source,
        }
    }
}
