//! Billing Domain - Subscription Billing Runs
//!
//! This crate turns the active subscribers of a billing period into
//! invoices, collects payment for each, notifies every subscriber, and
//! exports the batch.
//!
//! # Invoice Snapshots
//!
//! An [`Invoice`] copies the subscriber's name, email, billing address, plan
//! name and price when it is created. It stays a historical record even if
//! the subscriber moves or the plan is repriced later. Its only mutable
//! state is the one-way `open → paid` transition.
//!
//! # Failure Semantics
//!
//! - A declined payment is contained: the invoice stays open, the observer
//!   is told, and the run moves on.
//! - Failing to load subscribers, to notify any invoice, or to export the
//!   batch aborts the run with a [`BillingRunError`] and no report.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingRun, CallbackObserver};
//!
//! let observer = CallbackObserver::new(
//!     |stage, current, total| println!("{stage}: {current}/{total}"),
//!     |invoice, reason| eprintln!("{invoice}: {reason}"),
//! );
//! let report = billing_run.run(period, &observer).await?;
//! ```

pub mod subscriber;
pub mod invoice;
pub mod ports;
pub mod observer;
pub mod report;
pub mod run;
pub mod error;

pub use subscriber::{Address, Subscriber, SubscriptionPlan};
pub use invoice::{Invoice, InvoiceStatus};
pub use ports::{
    AuthorizationOutcome, BatchExporter, ExportLocation, Notifier, PaymentAuthorizer,
    SubscriberSource,
};
pub use observer::{CallbackObserver, NoopObserver, RunObserver, RunStage};
pub use report::{AuthorizationFailure, BillingRunReport};
pub use run::BillingRun;
pub use error::{BillingError, BillingRunError};
