//! Reference adapters for the billing run ports
//!
//! Filesystem-backed implementations of the four ports `domain_billing`
//! defines, plus a simulated payment provider:
//!
//! | Port | Adapter |
//! |------|---------|
//! | `SubscriberSource` | [`JsonSubscriberSource`] |
//! | `PaymentAuthorizer` | [`SimulatedPaymentProvider`] |
//! | `Notifier` | [`InvoiceMailer`] over a [`MailTransport`] |
//! | `BatchExporter` | [`CsvInvoiceExporter`] |
//!
//! Adapter failures are [`InfraError`]s internally and reach the domain as
//! `PortError`s.

pub mod error;
pub mod subscribers;
pub mod payment;
pub mod notifier;
pub mod exporter;

pub use error::InfraError;
pub use subscribers::JsonSubscriberSource;
pub use payment::{SimulatedPaymentProvider, DEFAULT_FAILURE_RATE};
pub use notifier::{
    InvoiceDocumentRenderer, InvoiceMailer, LogMailTransport, MailMessage, MailTransport,
    OutboxMailTransport,
};
pub use exporter::{escape_csv_field, render_csv, CsvInvoiceExporter, CSV_HEADER};
