//! Billing Domain Ports
//!
//! The billing run talks to four collaborators, each behind a port trait so
//! it can be swapped for a file-based adapter, a real network client, or an
//! in-memory fake:
//!
//! - [`SubscriberSource`]: lists the active subscribers at run start
//! - [`PaymentAuthorizer`]: attempts to charge one invoice
//! - [`Notifier`]: renders and delivers one invoice document
//! - [`BatchExporter`]: writes the whole batch for a period
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_billing::{BillingRun, NoopObserver};
//!
//! let run = BillingRun::new(
//!     Arc::new(JsonSubscriberSource::new("subscribers.json")),
//!     Arc::new(SimulatedPaymentProvider::default()),
//!     Arc::new(InvoiceMailer::new(renderer, LogMailTransport, "billing@example.com")),
//!     Arc::new(CsvInvoiceExporter::new("var/export")),
//! );
//! let report = run.run(period, &NoopObserver).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BillingPeriod, DomainPort, PortError};

use crate::invoice::Invoice;
use crate::subscriber::Subscriber;

/// Result of one payment authorization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The charge went through
    Authorized,
    /// The charge was refused
    Declined { reason: String },
}

impl AuthorizationOutcome {
    pub fn declined(reason: impl Into<String>) -> Self {
        AuthorizationOutcome::Declined {
            reason: reason.into(),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationOutcome::Authorized)
    }
}

/// Where an export was written (a path, a URL, an object key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportLocation(String);

impl ExportLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lists subscribers to bill
#[async_trait]
pub trait SubscriberSource: DomainPort {
    /// Returns an owned snapshot of all active subscribers, in a stable order
    async fn find_active(&self) -> Result<Vec<Subscriber>, PortError>;
}

/// Charges invoices
#[async_trait]
pub trait PaymentAuthorizer: DomainPort {
    /// Attempts to collect payment for one invoice.
    ///
    /// A decline is `Ok(Declined)`. An `Err` means the attempt itself could
    /// not be made; the billing run treats both the same way.
    async fn authorize(&self, invoice: &Invoice) -> Result<AuthorizationOutcome, PortError>;
}

/// Sends invoice documents to subscribers
#[async_trait]
pub trait Notifier: DomainPort {
    /// Renders the invoice document and delivers it to the invoice email
    async fn notify(&self, invoice: &Invoice) -> Result<(), PortError>;
}

/// Persists the batch of a billing run
#[async_trait]
pub trait BatchExporter: DomainPort {
    /// Writes all invoices of `period` as one artifact
    async fn export(
        &self,
        period: BillingPeriod,
        invoices: &[Invoice],
    ) -> Result<ExportLocation, PortError>;
}

/// In-memory port implementations for testing
///
/// Each fake records the calls it receives so tests can check order and
/// multiplicity, and can be told to fail for chosen items.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{InvoiceId, SubscriberId};

    /// Subscriber listing backed by a vector
    #[derive(Debug, Default, Clone)]
    pub struct InMemorySubscriberSource {
        subscribers: Arc<RwLock<Vec<Subscriber>>>,
        failure: Option<String>,
    }

    impl InMemorySubscriberSource {
        pub fn new(subscribers: Vec<Subscriber>) -> Self {
            Self {
                subscribers: Arc::new(RwLock::new(subscribers)),
                failure: None,
            }
        }

        /// A source whose listing always fails
        pub fn unavailable(message: impl Into<String>) -> Self {
            Self {
                subscribers: Arc::default(),
                failure: Some(message.into()),
            }
        }

        /// Applies a change to a stored subscriber
        pub async fn update(&self, id: SubscriberId, change: impl FnOnce(&mut Subscriber)) {
            if let Some(subscriber) = self.subscribers.write().await.iter_mut().find(|s| s.id == id) {
                change(subscriber);
            }
        }
    }

    impl DomainPort for InMemorySubscriberSource {}

    #[async_trait]
    impl SubscriberSource for InMemorySubscriberSource {
        async fn find_active(&self) -> Result<Vec<Subscriber>, PortError> {
            if let Some(message) = &self.failure {
                return Err(PortError::connection(message.clone()));
            }
            Ok(self
                .subscribers
                .read()
                .await
                .iter()
                .filter(|s| s.is_active())
                .cloned()
                .collect())
        }
    }

    /// Authorizer that declines a fixed set of subscribers
    #[derive(Debug, Default)]
    pub struct ScriptedAuthorizer {
        declined: HashSet<SubscriberId>,
        errored: HashSet<SubscriberId>,
        decline_all: bool,
        calls: RwLock<Vec<InvoiceId>>,
    }

    impl ScriptedAuthorizer {
        /// Authorizes every invoice
        pub fn approve_all() -> Self {
            Self::default()
        }

        /// Declines every invoice
        pub fn decline_all() -> Self {
            Self {
                decline_all: true,
                ..Self::default()
            }
        }

        /// Declines invoices of the given subscribers
        pub fn declining(subscribers: impl IntoIterator<Item = SubscriberId>) -> Self {
            Self {
                declined: subscribers.into_iter().collect(),
                ..Self::default()
            }
        }

        /// Returns a port error for invoices of the given subscribers
        pub fn erroring(subscribers: impl IntoIterator<Item = SubscriberId>) -> Self {
            Self {
                errored: subscribers.into_iter().collect(),
                ..Self::default()
            }
        }

        /// Invoices seen, in call order
        pub async fn calls(&self) -> Vec<InvoiceId> {
            self.calls.read().await.clone()
        }
    }

    impl DomainPort for ScriptedAuthorizer {}

    #[async_trait]
    impl PaymentAuthorizer for ScriptedAuthorizer {
        async fn authorize(&self, invoice: &Invoice) -> Result<AuthorizationOutcome, PortError> {
            self.calls.write().await.push(invoice.id());

            if self.errored.contains(&invoice.subscriber_id()) {
                return Err(PortError::Timeout {
                    operation: "authorize".to_string(),
                    duration_ms: 30_000,
                });
            }
            if self.decline_all || self.declined.contains(&invoice.subscriber_id()) {
                return Ok(AuthorizationOutcome::declined(format!(
                    "Payment authorization failed for invoice {}",
                    invoice
                )));
            }
            Ok(AuthorizationOutcome::Authorized)
        }
    }

    /// Notifier that records deliveries and can fail on the n-th call
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        fail_on_call: Option<usize>,
        delivered: RwLock<Vec<Invoice>>,
        attempts: RwLock<usize>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fails the `call`-th notification (1-based)
        pub fn failing_on_call(call: usize) -> Self {
            Self {
                fail_on_call: Some(call),
                ..Self::default()
            }
        }

        /// Invoices successfully delivered, in order, as they were at delivery
        pub async fn delivered(&self) -> Vec<Invoice> {
            self.delivered.read().await.clone()
        }

        /// Number of notify calls, including the failed one
        pub async fn attempts(&self) -> usize {
            *self.attempts.read().await
        }
    }

    impl DomainPort for RecordingNotifier {}

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, invoice: &Invoice) -> Result<(), PortError> {
            let call = {
                let mut attempts = self.attempts.write().await;
                *attempts += 1;
                *attempts
            };

            if self.fail_on_call == Some(call) {
                return Err(PortError::connection("mail relay refused connection"));
            }
            self.delivered.write().await.push(invoice.clone());
            Ok(())
        }
    }

    /// Exporter that keeps exported batches in memory
    #[derive(Debug, Default)]
    pub struct RecordingExporter {
        fail: bool,
        exports: RwLock<Vec<(BillingPeriod, Vec<Invoice>)>>,
    }

    impl RecordingExporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// An exporter whose storage is unavailable
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// All batches exported so far
        pub async fn exports(&self) -> Vec<(BillingPeriod, Vec<Invoice>)> {
            self.exports.read().await.clone()
        }
    }

    impl DomainPort for RecordingExporter {}

    #[async_trait]
    impl BatchExporter for RecordingExporter {
        async fn export(
            &self,
            period: BillingPeriod,
            invoices: &[Invoice],
        ) -> Result<ExportLocation, PortError> {
            if self.fail {
                return Err(PortError::ServiceUnavailable {
                    service: "export storage".to_string(),
                });
            }
            self.exports.write().await.push((period, invoices.to_vec()));
            Ok(ExportLocation::new(format!("memory://invoices-{}.csv", period)))
        }
    }
}
