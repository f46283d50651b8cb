//! Billing run orchestration
//!
//! A run bills one period in five strictly sequential stages:
//!
//! 1. **Load** the active subscribers (fatal on failure)
//! 2. **Generate** one invoice snapshot per subscriber (cannot fail)
//! 3. **Authorize** payment per invoice; declines are contained per invoice
//! 4. **Notify** every invoice, paid or not (fatal on the first failure)
//! 5. **Export** the whole batch once (fatal on failure)
//!
//! No stage starts before the previous one has handled every item, and
//! within a stage invoices are handled one at a time in subscriber order.
//! Stage 3 isolates failures while stage 4 does not; a failed notification
//! aborts the run with the remaining invoices un-notified and nothing
//! exported.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use core_kernel::{BillingPeriod, RunId};

use crate::error::BillingRunError;
use crate::invoice::Invoice;
use crate::observer::{RunObserver, RunStage};
use crate::ports::{
    AuthorizationOutcome, BatchExporter, ExportLocation, Notifier, PaymentAuthorizer,
    SubscriberSource,
};
use crate::report::{AuthorizationFailure, BillingRunReport};
use crate::subscriber::Subscriber;

/// Counts gathered while authorizing a batch
#[derive(Debug, Default)]
struct AuthorizationTally {
    authorized: usize,
    failures: Vec<AuthorizationFailure>,
}

/// The billing run orchestrator
///
/// Holds only its collaborators; every call to [`BillingRun::run`] is
/// independent and the invoice batch lives inside that call.
pub struct BillingRun {
    subscribers: Arc<dyn SubscriberSource>,
    authorizer: Arc<dyn PaymentAuthorizer>,
    notifier: Arc<dyn Notifier>,
    exporter: Arc<dyn BatchExporter>,
}

impl BillingRun {
    /// Creates a new billing run over the given collaborators
    pub fn new(
        subscribers: Arc<dyn SubscriberSource>,
        authorizer: Arc<dyn PaymentAuthorizer>,
        notifier: Arc<dyn Notifier>,
        exporter: Arc<dyn BatchExporter>,
    ) -> Self {
        Self {
            subscribers,
            authorizer,
            notifier,
            exporter,
        }
    }

    /// Bills all active subscribers for `period`
    ///
    /// # Arguments
    ///
    /// * `period` - The month being billed
    /// * `observer` - Receives progress and payment failures as they happen
    ///
    /// # Returns
    ///
    /// The report of the completed run. Declined payments do not make the
    /// run fail; they are listed in [`BillingRunReport::failures`].
    ///
    /// # Errors
    ///
    /// Returns error if the subscribers cannot be loaded, any notification
    /// fails, or the export fails. Nothing done before the failure is undone.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let report = billing_run.run(period, &NoopObserver).await?;
    /// println!("{} paid, {} open", report.authorized_count, report.failed_count());
    /// ```
    pub async fn run(
        &self,
        period: BillingPeriod,
        observer: &dyn RunObserver,
    ) -> Result<BillingRunReport, BillingRunError> {
        let run_id = RunId::new_v7();
        let started_at = Utc::now();
        info!(%run_id, %period, "Starting billing run");

        let subscribers = self.load(observer).await?;
        let mut invoices = generate(&subscribers, period, observer);
        let tally = self.authorize_all(&mut invoices, observer).await;
        let notified_count = self.notify_all(&invoices, observer).await?;
        let export_location = self.export(period, &invoices, observer).await?;

        let report = BillingRunReport {
            run_id,
            period,
            subscribers_processed: subscribers.len(),
            invoices_generated: invoices.len(),
            authorized_count: tally.authorized,
            failures: tally.failures,
            notified_count,
            export_location,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            %run_id,
            %period,
            invoices = report.invoices_generated,
            authorized = report.authorized_count,
            failed = report.failed_count(),
            export = %report.export_location,
            "Billing run completed"
        );
        Ok(report)
    }

    async fn load(&self, observer: &dyn RunObserver) -> Result<Vec<Subscriber>, BillingRunError> {
        observer.on_stage_started(RunStage::Load, 0);

        let subscribers = self.subscribers.find_active().await.map_err(|source| {
            error!(error = %source, "Could not load active subscribers");
            BillingRunError::SubscriberSource { source }
        })?;

        info!(count = subscribers.len(), "Loaded active subscribers");
        Ok(subscribers)
    }

    /// Authorizes every invoice in order. Never fails: a decline or a port
    /// error leaves the invoice open and is recorded in the tally.
    async fn authorize_all(
        &self,
        invoices: &mut [Invoice],
        observer: &dyn RunObserver,
    ) -> AuthorizationTally {
        let total = invoices.len();
        observer.on_stage_started(RunStage::Authorize, total);

        let mut tally = AuthorizationTally::default();
        let mut processed = 0;

        for invoice in invoices.iter_mut() {
            let reason = match self.authorizer.authorize(invoice).await {
                Ok(AuthorizationOutcome::Authorized) => None,
                Ok(AuthorizationOutcome::Declined { reason }) => Some(reason),
                Err(err) => Some(err.to_string()),
            };

            match reason {
                None => {
                    invoice.mark_paid();
                    tally.authorized += 1;
                    debug!(invoice_id = %invoice.id(), "Payment authorized");
                }
                Some(reason) => {
                    warn!(invoice_id = %invoice.id(), %reason, "Payment authorization failed");
                    observer.on_authorization_failed(invoice, &reason);
                    tally.failures.push(AuthorizationFailure {
                        invoice_id: invoice.id(),
                        subscriber_id: invoice.subscriber_id(),
                        reason,
                    });
                }
            }

            processed += 1;
            observer.on_progress(RunStage::Authorize, processed, total);
        }

        info!(
            authorized = tally.authorized,
            failed = tally.failures.len(),
            "Authorization stage finished"
        );
        tally
    }

    /// Notifies every invoice in order, stopping at the first failure
    async fn notify_all(
        &self,
        invoices: &[Invoice],
        observer: &dyn RunObserver,
    ) -> Result<usize, BillingRunError> {
        let total = invoices.len();
        observer.on_stage_started(RunStage::Notify, total);

        let mut notified = 0;
        for invoice in invoices {
            if let Err(source) = self.notifier.notify(invoice).await {
                error!(
                    invoice_id = %invoice.id(),
                    notified,
                    total,
                    error = %source,
                    "Notification failed, aborting billing run"
                );
                return Err(BillingRunError::Notification {
                    invoice_id: invoice.id(),
                    notified,
                    total,
                    source,
                });
            }
            notified += 1;
            debug!(invoice_id = %invoice.id(), "Invoice notification sent");
        }

        info!(notified, "Notification stage finished");
        Ok(notified)
    }

    async fn export(
        &self,
        period: BillingPeriod,
        invoices: &[Invoice],
        observer: &dyn RunObserver,
    ) -> Result<ExportLocation, BillingRunError> {
        observer.on_stage_started(RunStage::Export, invoices.len());

        self.exporter.export(period, invoices).await.map_err(|source| {
            error!(%period, error = %source, "Export failed, aborting billing run");
            BillingRunError::Export { period, source }
        })
    }
}

/// Builds one invoice per subscriber, preserving order and length
fn generate(
    subscribers: &[Subscriber],
    period: BillingPeriod,
    observer: &dyn RunObserver,
) -> Vec<Invoice> {
    let total = subscribers.len();
    observer.on_stage_started(RunStage::Generate, total);

    let mut invoices = Vec::with_capacity(total);
    for subscriber in subscribers {
        invoices.push(Invoice::for_subscriber(subscriber, period));
        observer.on_progress(RunStage::Generate, invoices.len(), total);
    }

    info!(count = invoices.len(), %period, "Generated invoices");
    invoices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::ports::mock::{
        InMemorySubscriberSource, RecordingExporter, RecordingNotifier, ScriptedAuthorizer,
    };
    use crate::subscriber::{Address, SubscriptionPlan};
    use core_kernel::{Currency, Money};

    fn subscriber(first_name: &str) -> Subscriber {
        let address = Address::new("Main Street", "1", "Berlin", "10115");
        Subscriber::new(
            first_name,
            "Tester",
            format!("{}@example.com", first_name.to_lowercase()),
            address.clone(),
            address,
            SubscriptionPlan::new("Monthly", Money::from_minor(1999, Currency::EUR)),
        )
    }

    fn period() -> BillingPeriod {
        BillingPeriod::new(2018, 12).unwrap()
    }

    #[tokio::test]
    async fn test_run_with_all_payments_authorized() {
        let source = InMemorySubscriberSource::new(vec![subscriber("Ada"), subscriber("Alan")]);
        let notifier = Arc::new(RecordingNotifier::new());
        let exporter = Arc::new(RecordingExporter::new());
        let run = BillingRun::new(
            Arc::new(source),
            Arc::new(ScriptedAuthorizer::approve_all()),
            notifier.clone(),
            exporter.clone(),
        );

        let report = run.run(period(), &NoopObserver).await.unwrap();

        assert_eq!(report.invoices_generated, 2);
        assert_eq!(report.authorized_count, 2);
        assert!(report.is_fully_collected());
        assert_eq!(report.notified_count, 2);
        assert_eq!(report.export_location.as_str(), "memory://invoices-2018-12.csv");
        assert_eq!(notifier.delivered().await.len(), 2);
        assert_eq!(exporter.exports().await.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_preserves_order_and_length() {
        let subscribers = vec![subscriber("A"), subscriber("B"), subscriber("C")];
        let invoices = generate(&subscribers, period(), &NoopObserver);

        assert_eq!(invoices.len(), subscribers.len());
        for (invoice, subscriber) in invoices.iter().zip(&subscribers) {
            assert_eq!(invoice.subscriber_id(), subscriber.id);
            assert!(invoice.is_open());
        }
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal() {
        let exporter = Arc::new(RecordingExporter::new());
        let run = BillingRun::new(
            Arc::new(InMemorySubscriberSource::unavailable("listing offline")),
            Arc::new(ScriptedAuthorizer::approve_all()),
            Arc::new(RecordingNotifier::new()),
            exporter.clone(),
        );

        let err = run.run(period(), &NoopObserver).await.unwrap_err();
        assert_eq!(err.stage(), RunStage::Load);
        assert!(exporter.exports().await.is_empty());
    }
}
