//! Command implementations
//!
//! `run` wires the file adapters from configuration and drives one billing
//! run. `fixtures` seeds the subscriber listing with random subscribers.

use std::sync::Arc;

use anyhow::{ensure, Context};
use fake::faker::address::en::{BuildingNumber, CityName, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::Rng;
use tracing::info;

use core_kernel::{BillingPeriod, Currency, Money};
use domain_billing::{
    Address, BillingRun, BillingRunReport, Notifier, RunObserver, Subscriber, SubscriptionPlan,
};
use infra_adapters::{
    CsvInvoiceExporter, InvoiceDocumentRenderer, InvoiceMailer, JsonSubscriberSource,
    LogMailTransport, OutboxMailTransport, SimulatedPaymentProvider,
};

use crate::config::BillingConfig;

/// Builds a billing run over the adapters named in `config`
pub fn build_billing_run(config: &BillingConfig, seed: Option<u64>) -> anyhow::Result<BillingRun> {
    let provider = match seed.or(config.payment_seed) {
        Some(seed) => SimulatedPaymentProvider::seeded(config.payment_failure_rate, seed),
        None => SimulatedPaymentProvider::new(config.payment_failure_rate),
    }
    .context("Invalid payment provider settings")?;

    let renderer = InvoiceDocumentRenderer::new(&config.document_dir);
    let notifier: Arc<dyn Notifier> = match &config.outbox_dir {
        Some(dir) => Arc::new(InvoiceMailer::new(
            renderer,
            OutboxMailTransport::new(dir),
            &config.sender_address,
        )),
        None => Arc::new(InvoiceMailer::new(
            renderer,
            LogMailTransport,
            &config.sender_address,
        )),
    };

    Ok(BillingRun::new(
        Arc::new(JsonSubscriberSource::new(&config.subscribers_file)),
        Arc::new(provider),
        notifier,
        Arc::new(CsvInvoiceExporter::new(&config.export_dir)),
    ))
}

/// Runs billing for `period`
///
/// # Errors
///
/// Returns error if the adapters cannot be built or the run aborts. A run
/// that completes with declined payments is not an error.
pub async fn run_billing(
    config: &BillingConfig,
    period: BillingPeriod,
    seed: Option<u64>,
    observer: &dyn RunObserver,
) -> anyhow::Result<BillingRunReport> {
    let billing_run = build_billing_run(config, seed)?;
    let report = billing_run
        .run(period, observer)
        .await
        .with_context(|| format!("Billing run for {} did not complete", period))?;
    Ok(report)
}

/// Human-readable summary of a completed run
pub fn format_report(report: &BillingRunReport) -> String {
    let mut summary = format!(
        "Billing run {} for {}\n  subscribers: {}\n  invoices:    {}\n  paid:        {}\n  open:        {}\n  notified:    {}\n  export:      {}\n  took:        {} ms\n",
        report.run_id,
        report.period,
        report.subscribers_processed,
        report.invoices_generated,
        report.authorized_count,
        report.failed_count(),
        report.notified_count,
        report.export_location,
        report.duration().num_milliseconds(),
    );
    for failure in &report.failures {
        summary.push_str(&format!("  ! {}\n", failure.reason));
    }
    summary
}

/// Generates `count` random subscribers, about `inactive_ratio` of them inactive
pub fn generate_subscribers(
    count: usize,
    inactive_ratio: f64,
    currency: Currency,
) -> anyhow::Result<Vec<Subscriber>> {
    ensure!(
        (0.0..=1.0).contains(&inactive_ratio),
        "inactive ratio must be between 0 and 1, got {}",
        inactive_ratio
    );

    let plans = [
        SubscriptionPlan::new("Monthly Magazine", Money::from_minor(1999, currency)),
        SubscriptionPlan::new("Digital Edition", Money::from_minor(999, currency)),
    ];
    let mut rng = rand::rng();

    let subscribers = (0..count)
        .map(|_| {
            let shipping = random_address();
            let billing = if rng.random_bool(0.2) {
                random_address()
            } else {
                shipping.clone()
            };
            let plan = plans[rng.random_range(0..plans.len())].clone();
            let mut subscriber = Subscriber::new(
                FirstName().fake::<String>(),
                LastName().fake::<String>(),
                SafeEmail().fake::<String>(),
                shipping,
                billing,
                plan,
            );
            if rng.random_bool(inactive_ratio) {
                subscriber.deactivate();
            }
            subscriber
        })
        .collect();

    Ok(subscribers)
}

/// Replaces the configured subscriber listing with generated subscribers
pub async fn write_fixtures(
    config: &BillingConfig,
    count: usize,
    inactive_ratio: f64,
) -> anyhow::Result<Vec<Subscriber>> {
    let subscribers = generate_subscribers(count, inactive_ratio, config.currency()?)?;
    let source = JsonSubscriberSource::new(&config.subscribers_file);
    source
        .save_all(&subscribers)
        .await
        .with_context(|| format!("Could not write {}", config.subscribers_file.display()))?;

    info!(
        path = %config.subscribers_file.display(),
        count = subscribers.len(),
        active = subscribers.iter().filter(|s| s.is_active()).count(),
        "Wrote subscriber fixtures"
    );
    Ok(subscribers)
}

fn random_address() -> Address {
    Address::new(
        StreetName().fake::<String>(),
        BuildingNumber().fake::<String>(),
        CityName().fake::<String>(),
        ZipCode().fake::<String>(),
    )
}
