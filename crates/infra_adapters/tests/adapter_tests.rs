//! Tests for the filesystem, mail and payment adapters
//!
//! Every test works inside its own temporary directory.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use core_kernel::{BillingPeriod, PortError};
use domain_billing::{
    Address, BatchExporter, BillingRun, Invoice, NoopObserver, Notifier, PaymentAuthorizer,
    SubscriberSource,
};
use infra_adapters::{
    CsvInvoiceExporter, InfraError, InvoiceDocumentRenderer, InvoiceMailer, JsonSubscriberSource,
    LogMailTransport, MailMessage, MailTransport, OutboxMailTransport, SimulatedPaymentProvider,
    CSV_HEADER,
};
use test_utils::{PeriodFixtures, SubscriberBuilder, SubscriberFixtures};

fn invoices_for(period: BillingPeriod, count: usize) -> Vec<Invoice> {
    SubscriberFixtures::many(count)
        .iter()
        .map(|s| Invoice::for_subscriber(s, period))
        .collect()
}

// ============================================================================
// Subscriber Source Tests
// ============================================================================

mod subscriber_source_tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_active_subscribers_in_file_order() {
        let dir = TempDir::new().unwrap();
        let source = JsonSubscriberSource::new(dir.path().join("data/subscribers.json"));
        let listing = vec![
            SubscriberFixtures::ada(),
            SubscriberBuilder::new().inactive().build(),
            SubscriberFixtures::grace(),
        ];
        source.save_all(&listing).await.unwrap();

        let active = source.find_active().await.unwrap();

        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, listing[0].id);
        assert_eq!(active[1].id, listing[2].id);
        assert_eq!(source.load_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = JsonSubscriberSource::new(dir.path().join("absent.json"));

        let err = source.find_active().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscribers.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonSubscriberSource::new(&path).find_active().await.unwrap_err();
        assert!(matches!(err, PortError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unbillable_record_fails_the_whole_load() {
        let dir = TempDir::new().unwrap();
        let source = JsonSubscriberSource::new(dir.path().join("subscribers.json"));
        let broken = SubscriberBuilder::new().with_email("not-an-address").build();
        source
            .save_all(&[SubscriberFixtures::ada(), broken.clone()])
            .await
            .unwrap();

        let err = source.find_active().await.unwrap_err();
        assert!(matches!(err, PortError::Validation { .. }));
        assert!(err.to_string().contains(&broken.id.to_string()));
    }
}

// ============================================================================
// Payment Provider Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_rate_always_authorizes() {
        let provider = SimulatedPaymentProvider::seeded(0.0, 7).unwrap();
        for invoice in invoices_for(PeriodFixtures::december_2018(), 20) {
            assert!(provider.authorize(&invoice).await.unwrap().is_authorized());
        }
    }

    #[tokio::test]
    async fn test_full_rate_always_declines_with_invoice_in_reason() {
        let provider = SimulatedPaymentProvider::seeded(1.0, 7).unwrap();
        let invoice = Invoice::for_subscriber(&SubscriberFixtures::ada(), PeriodFixtures::december_2018());

        let outcome = provider.authorize(&invoice).await.unwrap();
        assert_eq!(
            outcome,
            domain_billing::AuthorizationOutcome::declined(format!(
                "Payment authorization failed for invoice #{}, Ada Lovelace",
                invoice.id()
            ))
        );
    }

    #[tokio::test]
    async fn test_same_seed_gives_same_decisions() {
        let invoices = invoices_for(PeriodFixtures::december_2018(), 50);
        let first = SimulatedPaymentProvider::seeded(0.5, 42).unwrap();
        let second = SimulatedPaymentProvider::seeded(0.5, 42).unwrap();

        for invoice in &invoices {
            assert_eq!(
                first.authorize(invoice).await.unwrap(),
                second.authorize(invoice).await.unwrap()
            );
        }
    }
}

// ============================================================================
// Notifier Tests
// ============================================================================

mod notifier_tests {
    use super::*;

    struct RefusingTransport;

    #[async_trait]
    impl MailTransport for RefusingTransport {
        async fn send(&self, message: &MailMessage) -> Result<(), InfraError> {
            Err(InfraError::delivery(&message.to, "mailbox full"))
        }
    }

    #[tokio::test]
    async fn test_document_and_outbox_message_are_written() {
        let dir = TempDir::new().unwrap();
        let renderer = InvoiceDocumentRenderer::new(dir.path().join("documents"));
        let outbox = OutboxMailTransport::new(dir.path().join("outbox"));
        let mailer = InvoiceMailer::new(renderer.clone(), outbox.clone(), "billing@example.com");
        let subscriber = SubscriberBuilder::new()
            .with_name("Tom & Jerry", "O'Brien")
            .with_email("tom@example.com")
            .build();
        let invoice = Invoice::for_subscriber(&subscriber, PeriodFixtures::december_2018());

        mailer.notify(&invoice).await.unwrap();

        let document_path = renderer.document_path(&invoice);
        assert!(document_path.starts_with(dir.path().join("documents").join("2018-12")));
        let html = std::fs::read_to_string(&document_path).unwrap();
        assert!(html.contains("Tom &amp; Jerry O&#39;Brien"));
        assert!(html.contains("19.99"));

        let message = mailer.compose(&invoice, &document_path);
        let eml = std::fs::read_to_string(outbox.message_path(&message)).unwrap();
        assert!(eml.contains("From: billing@example.com"));
        assert!(eml.contains("To: tom@example.com"));
        assert!(eml.contains("Subject: Your invoice for 2018-12"));
    }

    #[tokio::test]
    async fn test_renotifying_overwrites_document() {
        let dir = TempDir::new().unwrap();
        let renderer = InvoiceDocumentRenderer::new(dir.path());
        let mailer = InvoiceMailer::new(renderer.clone(), LogMailTransport, "billing@example.com");
        let mut invoice = Invoice::for_subscriber(&SubscriberFixtures::ada(), PeriodFixtures::march_2024());

        mailer.notify(&invoice).await.unwrap();
        invoice.mark_paid();
        mailer.notify(&invoice).await.unwrap();

        let html = std::fs::read_to_string(renderer.document_path(&invoice)).unwrap();
        assert!(html.contains("<td>paid</td>"));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_port_error() {
        let dir = TempDir::new().unwrap();
        let mailer = InvoiceMailer::new(
            InvoiceDocumentRenderer::new(dir.path()),
            RefusingTransport,
            "billing@example.com",
        );
        let invoice = Invoice::for_subscriber(&SubscriberFixtures::ada(), PeriodFixtures::march_2024());

        let err = mailer.notify(&invoice).await.unwrap_err();
        assert!(err.is_transient());
    }
}

// ============================================================================
// Exporter Tests
// ============================================================================

mod exporter_tests {
    use super::*;

    #[tokio::test]
    async fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvInvoiceExporter::new(dir.path().join("export"));
        let period = PeriodFixtures::december_2018();
        let mut invoices = invoices_for(period, 2);
        invoices[0].mark_paid();

        let location = exporter.export(period, &invoices).await.unwrap();

        assert!(location.as_str().ends_with("invoices-2018-12.csv"));
        let csv = std::fs::read_to_string(exporter.export_path(period)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);

        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(first[0], invoices[0].id().to_string());
        assert_eq!(first[2], "First1");
        assert_eq!(first[10], "19.99");
        assert_eq!(first[11], "EUR");
        assert_eq!(first[12], "2018-12");
        assert_eq!(first[13], "paid");
        assert!(lines[2].ends_with(",open"));
    }

    #[tokio::test]
    async fn test_export_keeps_invoice_values_verbatim() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvInvoiceExporter::new(dir.path());
        let period = PeriodFixtures::december_2018();
        let subscriber = SubscriberBuilder::new()
            .with_name("Ada", "-Smith")
            .with_email("+ada@example.com")
            .with_billing_address(Address::new("=Main", "-", "@Berlin", "10115"))
            .build();
        let invoice = Invoice::for_subscriber(&subscriber, period);

        exporter.export(period, &[invoice.clone()]).await.unwrap();

        let csv = std::fs::read_to_string(exporter.export_path(period)).unwrap();
        let row: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row[2], invoice.first_name());
        assert_eq!(row[3], invoice.last_name());
        assert_eq!(row[4], invoice.email());
        assert_eq!(row[5], invoice.billing_address().street);
        assert_eq!(row[6], invoice.billing_address().house);
        assert_eq!(row[7], invoice.billing_address().city);
        assert!(csv.contains(",+ada@example.com,"));
        assert!(!csv.contains('\''));
    }

    #[tokio::test]
    async fn test_empty_batch_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvInvoiceExporter::new(dir.path());
        let period = PeriodFixtures::march_2024();

        exporter.export(period, &[]).await.unwrap();

        let csv = std::fs::read_to_string(exporter.export_path(period)).unwrap();
        assert_eq!(csv, format!("{}\n", CSV_HEADER));
    }

    #[tokio::test]
    async fn test_reexport_replaces_file_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvInvoiceExporter::new(dir.path());
        let period = PeriodFixtures::december_2018();

        exporter.export(period, &invoices_for(period, 3)).await.unwrap();
        exporter.export(period, &invoices_for(period, 1)).await.unwrap();

        let csv = std::fs::read_to_string(exporter.export_path(period)).unwrap();
        assert_eq!(csv.lines().count(), 2);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_unwritable_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("export");
        std::fs::write(&blocker, "not a directory").unwrap();
        let exporter = CsvInvoiceExporter::new(&blocker);

        let result = exporter
            .export(PeriodFixtures::december_2018(), &[])
            .await;
        assert!(result.is_err());
    }
}

// ============================================================================
// End-to-end Tests
// ============================================================================

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_billing_run_over_file_adapters() {
        let dir = TempDir::new().unwrap();
        let source = JsonSubscriberSource::new(dir.path().join("subscribers.json"));
        source
            .save_all(&[
                SubscriberFixtures::ada(),
                SubscriberFixtures::alan(),
                SubscriberFixtures::grace(),
            ])
            .await
            .unwrap();
        let exporter = CsvInvoiceExporter::new(dir.path().join("export"));
        let period = PeriodFixtures::december_2018();

        let run = BillingRun::new(
            Arc::new(source),
            Arc::new(SimulatedPaymentProvider::seeded(0.0, 1).unwrap()),
            Arc::new(InvoiceMailer::new(
                InvoiceDocumentRenderer::new(dir.path().join("documents")),
                OutboxMailTransport::new(dir.path().join("outbox")),
                "billing@example.com",
            )),
            Arc::new(exporter.clone()),
        );

        let report = run.run(period, &NoopObserver).await.unwrap();

        assert_eq!(report.invoices_generated, 3);
        assert!(report.is_fully_collected());
        let csv = std::fs::read_to_string(exporter.export_path(period)).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert_eq!(std::fs::read_dir(dir.path().join("outbox")).unwrap().count(), 3);
        assert_eq!(
            std::fs::read_dir(dir.path().join("documents").join("2018-12"))
                .unwrap()
                .count(),
            3
        );
    }
}
