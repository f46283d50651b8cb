//! CSV batch exporter
//!
//! Writes `invoices-YYYY-MM.csv` into the export directory: a header row and
//! one row per invoice in batch order. The file is written under a temporary
//! name and renamed into place, so readers never see a partial export. A
//! second export for the same period replaces the first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};

use core_kernel::{BillingPeriod, DomainPort, PortError};
use domain_billing::{BatchExporter, ExportLocation, Invoice};

use crate::error::InfraError;

/// Column names of the export, in order
pub const CSV_HEADER: &str =
    "id,subscriber_id,firstname,lastname,email,street,house,city,zip,plan,price,currency,period,status";

/// Exporter writing one CSV file per period
#[derive(Debug, Clone)]
pub struct CsvInvoiceExporter {
    export_dir: PathBuf,
}

impl CsvInvoiceExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Final path of the export for `period`
    pub fn export_path(&self, period: BillingPeriod) -> PathBuf {
        self.export_dir.join(format!("invoices-{}.csv", period))
    }

    async fn write_atomically(&self, path: &Path, content: String) -> Result<(), InfraError> {
        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| InfraError::io(&self.export_dir, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = self.export_dir.join(format!(".{}.tmp", file_name));

        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| InfraError::io(&temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(InfraError::io(path, e));
        }
        Ok(())
    }
}

impl DomainPort for CsvInvoiceExporter {}

#[async_trait]
impl BatchExporter for CsvInvoiceExporter {
    #[instrument(skip(self, invoices), fields(count = invoices.len()))]
    async fn export(
        &self,
        period: BillingPeriod,
        invoices: &[Invoice],
    ) -> Result<ExportLocation, PortError> {
        let path = self.export_path(period);
        self.write_atomically(&path, render_csv(invoices)).await?;

        info!(path = %path.display(), rows = invoices.len(), "Invoice export written");
        Ok(ExportLocation::new(path.display().to_string()))
    }
}

/// Renders the batch as CSV text, header included
pub fn render_csv(invoices: &[Invoice]) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for invoice in invoices {
        let address = invoice.billing_address();
        let price = invoice.price();
        let fields = [
            invoice.id().to_string(),
            invoice.subscriber_id().to_string(),
            escape_csv_field(invoice.first_name()),
            escape_csv_field(invoice.last_name()),
            escape_csv_field(invoice.email()),
            escape_csv_field(&address.street),
            escape_csv_field(&address.house),
            escape_csv_field(&address.city),
            escape_csv_field(&address.zip),
            escape_csv_field(invoice.plan_name()),
            price.to_fixed_point(),
            price.currency().code().to_string(),
            invoice.period().to_string(),
            invoice.status().as_str().to_string(),
        ];
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}

/// Escapes a field for CSV output
///
/// Fields holding a separator, quote or line break are quoted with inner
/// quotes doubled. Every other value is written exactly as on the invoice.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field_untouched() {
        assert_eq!(escape_csv_field("Berlin"), "Berlin");
        assert_eq!(escape_csv_field(""), "");
    }

    #[test]
    fn test_separator_and_quotes_are_quoted() {
        assert_eq!(escape_csv_field("Smith, Jr."), "\"Smith, Jr.\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_leading_sign_characters_are_kept_verbatim() {
        assert_eq!(escape_csv_field("=Main"), "=Main");
        assert_eq!(escape_csv_field("@home"), "@home");
        assert_eq!(escape_csv_field("-"), "-");
        assert_eq!(escape_csv_field("+ada@example.com"), "+ada@example.com");
        assert_eq!(escape_csv_field("-Smith, Jr."), "\"-Smith, Jr.\"");
    }

    #[test]
    fn test_empty_batch_is_header_only() {
        assert_eq!(render_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_export_path_uses_artifact_period_form() {
        let exporter = CsvInvoiceExporter::new("/var/export");
        let period = BillingPeriod::new(2018, 12).unwrap();
        assert_eq!(
            exporter.export_path(period),
            PathBuf::from("/var/export/invoices-2018-12.csv")
        );
    }
}
