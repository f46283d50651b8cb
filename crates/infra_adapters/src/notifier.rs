//! Invoice mail notifier
//!
//! Notifying a subscriber is two steps: the invoice document is rendered to
//! `<documents>/<YYYY-MM>/subscription-invoice-<id>.html`, then a message
//! carrying that document is handed to a [`MailTransport`]. Documents are
//! overwritten when a period is billed again.
//!
//! Two transports ship with the crate:
//!
//! - [`LogMailTransport`] only logs the message
//! - [`OutboxMailTransport`] writes each message as a `.eml` file for a
//!   relay to pick up

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use core_kernel::{DomainPort, PortError};
use domain_billing::{Invoice, Notifier};

use crate::error::InfraError;

/// A message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Rendered invoice document
    pub attachment: PathBuf,
}

/// Delivers mail messages
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, message: &MailMessage) -> Result<(), InfraError>;
}

/// Transport that only logs each message
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), InfraError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            attachment = %message.attachment.display(),
            "Mail sent"
        );
        Ok(())
    }
}

/// Transport that drops each message into an outbox directory
#[derive(Debug, Clone)]
pub struct OutboxMailTransport {
    dir: PathBuf,
}

impl OutboxMailTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Outbox file for a message, named after its attachment
    pub fn message_path(&self, message: &MailMessage) -> PathBuf {
        let stem = message
            .attachment
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "message".to_string());
        self.dir.join(format!("{}.eml", stem))
    }
}

#[async_trait]
impl MailTransport for OutboxMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), InfraError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| InfraError::io(&self.dir, e))?;

        let path = self.message_path(message);
        let content = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nX-Attachment: {}\r\n\r\n{}",
            message.from,
            message.to,
            message.subject,
            message.attachment.display(),
            message.body
        );
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| InfraError::io(&path, e))?;

        debug!(path = %path.display(), to = %message.to, "Message queued in outbox");
        Ok(())
    }
}

/// Renders invoice documents into a directory tree keyed by period
#[derive(Debug, Clone)]
pub struct InvoiceDocumentRenderer {
    document_dir: PathBuf,
}

impl InvoiceDocumentRenderer {
    pub fn new(document_dir: impl Into<PathBuf>) -> Self {
        Self {
            document_dir: document_dir.into(),
        }
    }

    /// Where the document for `invoice` is written
    pub fn document_path(&self, invoice: &Invoice) -> PathBuf {
        self.document_dir
            .join(invoice.period().to_string())
            .join(format!("subscription-invoice-{}.html", invoice.id()))
    }

    /// Renders the invoice as a standalone HTML page
    pub fn render(&self, invoice: &Invoice) -> String {
        let address = invoice.billing_address();
        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Invoice {id}</title></head>
<body>
<h1>Invoice {id}</h1>
<p>{name}<br>{street} {house}<br>{zip} {city}</p>
<table>
<tr><th>Period</th><td>{period}</td></tr>
<tr><th>Plan</th><td>{plan}</td></tr>
<tr><th>Amount</th><td>{price}</td></tr>
<tr><th>Status</th><td>{status}</td></tr>
</table>
</body>
</html>
"#,
            id = invoice.id(),
            name = escape_html(&invoice.full_name()),
            street = escape_html(&address.street),
            house = escape_html(&address.house),
            zip = escape_html(&address.zip),
            city = escape_html(&address.city),
            period = invoice.period(),
            plan = escape_html(invoice.plan_name()),
            price = invoice.price(),
            status = invoice.status(),
        )
    }

    /// Renders and writes the document, returning its path
    pub async fn write(&self, invoice: &Invoice) -> Result<PathBuf, InfraError> {
        let path = self.document_path(invoice);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InfraError::io(parent, e))?;
        }
        tokio::fs::write(&path, self.render(invoice))
            .await
            .map_err(|e| InfraError::io(&path, e))?;
        Ok(path)
    }
}

/// Notifier that mails each invoice document to its subscriber
pub struct InvoiceMailer<T: MailTransport> {
    renderer: InvoiceDocumentRenderer,
    transport: T,
    sender: String,
}

impl<T: MailTransport> InvoiceMailer<T> {
    pub fn new(renderer: InvoiceDocumentRenderer, transport: T, sender: impl Into<String>) -> Self {
        Self {
            renderer,
            transport,
            sender: sender.into(),
        }
    }

    /// Builds the message for an invoice whose document is at `attachment`
    pub fn compose(&self, invoice: &Invoice, attachment: &Path) -> MailMessage {
        MailMessage {
            from: self.sender.clone(),
            to: invoice.email().to_string(),
            subject: format!("Your invoice for {}", invoice.period()),
            body: format!(
                "Hello {},\n\nplease find attached your invoice for {} over {}.\n",
                invoice.full_name(),
                invoice.period(),
                invoice.price()
            ),
            attachment: attachment.to_path_buf(),
        }
    }
}

impl<T: MailTransport> DomainPort for InvoiceMailer<T> {}

#[async_trait]
impl<T: MailTransport> Notifier for InvoiceMailer<T> {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id()))]
    async fn notify(&self, invoice: &Invoice) -> Result<(), PortError> {
        let document = self.renderer.write(invoice).await?;
        let message = self.compose(invoice, &document);
        self.transport.send(&message).await?;
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_html("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert_eq!(escape_html("O'Brien"), "O&#39;Brien");
    }

    #[test]
    fn test_outbox_file_named_after_attachment() {
        let transport = OutboxMailTransport::new("/tmp/outbox");
        let message = MailMessage {
            from: "billing@example.com".to_string(),
            to: "ada@example.com".to_string(),
            subject: "Your invoice for 2018-12".to_string(),
            body: String::new(),
            attachment: PathBuf::from("/docs/2018-12/subscription-invoice-INV-1.html"),
        };
        assert_eq!(
            transport.message_path(&message),
            PathBuf::from("/tmp/outbox/subscription-invoice-INV-1.eml")
        );
    }
}
