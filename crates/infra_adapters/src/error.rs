//! Adapter error types
//!
//! Adapters fail on the filesystem, on malformed records or in the mail
//! transport. Every variant maps onto a [`PortError`] before it crosses into
//! the billing domain.

use std::path::{Path, PathBuf};

use thiserror::Error;

use core_kernel::PortError;
use domain_billing::BillingError;

/// Errors raised inside the reference adapters
#[derive(Debug, Error)]
pub enum InfraError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain the expected JSON
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record was read but cannot be billed
    #[error(transparent)]
    InvalidRecord(#[from] BillingError),

    /// The mail transport refused a message
    #[error("Mail delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },

    /// An adapter was built with an unusable setting
    #[error("Invalid adapter setting: {0}")]
    Configuration(String),
}

impl InfraError {
    /// Wraps an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        InfraError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        InfraError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn delivery(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        InfraError::Delivery {
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }
}

impl From<InfraError> for PortError {
    fn from(error: InfraError) -> Self {
        match error {
            InfraError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                PortError::not_found("File", path.display())
            }
            error @ InfraError::Io { .. } => PortError::internal_with("File access failed", error),
            error @ (InfraError::Json { .. }
            | InfraError::InvalidRecord(_)
            | InfraError::Configuration(_)) => {
                PortError::validation(error.to_string())
            }
            error @ InfraError::Delivery { .. } => {
                PortError::connection_with("Mail transport failed", error)
            }
        }
    }
}
