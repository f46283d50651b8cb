//! Ports and Adapters Infrastructure
//!
//! The billing domain depends on its collaborators (subscriber listing,
//! payment network, mail delivery, export storage) only through port traits.
//! This module provides the pieces those traits share: the unified
//! [`PortError`] and the [`DomainPort`] marker.
//!
//! ```text
//!            BillingRun (domain_billing)
//!                      │
//!                      ▼
//!   SubscriberSource · PaymentAuthorizer · Notifier · BatchExporter
//!                ▲                           ▲
//!       ┌────────┴────────┐        ┌─────────┴────────┐
//!       │  infra adapters │        │   mock adapters  │
//!       │ (files, mail)   │        │   (tests)        │
//!       └─────────────────┘        └──────────────────┘
//! ```
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Notifier: DomainPort {
//!     async fn notify(&self, invoice: &Invoice) -> Result<(), PortError>;
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Whether a `PortError` aborts a billing run or is contained per invoice is
/// decided by the caller, not by the variant.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Connection error that keeps its cause
    pub fn connection_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an Internal error that keeps its cause
    pub fn internal_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared behind `Arc<dyn ...>` and awaited from async code.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Subscriber", "123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Subscriber"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "authorize".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());

        let unavailable = PortError::ServiceUnavailable {
            service: "mail relay".to_string(),
        };
        assert!(unavailable.is_transient());

        let invalid = PortError::validation("missing email");
        assert!(!invalid.is_transient());
        assert_eq!(invalid.to_string(), "Validation error: missing email");
    }

    #[test]
    fn test_port_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let error = PortError::internal_with("cannot write export", io);
        assert!(error.source().is_some());
    }
}
