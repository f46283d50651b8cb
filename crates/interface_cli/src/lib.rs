//! Command line interface for the billing run
//!
//! # Usage
//!
//! ```bash
//! # Seed a listing of 200 subscribers, 15% of them inactive
//! billing-run fixtures --count 200 --inactive-ratio 0.15
//!
//! # Bill December 2018
//! billing-run run 12-2018
//! ```
//!
//! # Environment Variables
//!
//! * `BILLING_EXPORT_DIR` - Directory for CSV exports (default: var/export)
//! * `BILLING_DOCUMENT_DIR` - Directory for invoice documents (default: var/invoices)
//! * `BILLING_OUTBOX_DIR` - Mail outbox; mails are only logged when unset
//! * `BILLING_SUBSCRIBERS_FILE` - JSON subscriber listing (default: var/subscribers.json)
//! * `BILLING_SENDER_ADDRESS` - From address of invoice mails
//! * `BILLING_PAYMENT_FAILURE_RATE` - Share of declined payments (default: 0.1)
//! * `BILLING_PAYMENT_SEED` - Fixed seed for payment decisions
//! * `BILLING_CURRENCY` - Currency of generated plans (default: EUR)
//! * `BILLING_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

pub mod cli;
pub mod commands;
pub mod config;
pub mod progress;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
