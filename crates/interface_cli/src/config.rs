//! Billing run configuration

use std::path::PathBuf;

use serde::Deserialize;

use core_kernel::{CoreError, Currency};
use infra_adapters::DEFAULT_FAILURE_RATE;

/// Billing run configuration
///
/// Read from an optional `billing.toml` in the working directory, then from
/// `BILLING_*` environment variables. Unset keys keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Directory receiving `invoices-YYYY-MM.csv`
    pub export_dir: PathBuf,
    /// Root of the rendered invoice documents
    pub document_dir: PathBuf,
    /// Mail outbox; messages are only logged when unset
    pub outbox_dir: Option<PathBuf>,
    /// JSON subscriber listing
    pub subscribers_file: PathBuf,
    /// From address of invoice mails
    pub sender_address: String,
    /// Share of simulated payments that are declined
    pub payment_failure_rate: f64,
    /// Fixed seed for the simulated payment provider
    pub payment_seed: Option<u64>,
    /// ISO code of the plan currency used for fixtures
    pub currency: String,
    /// Log level
    pub log_level: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("var/export"),
            document_dir: PathBuf::from("var/invoices"),
            outbox_dir: None,
            subscribers_file: PathBuf::from("var/subscribers.json"),
            sender_address: "billing@example.com".to_string(),
            payment_failure_rate: DEFAULT_FAILURE_RATE,
            payment_seed: None,
            currency: "EUR".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl BillingConfig {
    /// Loads configuration from `billing.toml` and the environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("billing").required(false))
            .add_source(config::Environment::with_prefix("BILLING"))
            .build()?
            .try_deserialize()
    }

    /// Checks values the types alone do not constrain
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.payment_failure_rate) {
            return Err(CoreError::configuration(format!(
                "payment_failure_rate must be between 0 and 1, got {}",
                self.payment_failure_rate
            )));
        }
        if !self.sender_address.contains('@') {
            return Err(CoreError::configuration(format!(
                "sender_address '{}' is not a mail address",
                self.sender_address
            )));
        }
        self.currency()?;
        Ok(())
    }

    pub fn currency(&self) -> Result<Currency, CoreError> {
        Ok(self.currency.parse::<Currency>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BillingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency().unwrap(), Currency::EUR);
        assert_eq!(config.payment_failure_rate, 0.1);
    }

    #[test]
    fn test_rejects_failure_rate_above_one() {
        let config = BillingConfig {
            payment_failure_rate: 1.2,
            ..BillingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("payment_failure_rate"));
    }

    #[test]
    fn test_rejects_unknown_currency() {
        let config = BillingConfig {
            currency: "XYZ".to_string(),
            ..BillingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
