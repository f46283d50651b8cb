//! Simulated payment provider
//!
//! Stands in for a real payment gateway. Each authorization is declined
//! independently with a fixed probability; everything else is approved.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_billing::{AuthorizationOutcome, Invoice, PaymentAuthorizer};

use crate::error::InfraError;

/// Share of authorizations declined when nothing else is configured
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Payment provider that declines at random
#[derive(Debug)]
pub struct SimulatedPaymentProvider {
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedPaymentProvider {
    /// Creates a provider seeded from the operating system
    ///
    /// # Errors
    ///
    /// Returns error unless `failure_rate` is within `0.0..=1.0`
    pub fn new(failure_rate: f64) -> Result<Self, InfraError> {
        Self::build(failure_rate, StdRng::from_os_rng())
    }

    /// Creates a provider whose decisions repeat for the same seed
    pub fn seeded(failure_rate: f64, seed: u64) -> Result<Self, InfraError> {
        Self::build(failure_rate, StdRng::seed_from_u64(seed))
    }

    fn build(failure_rate: f64, rng: StdRng) -> Result<Self, InfraError> {
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(InfraError::Configuration(format!(
                "payment failure rate must be between 0 and 1, got {}",
                failure_rate
            )));
        }
        Ok(Self {
            failure_rate,
            rng: Mutex::new(rng),
        })
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl DomainPort for SimulatedPaymentProvider {}

#[async_trait]
impl PaymentAuthorizer for SimulatedPaymentProvider {
    async fn authorize(&self, invoice: &Invoice) -> Result<AuthorizationOutcome, PortError> {
        let declined = self.rng.lock().await.random_bool(self.failure_rate);
        debug!(invoice_id = %invoice.id(), declined, "Simulated payment decision");

        if declined {
            Ok(AuthorizationOutcome::declined(format!(
                "Payment authorization failed for invoice {}",
                invoice
            )))
        } else {
            Ok(AuthorizationOutcome::Authorized)
        }
    }
}
