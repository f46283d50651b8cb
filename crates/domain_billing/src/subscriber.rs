//! Subscribers and their plans
//!
//! Subscribers are owned by an external listing; the billing run only reads a
//! snapshot of the active ones at run start.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Money, PlanId, SubscriberId};

use crate::error::BillingError;

/// A postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub house: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub zip: String,
}

impl Address {
    /// Creates a new address
    pub fn new(
        street: impl Into<String>,
        house: impl Into<String>,
        city: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            house: house.into(),
            city: city.into(),
            zip: zip.into(),
        }
    }

    /// Formats the address on a single line, e.g. `Main Street 4, 10115 Berlin`
    pub fn format(&self) -> String {
        format!("{} {}, {} {}", self.street, self.house, self.zip, self.city)
    }
}

/// A subscription plan with its recurring price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    #[validate(length(min = 1))]
    pub name: String,
    /// Price per billing period, in minor units
    pub price: Money,
}

impl SubscriptionPlan {
    /// Creates a new plan
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            id: PlanId::new_v7(),
            name: name.into(),
            price,
        }
    }

    /// Changes the price for future billing runs. Invoices already generated
    /// keep the price they were created with.
    pub fn reprice(&mut self, price: Money) {
        self.price = price;
    }
}

fn default_active() -> bool {
    true
}

/// A subscriber to a plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Subscriber {
    pub id: SubscriberId,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(nested)]
    pub shipping_address: Address,
    #[validate(nested)]
    pub billing_address: Address,
    #[validate(nested)]
    pub plan: SubscriptionPlan,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Subscriber {
    /// Creates a new, active subscriber
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        shipping_address: Address,
        billing_address: Address,
        plan: SubscriptionPlan,
    ) -> Self {
        Self {
            id: SubscriberId::new_v7(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            shipping_address,
            billing_address,
            plan,
            active: true,
        }
    }

    /// Returns the full name in "First Last" format
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stops billing this subscriber in future runs
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Checks that the record is complete enough to be invoiced.
    ///
    /// The snapshot builder assumes this holds; sources call it at load time.
    pub fn ensure_billable(&self) -> Result<(), BillingError> {
        self.validate().map_err(|errors| BillingError::InvalidSubscriber {
            subscriber_id: self.id.to_string(),
            reason: errors.to_string(),
        })?;

        if self.plan.price.is_negative() {
            return Err(BillingError::InvalidSubscriber {
                subscriber_id: self.id.to_string(),
                reason: format!("plan price {} is negative", self.plan.price),
            });
        }

        Ok(())
    }
}
