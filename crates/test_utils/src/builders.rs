//! Test Data Builders
//!
//! Builders let tests specify only the fields they care about.

use core_kernel::Money;
use domain_billing::{Address, Subscriber, SubscriptionPlan};

use crate::fixtures::{AddressFixtures, PlanFixtures};

/// Builder for constructing test subscribers
pub struct SubscriberBuilder {
    first_name: String,
    last_name: String,
    email: String,
    shipping_address: Address,
    billing_address: Address,
    plan: SubscriptionPlan,
    active: bool,
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            first_name: "Test".to_string(),
            last_name: "Subscriber".to_string(),
            email: "test.subscriber@example.com".to_string(),
            shipping_address: AddressFixtures::shipping(),
            billing_address: AddressFixtures::billing(),
            plan: PlanFixtures::monthly_magazine(),
            active: true,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_shipping_address(mut self, address: Address) -> Self {
        self.shipping_address = address;
        self
    }

    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = address;
        self
    }

    pub fn with_plan(mut self, plan: SubscriptionPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Keeps the default plan name but changes its price
    pub fn with_price(mut self, price: Money) -> Self {
        self.plan.reprice(price);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the subscriber
    pub fn build(self) -> Subscriber {
        let mut subscriber = Subscriber::new(
            self.first_name,
            self.last_name,
            self.email,
            self.shipping_address,
            self.billing_address,
            self.plan,
        );
        if !self.active {
            subscriber.deactivate();
        }
        subscriber
    }
}
