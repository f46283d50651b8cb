//! Pre-built Test Fixtures
//!
//! Ready-to-use test data. Values are fixed so assertions can compare
//! against literals.

use core_kernel::{BillingPeriod, Currency, Money};
use domain_billing::{Address, Subscriber, SubscriptionPlan};

use crate::builders::SubscriberBuilder;

/// Fixture for billing periods
pub struct PeriodFixtures;

impl PeriodFixtures {
    /// December 2018
    pub fn december_2018() -> BillingPeriod {
        BillingPeriod::new(2018, 12).expect("valid fixture period")
    }

    /// March 2024
    pub fn march_2024() -> BillingPeriod {
        BillingPeriod::new(2024, 3).expect("valid fixture period")
    }
}

/// Fixture for money amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The standard plan price, 19.99 EUR
    pub fn eur_1999() -> Money {
        Money::from_minor(1999, Currency::EUR)
    }

    /// A round price, 5.00 EUR
    pub fn eur_500() -> Money {
        Money::from_minor(500, Currency::EUR)
    }
}

/// Fixture for addresses
pub struct AddressFixtures;

impl AddressFixtures {
    pub fn shipping() -> Address {
        Address::new("Lieferweg", "12a", "Hamburg", "20095")
    }

    pub fn billing() -> Address {
        Address::new("Rechnungsstraße", "7", "Berlin", "10115")
    }
}

/// Fixture for plans
pub struct PlanFixtures;

impl PlanFixtures {
    /// A monthly magazine plan at 19.99 EUR
    pub fn monthly_magazine() -> SubscriptionPlan {
        SubscriptionPlan::new("Monthly Magazine", MoneyFixtures::eur_1999())
    }

    /// A cheap digital-only plan at 5.00 EUR
    pub fn digital_only() -> SubscriptionPlan {
        SubscriptionPlan::new("Digital Only", MoneyFixtures::eur_500())
    }
}

/// Fixture for subscribers
pub struct SubscriberFixtures;

impl SubscriberFixtures {
    /// Ada Lovelace on the monthly magazine plan
    pub fn ada() -> Subscriber {
        SubscriberBuilder::new()
            .with_name("Ada", "Lovelace")
            .with_email("ada@example.com")
            .build()
    }

    /// Alan Turing on the monthly magazine plan
    pub fn alan() -> Subscriber {
        SubscriberBuilder::new()
            .with_name("Alan", "Turing")
            .with_email("alan@example.com")
            .build()
    }

    /// Grace Hopper on the digital-only plan
    pub fn grace() -> Subscriber {
        SubscriberBuilder::new()
            .with_name("Grace", "Hopper")
            .with_email("grace@example.com")
            .with_plan(PlanFixtures::digital_only())
            .build()
    }

    /// `count` distinct active subscribers
    pub fn many(count: usize) -> Vec<Subscriber> {
        (1..=count)
            .map(|n| {
                SubscriberBuilder::new()
                    .with_name(format!("First{}", n), format!("Last{}", n))
                    .with_email(format!("subscriber{}@example.com", n))
                    .build()
            })
            .collect()
    }
}
