//! Property-Based Test Generators
//!
//! Proptest strategies that only produce well-formed billing data.

use core_kernel::{Currency, Money};
use domain_billing::Subscriber;
use proptest::prelude::*;

use crate::builders::SubscriberBuilder;

/// Strategy for generating plan prices in minor units
pub fn price_strategy() -> impl Strategy<Value = Money> {
    (0i64..1_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::EUR))
}

/// Strategy for generating a single active subscriber
pub fn subscriber_strategy() -> impl Strategy<Value = Subscriber> {
    ("[A-Z][a-z]{1,10}", "[A-Z][a-z]{1,12}", "[a-z]{3,10}", price_strategy()).prop_map(
        |(first, last, mailbox, price)| {
            SubscriberBuilder::new()
                .with_name(first, last)
                .with_email(format!("{}@example.com", mailbox))
                .with_price(price)
                .build()
        },
    )
}

/// Strategy for a batch of subscribers, each paired with a flag saying
/// whether its payment should be declined
pub fn batch_with_declines_strategy(
    max_len: usize,
) -> impl Strategy<Value = (Vec<Subscriber>, Vec<bool>)> {
    prop::collection::vec((subscriber_strategy(), any::<bool>()), 0..=max_len)
        .prop_map(|pairs| {
            let (subscribers, declines): (Vec<Subscriber>, Vec<bool>) = pairs.into_iter().unzip();
            (subscribers, declines)
        })
}
