//! Money types with exact minor-unit arithmetic
//!
//! Amounts are stored as an integer count of the currency's minor unit
//! (cents, pence, ...). Plan prices are charged over and over across billing
//! periods, so they must never pass through floating point. `rust_decimal` is
//! only used at the edges, to render the minor units as a fixed-point string.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    EUR,
    USD,
    GBP,
    CHF,
    JPY,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "€",
            Currency::USD => "$",
            Currency::GBP => "£",
            Currency::CHF => "CHF",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            "GBP" => Ok(Currency::GBP),
            "CHF" => Ok(Currency::CHF),
            "JPY" => Ok(Currency::JPY),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// A monetary amount with associated currency
///
/// The amount is an exact integer number of minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    /// Returns the amount in minor units
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the amount as an exact decimal in major units
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.minor_units, self.currency.decimal_places())
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Renders the amount as a fixed-point decimal string without symbol,
    /// e.g. `1999` cents become `"19.99"`.
    pub fn to_fixed_point(&self) -> String {
        self.amount().to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency.symbol(), self.to_fixed_point())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fixed_point_round_trips_through_decimal(minor in 0i64..1_000_000_000i64) {
            let money = Money::from_minor(minor, Currency::EUR);
            let parsed = Decimal::from_str(&money.to_fixed_point()).unwrap();
            prop_assert_eq!(parsed * Decimal::from(100), Decimal::from(minor));
        }

        #[test]
        fn fixed_point_always_has_two_decimals(minor in 0i64..1_000_000_000i64) {
            let rendered = Money::from_minor(minor, Currency::USD).to_fixed_point();
            let decimals = rendered.split('.').nth(1).map(str::len);
            prop_assert_eq!(decimals, Some(2));
        }
    }
}
