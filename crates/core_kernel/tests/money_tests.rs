//! Unit tests for the Money module
//!
//! Plan prices live as integer minor units; these tests pin down how they
//! render and combine.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(10050, Currency::USD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.minor_units(), 10050);
    }

    #[test]
    fn test_from_minor_handles_jpy_no_decimals() {
        let m = Money::from_minor(10000, Currency::JPY);
        assert_eq!(m.amount(), dec!(10000));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_negative_amount() {
        let m = Money::from_minor(-250, Currency::GBP);
        assert!(m.is_negative());
        assert_eq!(m.to_fixed_point(), "-2.50");
    }
}

mod formatting {
    use super::*;

    #[test]
    fn test_fixed_point_for_plan_price() {
        assert_eq!(Money::from_minor(1999, Currency::EUR).to_fixed_point(), "19.99");
    }

    #[test]
    fn test_display_includes_symbol() {
        assert_eq!(Money::from_minor(1999, Currency::EUR).to_string(), "€ 19.99");
        assert_eq!(Money::from_minor(1200, Currency::JPY).to_string(), "¥ 1200");
    }

    #[test]
    fn test_serde_keeps_minor_units() {
        let m = Money::from_minor(1999, Currency::CHF);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["minor_units"], 1999);
        assert_eq!(json["currency"], "CHF");

        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_unknown_currency_code_is_reported() {
        assert_eq!(
            "ABC".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency("ABC".to_string()))
        );
    }
}
