//! Billing period handling
//!
//! A billing run covers exactly one calendar month. The period is used as the
//! partition key for invoices and for the names of export artifacts, where it
//! is always rendered as `YYYY-MM`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to billing periods
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid year {0}")]
    InvalidYear(i32),

    #[error("Invalid period '{0}': expected MM-YYYY or YYYY-MM")]
    Unparseable(String),
}

/// A calendar month/year identifying one billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a period, validating the month and year
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::InvalidMonth(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(TemporalError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the period
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month and year are validated on construction")
    }

    /// Last calendar day of the period
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .expect("the first day of a month always has a predecessor")
    }

    /// The following period
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The preceding period
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Returns true if the date falls inside this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = TemporalError;

    /// Accepts both `MM-YYYY` (operator input) and `YYYY-MM` (artifact form)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || TemporalError::Unparseable(s.to_string());
        let (left, right) = s.trim().split_once('-').ok_or_else(unparseable)?;

        let (year, month) = match (left.len(), right.len()) {
            (1 | 2, 4) => (right, left),
            (4, 1 | 2) => (left, right),
            _ => return Err(unparseable()),
        };

        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(unparseable());
        }

        let year: i32 = year.parse().map_err(|_| unparseable())?;
        let month: u32 = month.parse().map_err(|_| unparseable())?;
        Self::new(year, month)
    }
}

impl Serialize for BillingPeriod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillingPeriod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
