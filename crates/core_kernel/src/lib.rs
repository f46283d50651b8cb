//! Core Kernel - Foundational types for the subscription billing system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money stored as exact integer minor units
//! - Billing periods (calendar month/year)
//! - Strongly-typed identifiers
//! - The port error type used at every collaborator boundary

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{BillingPeriod, TemporalError};
pub use identifiers::{SubscriberId, PlanId, InvoiceId, RunId};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
