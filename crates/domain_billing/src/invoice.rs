//! Invoice snapshots
//!
//! An invoice copies everything it needs from the subscriber at creation
//! time: name, email, billing address, plan name and price. Later changes to
//! the subscriber or the plan never reach an invoice that already exists, so
//! an invoice stays a faithful record of what was billed.
//!
//! The only mutable part is the status, and it only ever moves from
//! [`InvoiceStatus::Open`] to [`InvoiceStatus::Paid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BillingPeriod, InvoiceId, Money, SubscriberId};

use crate::subscriber::{Address, Subscriber};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Not (yet) paid
    Open,
    /// Payment was authorized
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billing record for one subscriber and one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    subscriber_id: SubscriberId,
    first_name: String,
    last_name: String,
    email: String,
    billing_address: Address,
    plan_name: String,
    price: Money,
    period: BillingPeriod,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds the invoice snapshot for a subscriber and period.
    ///
    /// Only the identifier and creation timestamp are not derived from the
    /// arguments. The subscriber is expected to have passed
    /// [`Subscriber::ensure_billable`].
    pub fn for_subscriber(subscriber: &Subscriber, period: BillingPeriod) -> Self {
        Self {
            id: InvoiceId::new_v7(),
            subscriber_id: subscriber.id,
            first_name: subscriber.first_name.clone(),
            last_name: subscriber.last_name.clone(),
            email: subscriber.email.clone(),
            billing_address: subscriber.billing_address.clone(),
            plan_name: subscriber.plan.name.clone(),
            price: subscriber.plan.price,
            period,
            status: InvoiceStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the full name in "First Last" format
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    pub fn plan_name(&self) -> &str {
        &self.plan_name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_open(&self) -> bool {
        self.status == InvoiceStatus::Open
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Records a successful payment authorization.
    ///
    /// Returns `false` if the invoice was already paid. There is no way back
    /// to `Open`.
    pub fn mark_paid(&mut self) -> bool {
        if self.is_paid() {
            return false;
        }
        self.status = InvoiceStatus::Paid;
        true
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}, {} {}", self.id, self.first_name, self.last_name)
    }
}
