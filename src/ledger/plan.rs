use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::Transaction;

/// A recurring definition that produces one posting per period when materialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurringPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub upcoming_date: NaiveDate,
}

impl RecurringPlan {
    /// Creates a plan whose first occurrence is due on `start_date`.
    pub fn new(
        owner_id: Uuid,
        category_id: Uuid,
        amount: Decimal,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            account_id: None,
            amount,
            description: String::new(),
            frequency,
            start_date,
            upcoming_date: start_date,
        }
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The transaction this plan posts for its current due occurrence.
    pub fn occurrence(&self) -> Transaction {
        let mut txn = Transaction::new(
            self.owner_id,
            self.category_id,
            self.amount,
            self.upcoming_date,
        )
        .with_description(self.description.clone());
        txn.account_id = self.account_id;
        txn
    }
}

/// How often a plan falls due. Values other than daily/monthly survive a
/// round-trip through storage but cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Monthly,
    Other(String),
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Frequency::Daily,
            "MONTHLY" => Frequency::Monthly,
            _ => Frequency::Other(value),
        }
    }
}

impl From<&str> for Frequency {
    fn from(value: &str) -> Self {
        Frequency::from(value.to_string())
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => f.write_str("DAILY"),
            Frequency::Monthly => f.write_str("MONTHLY"),
            Frequency::Other(raw) => f.write_str(raw),
        }
    }
}

/// Fields a caller provides when creating or editing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInput {
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub account_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
    pub frequency: Frequency,
    pub upcoming_date: NaiveDate,
}
