use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A posted ledger entry. `account_id == None` marks an unbanked transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(owner_id: Uuid, category_id: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            account_id: None,
            description: String::new(),
            amount,
            date,
            timestamp: Utc::now(),
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

    /// Builds a fresh transaction from caller-supplied fields.
    pub fn from_input(input: TransactionInput) -> Self {
        let mut txn = Transaction::new(input.owner_id, input.category_id, input.amount, input.date);
        txn.account_id = input.account_id;
        txn.description = input.description;
        if let Some(timestamp) = input.timestamp {
            txn.timestamp = timestamp;
        }
        txn
    }

    /// Overwrites the editable fields, keeping id and (unless supplied) timestamp.
    pub fn apply_input(&mut self, input: TransactionInput) {
        self.owner_id = input.owner_id;
        self.category_id = input.category_id;
        self.account_id = input.account_id;
        self.description = input.description;
        self.amount = input.amount;
        self.date = input.date;
        if let Some(timestamp) = input.timestamp {
            self.timestamp = timestamp;
        }
    }
}

/// Fields a caller provides when posting or editing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub account_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransactionInput {
    pub fn new(owner_id: Uuid, category_id: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            owner_id,
            category_id,
            account_id: None,
            description: String::new(),
            amount,
            date,
            timestamp: None,
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
}

impl From<&Transaction> for TransactionInput {
    fn from(txn: &Transaction) -> Self {
        Self {
            owner_id: txn.owner_id,
            category_id: txn.category_id,
            account_id: txn.account_id,
            description: txn.description.clone(),
            amount: txn.amount,
            date: txn.date,
            timestamp: Some(txn.timestamp),
        }
    }
}
