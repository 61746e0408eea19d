use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-owned account whose balance tracks every posted transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(owner_id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        Self::with_opening_balance(owner_id, name, kind, Decimal::ZERO)
    }

    pub fn with_opening_balance(
        owner_id: Uuid,
        name: impl Into<String>,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            kind,
            balance: opening_balance,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Cash,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Credit => "credit",
            AccountKind::Cash => "cash",
        };
        f.write_str(label)
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "cash" => Ok(AccountKind::Cash),
            other => Err(format!("unknown account kind `{other}`")),
        }
    }
}
