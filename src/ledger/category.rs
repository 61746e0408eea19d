use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categorises ledger activity; the kind decides the sign of a posting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    #[serde(default = "Category::default_enabled")]
    pub enabled: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            enabled: true,
        }
    }

    fn default_enabled() -> bool {
        true
    }
}

/// Supported category types.
///
/// Only `Income` and `Expense` move an account balance; `Transfer` rows exist in
/// imported data but cannot be posted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryKind {
    Income,
    Expense,
    Transfer,
}

impl CategoryKind {
    /// Multiplier applied to a non-negative amount when posting, if the kind posts at all.
    pub fn sign(self) -> Option<Decimal> {
        match self {
            CategoryKind::Income => Some(Decimal::ONE),
            CategoryKind::Expense => Some(Decimal::NEGATIVE_ONE),
            CategoryKind::Transfer => None,
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            "transfer" => Ok(CategoryKind::Transfer),
            other => Err(format!("unknown category kind `{other}`")),
        }
    }
}
