use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monthly spending guardrail for one owner and category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
    /// Set once the threshold alert went out; never cleared.
    #[serde(default)]
    pub alert_sent: bool,
}

impl Budget {
    pub fn new(owner_id: Uuid, category_id: Uuid, month: u32, year: i32, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            month,
            year,
            amount,
            alert_sent: false,
        }
    }

    pub fn in_period(&self, month: u32, year: i32) -> bool {
        self.month == month && self.year == year
    }
}
