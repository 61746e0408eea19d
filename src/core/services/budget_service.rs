//! Budget management and spend-versus-budget progress.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::core::alerts::percent_used;
use crate::errors::{LedgerError, Result};
use crate::ledger::Budget;
use crate::storage::Stores;

/// How far one budget's period has progressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub budget_id: Uuid,
    pub category_name: String,
    pub budgeted: Decimal,
    pub spent: Decimal,
    pub percent_used: Decimal,
    pub over_budget: bool,
}

pub struct BudgetService {
    stores: Stores,
}

impl BudgetService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// One budget per owner, category and period.
    pub fn create(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        month: u32,
        year: i32,
        amount: Decimal,
    ) -> Result<Budget> {
        validate_period(month)?;
        validate_amount(amount)?;
        self.stores.users.get_user(owner_id)?;
        self.stores.categories.get_category(category_id)?;
        let duplicate = self
            .stores
            .budgets
            .list_budgets_by_period(month, year)?
            .iter()
            .any(|budget| budget.owner_id == owner_id && budget.category_id == category_id);
        if duplicate {
            return Err(LedgerError::Validation(format!(
                "a budget for this category already exists for {month:02}/{year}"
            )));
        }
        let budget = Budget::new(owner_id, category_id, month, year, amount);
        self.stores.budgets.save_budget(budget.clone())?;
        tracing::info!(budget_id = %budget.id, month, year, amount = %amount, "budget created");
        Ok(budget)
    }

    /// Changes the budgeted amount. An alert already sent stays sent.
    pub fn update(&self, id: Uuid, amount: Decimal) -> Result<Budget> {
        validate_amount(amount)?;
        let budget = self.stores.budgets.update_budget_amount(id, amount)?;
        tracing::info!(budget_id = %id, amount = %amount, "budget updated");
        Ok(budget)
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.stores.budgets.delete_budget(id)?;
        tracing::info!(budget_id = %id, "budget deleted");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<Budget> {
        self.stores.budgets.get_budget(id)
    }

    pub fn list(&self, owner_id: Uuid, month: u32, year: i32) -> Result<Vec<Budget>> {
        Ok(self
            .stores
            .budgets
            .list_budgets_by_period(month, year)?
            .into_iter()
            .filter(|budget| budget.owner_id == owner_id)
            .collect())
    }

    pub fn progress(&self, owner_id: Uuid, month: u32, year: i32) -> Result<Vec<BudgetProgress>> {
        self.list(owner_id, month, year)?
            .into_iter()
            .map(|budget| {
                let category = self.stores.categories.get_category(budget.category_id)?;
                let spent = self
                    .stores
                    .spend
                    .sum_spend(owner_id, budget.category_id, month, year)?
                    .unwrap_or(Decimal::ZERO);
                Ok(BudgetProgress {
                    budget_id: budget.id,
                    category_name: category.name,
                    budgeted: budget.amount,
                    spent,
                    percent_used: percent_used(spent, budget.amount),
                    over_budget: spent > budget.amount,
                })
            })
            .collect()
    }
}

fn validate_period(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!("month {month} is out of range")))
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(LedgerError::Validation(
            "budget amount must be positive".into(),
        ))
    }
}
