//! Budget threshold sweep.
//!
//! Each budget is checked on its own: a failure is recorded in the report and
//! the sweep moves on. The alert flag is only written after a successful send,
//! so a failed send is retried by the next sweep. A flag write that fails after
//! the send can lead to a second notification later.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::Result;
use crate::ledger::Budget;
use crate::notify::Notifier;
use crate::storage::{BudgetStore, CategoryStore, SpendAggregator, Stores, UserStore};

/// Tunables for the sweep, usually taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    /// Fraction of the budget that triggers the alert (0.9 for 90%).
    pub threshold: Decimal,
    pub signature: String,
    pub currency_symbol: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AlertSettings {
    fn from(config: &Config) -> Self {
        Self {
            threshold: config.alert_threshold(),
            signature: config.notification_signature.clone(),
            currency_symbol: config.currency_symbol.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AlertOutcome {
    AlreadySent,
    BelowThreshold,
    Sent,
    /// Delivered, but the flag could not be stored.
    SentFlagNotSaved(String),
    /// Nothing was sent; the next sweep tries again.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetCheck {
    pub budget_id: Uuid,
    pub outcome: AlertOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub month: u32,
    pub year: i32,
    pub checks: Vec<BudgetCheck>,
}

impl SweepReport {
    pub fn sent(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                AlertOutcome::Sent | AlertOutcome::SentFlagNotSaved(_)
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, AlertOutcome::Failed(_)))
    }

    pub fn outcome(&self, budget_id: Uuid) -> Option<&AlertOutcome> {
        self.checks
            .iter()
            .find(|check| check.budget_id == budget_id)
            .map(|check| &check.outcome)
    }

    fn count(&self, predicate: impl Fn(&AlertOutcome) -> bool) -> usize {
        self.checks
            .iter()
            .filter(|check| predicate(&check.outcome))
            .count()
    }
}

/// Share of `budgeted` that `spent` represents, as a percentage. A zero budget
/// counts as fully used.
pub fn percent_used(spent: Decimal, budgeted: Decimal) -> Decimal {
    spent
        .checked_div(budgeted)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ONE_HUNDRED)
}

pub struct BudgetAlertService {
    users: Arc<dyn UserStore>,
    categories: Arc<dyn CategoryStore>,
    budgets: Arc<dyn BudgetStore>,
    spend: Arc<dyn SpendAggregator>,
    notifier: Arc<dyn Notifier>,
    settings: AlertSettings,
}

impl BudgetAlertService {
    pub fn new(stores: &Stores, notifier: Arc<dyn Notifier>, settings: AlertSettings) -> Self {
        Self {
            users: Arc::clone(&stores.users),
            categories: Arc::clone(&stores.categories),
            budgets: Arc::clone(&stores.budgets),
            spend: Arc::clone(&stores.spend),
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    /// Evaluates every budget of the period. Only a failure to list the
    /// budgets fails the sweep as a whole.
    pub fn check_budget_alerts(&self, month: u32, year: i32) -> Result<SweepReport> {
        tracing::info!(month, year, "budget alert sweep started");
        let budgets = self.budgets.list_budgets_by_period(month, year)?;
        let mut report = SweepReport {
            month,
            year,
            checks: Vec::with_capacity(budgets.len()),
        };
        for budget in budgets {
            let outcome = match self.check_budget(&budget) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(budget_id = %budget.id, error = %err, "budget alert check failed");
                    AlertOutcome::Failed(err.to_string())
                }
            };
            report.checks.push(BudgetCheck {
                budget_id: budget.id,
                outcome,
            });
        }
        tracing::info!(
            month,
            year,
            checked = report.checks.len(),
            sent = report.sent(),
            failed = report.failed(),
            "budget alert sweep completed"
        );
        Ok(report)
    }

    fn check_budget(&self, budget: &Budget) -> Result<AlertOutcome> {
        if budget.alert_sent {
            return Ok(AlertOutcome::AlreadySent);
        }
        let spent = self
            .spend
            .sum_spend(budget.owner_id, budget.category_id, budget.month, budget.year)?
            .unwrap_or(Decimal::ZERO);
        let threshold = budget.amount * self.settings.threshold;
        if spent < threshold {
            tracing::debug!(budget_id = %budget.id, %spent, %threshold, "budget below threshold");
            return Ok(AlertOutcome::BelowThreshold);
        }

        let user = self.users.get_user(budget.owner_id)?;
        let category = self.categories.get_category(budget.category_id)?;
        let subject = format!("Budget Alert: {}", category.name);
        let body = self.compose(&user.username, &category.name, spent, budget.amount);
        self.notifier.send(&user.email, &subject, &body)?;

        match self.budgets.mark_alert_sent(budget.id) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(budget_id = %budget.id, "alert flag was already set by another sweep");
            }
            Err(err) => {
                tracing::warn!(
                    budget_id = %budget.id,
                    error = %err,
                    "alert sent but flag not stored; a later sweep may alert again"
                );
                return Ok(AlertOutcome::SentFlagNotSaved(err.to_string()));
            }
        }
        tracing::info!(
            budget_id = %budget.id,
            recipient = %user.email,
            category = %category.name,
            "budget alert sent"
        );
        Ok(AlertOutcome::Sent)
    }

    fn compose(&self, username: &str, category: &str, spent: Decimal, budgeted: Decimal) -> String {
        let symbol = &self.settings.currency_symbol;
        format!(
            "Dear {username},\n\n\
             Your spending in the category '{category}' has reached {percent}% of your budget.\n\n\
             Budget: {symbol}{budgeted}\n\
             Current Spending: {symbol}{spent}\n\n\
             Please review your expenses.\n\n\
             Best regards,\n\
             {signature}",
            percent = money(percent_used(spent, budgeted)),
            budgeted = money(budgeted),
            spent = money(spent),
            signature = self.settings.signature,
        )
    }
}

fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_used_handles_zero_budget() {
        assert_eq!(
            percent_used(Decimal::new(91, 0), Decimal::new(100, 0)),
            Decimal::new(91, 0)
        );
        assert_eq!(
            percent_used(Decimal::new(5, 0), Decimal::ZERO),
            Decimal::ONE_HUNDRED
        );
    }

    #[test]
    fn money_always_shows_two_places() {
        assert_eq!(money(Decimal::new(91, 0)).to_string(), "91.00");
        assert_eq!(money(Decimal::new(33335, 3)).to_string(), "33.34");
    }

    #[test]
    fn default_settings_use_ninety_percent() {
        assert_eq!(AlertSettings::default().threshold, Decimal::new(9, 1));
    }
}
