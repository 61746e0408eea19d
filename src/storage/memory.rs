use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    AccountStore, BudgetStore, CategoryStore, PlanStore, SpendAggregator, TransactionStore,
    UserStore,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::{Account, AccountKind, Budget, Category, RecurringPlan, Transaction, User};

/// Serializable snapshot of every entity the ledger tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerState {
    #[serde(default)]
    pub users: BTreeMap<Uuid, User>,
    #[serde(default)]
    pub accounts: BTreeMap<Uuid, Account>,
    #[serde(default)]
    pub categories: BTreeMap<Uuid, Category>,
    #[serde(default)]
    pub transactions: BTreeMap<Uuid, Transaction>,
    #[serde(default)]
    pub plans: BTreeMap<Uuid, RecurringPlan>,
    #[serde(default)]
    pub budgets: BTreeMap<Uuid, Budget>,
}

/// In-process backend. One lock guards the whole state, so each call is atomic
/// and balance deltas on the same account never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LedgerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Clones the current state, e.g. for persisting to disk.
    pub fn snapshot(&self) -> Result<LedgerState> {
        Ok(self.lock()?.clone())
    }

    /// Replaces the current state wholesale.
    pub fn restore(&self, state: LedgerState) -> Result<()> {
        *self.lock()? = state;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::StoreUnavailable("ledger state lock poisoned".into()))
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, id: Uuid) -> Result<User> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or(LedgerError::UserNotFound(id))
    }

    fn save_user(&self, user: User) -> Result<()> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }
}

impl AccountStore for MemoryStore {
    fn get_account(&self, id: Uuid) -> Result<Account> {
        self.lock()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn save_account(&self, account: Account) -> Result<()> {
        self.lock()?.accounts.insert(account.id, account);
        Ok(())
    }

    fn update_account_details(&self, id: Uuid, name: &str, kind: AccountKind) -> Result<Account> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.name = name.to_string();
        account.kind = kind;
        Ok(account.clone())
    }

    fn delete_account(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .accounts
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .filter(|account| account.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn apply_delta(&self, id: Uuid, delta: Decimal) -> Result<Account> {
        let mut updated = self.apply_deltas(&[(id, delta)])?;
        updated.pop().ok_or(LedgerError::AccountNotFound(id))
    }

    fn apply_deltas(&self, deltas: &[(Uuid, Decimal)]) -> Result<Vec<Account>> {
        let mut state = self.lock()?;

        // Stage every new balance first so a missing account or an overflow
        // leaves the stored balances untouched.
        let mut staged: HashMap<Uuid, Decimal> = HashMap::new();
        for (id, delta) in deltas {
            let current = match staged.get(id) {
                Some(balance) => *balance,
                None => {
                    state
                        .accounts
                        .get(id)
                        .ok_or(LedgerError::AccountNotFound(*id))?
                        .balance
                }
            };
            let next = current.checked_add(*delta).ok_or_else(|| {
                LedgerError::Validation(format!("balance overflow on account {id}"))
            })?;
            staged.insert(*id, next);
        }

        let mut updated = Vec::with_capacity(deltas.len());
        for (id, _) in deltas {
            if let (Some(account), Some(balance)) = (state.accounts.get_mut(id), staged.get(id)) {
                account.balance = *balance;
                updated.push(account.clone());
            }
        }
        Ok(updated)
    }
}

impl CategoryStore for MemoryStore {
    fn get_category(&self, id: Uuid) -> Result<Category> {
        self.lock()?
            .categories
            .get(&id)
            .cloned()
            .ok_or(LedgerError::CategoryNotFound(id))
    }

    fn save_category(&self, category: Category) -> Result<()> {
        self.lock()?.categories.insert(category.id, category);
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.lock()?.categories.values().cloned().collect())
    }
}

impl TransactionStore for MemoryStore {
    fn save_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.lock()?
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    fn get_transaction(&self, id: Uuid) -> Result<Transaction> {
        self.lock()?
            .transactions
            .get(&id)
            .cloned()
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    fn list_transactions(&self, owner_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self
            .lock()?
            .transactions
            .values()
            .filter(|txn| txn.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

impl PlanStore for MemoryStore {
    fn get_plan(&self, id: Uuid) -> Result<RecurringPlan> {
        self.lock()?
            .plans
            .get(&id)
            .cloned()
            .ok_or(LedgerError::PlanNotFound(id))
    }

    fn save_plan(&self, plan: RecurringPlan) -> Result<()> {
        self.lock()?.plans.insert(plan.id, plan);
        Ok(())
    }

    fn delete_plan(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .plans
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::PlanNotFound(id))
    }

    fn list_plans(&self, owner_id: Uuid) -> Result<Vec<RecurringPlan>> {
        Ok(self
            .lock()?
            .plans
            .values()
            .filter(|plan| plan.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn list_plans_due_on_or_before(&self, date: NaiveDate) -> Result<Vec<RecurringPlan>> {
        Ok(self
            .lock()?
            .plans
            .values()
            .filter(|plan| plan.upcoming_date <= date)
            .cloned()
            .collect())
    }
}

impl BudgetStore for MemoryStore {
    fn get_budget(&self, id: Uuid) -> Result<Budget> {
        self.lock()?
            .budgets
            .get(&id)
            .cloned()
            .ok_or(LedgerError::BudgetNotFound(id))
    }

    fn save_budget(&self, budget: Budget) -> Result<()> {
        self.lock()?.budgets.insert(budget.id, budget);
        Ok(())
    }

    fn update_budget_amount(&self, id: Uuid, amount: Decimal) -> Result<Budget> {
        let mut state = self.lock()?;
        let budget = state
            .budgets
            .get_mut(&id)
            .ok_or(LedgerError::BudgetNotFound(id))?;
        budget.amount = amount;
        Ok(budget.clone())
    }

    fn mark_alert_sent(&self, id: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        let budget = state
            .budgets
            .get_mut(&id)
            .ok_or(LedgerError::BudgetNotFound(id))?;
        Ok(!std::mem::replace(&mut budget.alert_sent, true))
    }

    fn delete_budget(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .budgets
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::BudgetNotFound(id))
    }

    fn list_budgets_by_period(&self, month: u32, year: i32) -> Result<Vec<Budget>> {
        Ok(self
            .lock()?
            .budgets
            .values()
            .filter(|budget| budget.in_period(month, year))
            .cloned()
            .collect())
    }
}

impl SpendAggregator for MemoryStore {
    fn sum_spend(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<Decimal>> {
        let state = self.lock()?;
        let mut matched = state
            .transactions
            .values()
            .filter(|txn| {
                txn.owner_id == owner_id
                    && txn.category_id == category_id
                    && txn.date.month() == month
                    && txn.date.year() == year
            })
            .peekable();
        if matched.peek().is_none() {
            return Ok(None);
        }
        Ok(Some(matched.map(|txn| txn.amount).sum()))
    }
}
