//! Store contracts consumed by the engines, plus the bundled in-memory and JSON backends.
//!
//! Every trait is object safe and `Send + Sync` so services can share one
//! backend across request threads behind `Arc<dyn ...>`.

pub mod json_backend;
pub mod memory;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{Account, AccountKind, Budget, Category, RecurringPlan, Transaction, User};

pub use json_backend::JsonStorage;
pub use memory::{LedgerState, MemoryStore};

pub trait UserStore: Send + Sync {
    fn get_user(&self, id: Uuid) -> Result<User>;
    fn save_user(&self, user: User) -> Result<()>;
    fn list_users(&self) -> Result<Vec<User>>;
}

pub trait AccountStore: Send + Sync {
    fn get_account(&self, id: Uuid) -> Result<Account>;
    /// Inserts or replaces the whole row, balance included.
    fn save_account(&self, account: Account) -> Result<()>;
    /// Changes name and kind without touching the balance.
    fn update_account_details(&self, id: Uuid, name: &str, kind: AccountKind) -> Result<Account>;
    fn delete_account(&self, id: Uuid) -> Result<()>;
    fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>>;
    /// Atomically adds `delta` to the balance and returns the updated account.
    fn apply_delta(&self, id: Uuid, delta: Decimal) -> Result<Account>;
    /// Applies every delta or none of them; no reader sees a partial batch.
    fn apply_deltas(&self, deltas: &[(Uuid, Decimal)]) -> Result<Vec<Account>>;
}

pub trait CategoryStore: Send + Sync {
    fn get_category(&self, id: Uuid) -> Result<Category>;
    fn save_category(&self, category: Category) -> Result<()>;
    fn list_categories(&self) -> Result<Vec<Category>>;
}

pub trait TransactionStore: Send + Sync {
    fn save_transaction(&self, transaction: Transaction) -> Result<Transaction>;
    fn get_transaction(&self, id: Uuid) -> Result<Transaction>;
    fn delete_transaction(&self, id: Uuid) -> Result<()>;
    fn list_transactions(&self, owner_id: Uuid) -> Result<Vec<Transaction>>;
}

pub trait PlanStore: Send + Sync {
    fn get_plan(&self, id: Uuid) -> Result<RecurringPlan>;
    fn save_plan(&self, plan: RecurringPlan) -> Result<()>;
    fn delete_plan(&self, id: Uuid) -> Result<()>;
    fn list_plans(&self, owner_id: Uuid) -> Result<Vec<RecurringPlan>>;
    fn list_plans_due_on_or_before(&self, date: NaiveDate) -> Result<Vec<RecurringPlan>>;
}

pub trait BudgetStore: Send + Sync {
    fn get_budget(&self, id: Uuid) -> Result<Budget>;
    fn save_budget(&self, budget: Budget) -> Result<()>;
    /// Changes only the budgeted amount of an existing row.
    fn update_budget_amount(&self, id: Uuid, amount: Decimal) -> Result<Budget>;
    /// Sets the alert flag of an existing row. `Ok(false)` when it was already
    /// set. A missing row is `BudgetNotFound` and is never re-created.
    fn mark_alert_sent(&self, id: Uuid) -> Result<bool>;
    fn delete_budget(&self, id: Uuid) -> Result<()>;
    fn list_budgets_by_period(&self, month: u32, year: i32) -> Result<Vec<Budget>>;
}

/// Read-only spend totals; `None` when nothing was spent in the period.
pub trait SpendAggregator: Send + Sync {
    fn sum_spend(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        month: u32,
        year: i32,
    ) -> Result<Option<Decimal>>;
}

/// Handles to every store the services need. Fields can be swapped individually.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub plans: Arc<dyn PlanStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub spend: Arc<dyn SpendAggregator>,
}

impl Stores {
    /// Uses one backend for every store role.
    pub fn shared<S>(backend: Arc<S>) -> Self
    where
        S: UserStore
            + AccountStore
            + CategoryStore
            + TransactionStore
            + PlanStore
            + BudgetStore
            + SpendAggregator
            + 'static,
    {
        Self {
            users: backend.clone(),
            accounts: backend.clone(),
            categories: backend.clone(),
            transactions: backend.clone(),
            plans: backend.clone(),
            budgets: backend.clone(),
            spend: backend,
        }
    }
}
