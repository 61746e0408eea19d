#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use budget_ledger::{
    core::{AlertSettings, Tracker},
    errors::{LedgerError, Result},
    ledger::{
        Account, AccountKind, Budget, Category, CategoryKind, FixedCalendar, Frequency, PlanInput,
        RecurringPlan, TransactionInput, User,
    },
    notify::{Notifier, Outbox},
    storage::{AccountStore, BudgetStore, MemoryStore, PlanStore, Stores},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

pub struct World {
    pub tracker: Tracker,
    pub store: Arc<MemoryStore>,
    pub user: User,
    pub checking: Account,
    pub groceries: Category,
    pub salary: Category,
}

impl World {
    pub fn balance(&self) -> Decimal {
        self.store.get_account(self.checking.id).unwrap().balance
    }

    pub fn expense(&self, amount: i64, on: NaiveDate) -> TransactionInput {
        TransactionInput::new(self.user.id, self.groceries.id, dec(amount), on)
            .with_account(self.checking.id)
    }

    pub fn plan(&self, frequency: Frequency, amount: i64, due: NaiveDate) -> RecurringPlan {
        self.tracker
            .plans()
            .create(PlanInput {
                owner_id: self.user.id,
                category_id: self.groceries.id,
                account_id: Some(self.checking.id),
                amount: dec(amount),
                description: "Recurring".into(),
                frequency,
                upcoming_date: due,
            })
            .unwrap()
    }

    pub fn budget(&self, amount: i64, month: u32, year: i32) -> Budget {
        self.tracker
            .budgets()
            .create(self.user.id, self.groceries.id, month, year, dec(amount))
            .unwrap()
    }
}

/// A world over `store` whose individual store roles can be swapped first.
pub fn world_with(
    store: Arc<MemoryStore>,
    customize: impl FnOnce(&mut Stores),
    today: NaiveDate,
    notifier: Arc<dyn Notifier>,
) -> World {
    let user = User::new("ana", "ana@example.com");
    let checking = Account::new(user.id, "Checking", AccountKind::Checking);
    let groceries = Category::new("Groceries", CategoryKind::Expense);
    let salary = Category::new("Salary", CategoryKind::Income);
    {
        use budget_ledger::storage::{CategoryStore, UserStore};
        store.save_user(user.clone()).unwrap();
        store.save_account(checking.clone()).unwrap();
        store.save_category(groceries.clone()).unwrap();
        store.save_category(salary.clone()).unwrap();
    }
    let mut stores = Stores::shared(Arc::clone(&store));
    customize(&mut stores);
    let tracker = Tracker::new(
        stores,
        Arc::new(FixedCalendar::new(today)),
        notifier,
        AlertSettings::default(),
    );
    World {
        tracker,
        store,
        user,
        checking,
        groceries,
        salary,
    }
}

pub fn world(today: NaiveDate) -> (World, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::new());
    let world = world_with(
        Arc::new(MemoryStore::new()),
        |_| {},
        today,
        outbox.clone(),
    );
    (world, outbox)
}

fn unavailable(what: &str) -> LedgerError {
    LedgerError::StoreUnavailable(format!("{what} timed out"))
}

/// Account store whose balance writes can be made to time out.
pub struct FlakyAccounts {
    pub inner: Arc<MemoryStore>,
    pub fail_deltas: AtomicBool,
}

impl FlakyAccounts {
    pub fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_deltas: AtomicBool::new(false),
        })
    }
}

impl AccountStore for FlakyAccounts {
    fn get_account(&self, id: Uuid) -> Result<Account> {
        self.inner.get_account(id)
    }

    fn save_account(&self, account: Account) -> Result<()> {
        self.inner.save_account(account)
    }

    fn update_account_details(&self, id: Uuid, name: &str, kind: AccountKind) -> Result<Account> {
        self.inner.update_account_details(id, name, kind)
    }

    fn delete_account(&self, id: Uuid) -> Result<()> {
        self.inner.delete_account(id)
    }

    fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        self.inner.list_accounts(owner_id)
    }

    fn apply_delta(&self, id: Uuid, delta: Decimal) -> Result<Account> {
        if self.fail_deltas.load(Ordering::SeqCst) {
            return Err(unavailable("apply_delta"));
        }
        self.inner.apply_delta(id, delta)
    }

    fn apply_deltas(&self, deltas: &[(Uuid, Decimal)]) -> Result<Vec<Account>> {
        if self.fail_deltas.load(Ordering::SeqCst) {
            return Err(unavailable("apply_deltas"));
        }
        self.inner.apply_deltas(deltas)
    }
}

/// Plan store whose saves can be made to time out.
pub struct FlakyPlans {
    pub inner: Arc<MemoryStore>,
    pub fail_saves: AtomicBool,
}

impl FlakyPlans {
    pub fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_saves: AtomicBool::new(false),
        })
    }
}

impl PlanStore for FlakyPlans {
    fn get_plan(&self, id: Uuid) -> Result<RecurringPlan> {
        self.inner.get_plan(id)
    }

    fn save_plan(&self, plan: RecurringPlan) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable("save_plan"));
        }
        self.inner.save_plan(plan)
    }

    fn delete_plan(&self, id: Uuid) -> Result<()> {
        self.inner.delete_plan(id)
    }

    fn list_plans(&self, owner_id: Uuid) -> Result<Vec<RecurringPlan>> {
        self.inner.list_plans(owner_id)
    }

    fn list_plans_due_on_or_before(&self, date: NaiveDate) -> Result<Vec<RecurringPlan>> {
        self.inner.list_plans_due_on_or_before(date)
    }
}

/// Budget store whose saves can be made to time out.
pub struct FlakyBudgets {
    pub inner: Arc<MemoryStore>,
    pub fail_saves: AtomicBool,
}

impl FlakyBudgets {
    pub fn new(inner: Arc<MemoryStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_saves: AtomicBool::new(false),
        })
    }
}

impl BudgetStore for FlakyBudgets {
    fn get_budget(&self, id: Uuid) -> Result<Budget> {
        self.inner.get_budget(id)
    }

    fn save_budget(&self, budget: Budget) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable("save_budget"));
        }
        self.inner.save_budget(budget)
    }

    fn update_budget_amount(&self, id: Uuid, amount: Decimal) -> Result<Budget> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable("update_budget_amount"));
        }
        self.inner.update_budget_amount(id, amount)
    }

    fn mark_alert_sent(&self, id: Uuid) -> Result<bool> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable("mark_alert_sent"));
        }
        self.inner.mark_alert_sent(id)
    }

    fn delete_budget(&self, id: Uuid) -> Result<()> {
        self.inner.delete_budget(id)
    }

    fn list_budgets_by_period(&self, month: u32, year: i32) -> Result<Vec<Budget>> {
        self.inner.list_budgets_by_period(month, year)
    }
}

/// Notifier that can be told to fail; counts delivery attempts.
#[derive(Default)]
pub struct FlakyNotifier {
    pub outbox: Outbox,
    pub fail: AtomicBool,
    pub attempts: AtomicUsize,
}

impl Notifier for FlakyNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Notification("smtp relay refused".into()));
        }
        self.outbox.send(recipient, subject, body)
    }
}
