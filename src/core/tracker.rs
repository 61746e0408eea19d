//! Entry point that wires the engines and services over one set of stores.

use std::sync::Arc;

use uuid::Uuid;

use super::alerts::{AlertSettings, BudgetAlertService, SweepReport};
use super::schedule::ScheduleEngine;
use super::services::{
    AccountService, BudgetService, CategoryService, PlanService, TransactionService, UserService,
};
use crate::errors::Result;
use crate::ledger::{Calendar, DueStatus, RecurringPlan, Transaction, TransactionInput};
use crate::notify::Notifier;
use crate::storage::Stores;

pub struct Tracker {
    stores: Stores,
    transactions: TransactionService,
    schedule: Arc<ScheduleEngine>,
    plans: PlanService,
    alerts: BudgetAlertService,
    accounts: AccountService,
    categories: CategoryService,
    budgets: BudgetService,
    users: UserService,
}

impl Tracker {
    pub fn new(
        stores: Stores,
        calendar: Arc<dyn Calendar>,
        notifier: Arc<dyn Notifier>,
        settings: AlertSettings,
    ) -> Self {
        let schedule = Arc::new(ScheduleEngine::new(stores.clone(), calendar));
        Self {
            transactions: TransactionService::new(stores.clone()),
            plans: PlanService::new(stores.clone(), Arc::clone(&schedule)),
            alerts: BudgetAlertService::new(&stores, notifier, settings),
            accounts: AccountService::new(stores.clone()),
            categories: CategoryService::new(stores.clone()),
            budgets: BudgetService::new(stores.clone()),
            users: UserService::new(stores.clone()),
            schedule,
            stores,
        }
    }

    pub fn post_transaction(&self, input: TransactionInput) -> Result<Transaction> {
        self.transactions.post(input)
    }

    pub fn update_transaction(&self, id: Uuid, input: TransactionInput) -> Result<Transaction> {
        self.transactions.update(id, input)
    }

    pub fn delete_transaction(&self, id: Uuid) -> Result<Transaction> {
        self.transactions.delete(id)
    }

    pub fn materialize_plan(&self, plan_id: Uuid) -> Result<Transaction> {
        self.schedule.materialize(plan_id)
    }

    pub fn skip_plan(&self, plan_id: Uuid) -> Result<RecurringPlan> {
        self.schedule.skip(plan_id)
    }

    pub fn get_due_status(&self, plan_id: Uuid) -> Result<DueStatus> {
        self.schedule.due_status(plan_id)
    }

    pub fn run_budget_sweep(&self, month: u32, year: i32) -> Result<SweepReport> {
        self.alerts.check_budget_alerts(month, year)
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn schedule(&self) -> &ScheduleEngine {
        &self.schedule
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn plans(&self) -> &PlanService {
        &self.plans
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn budgets(&self) -> &BudgetService {
        &self.budgets
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn alert_settings(&self) -> &AlertSettings {
        self.alerts.settings()
    }
}
