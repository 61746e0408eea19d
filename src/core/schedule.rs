//! Recurring plan lifecycle: materialize, skip, and due-status display.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::locks::KeyedLocks;
use super::posting::PostingEngine;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Calendar, DueStatus, Frequency, RecurringPlan, Transaction};
use crate::storage::Stores;

/// Next due date one period after `date`. Monthly steps follow the calendar's
/// month arithmetic, which clamps to the end of shorter months.
pub fn next_due_date(
    frequency: &Frequency,
    date: NaiveDate,
    calendar: &dyn Calendar,
) -> Result<NaiveDate> {
    let next = match frequency {
        Frequency::Daily => calendar.add_days(date, 1),
        Frequency::Monthly => calendar.add_months(date, 1),
        Frequency::Other(raw) => return Err(LedgerError::UnsupportedFrequency(raw.clone())),
    };
    next.ok_or_else(|| LedgerError::Validation(format!("due date {date} cannot be advanced")))
}

pub struct ScheduleEngine {
    stores: Stores,
    posting: PostingEngine,
    calendar: Arc<dyn Calendar>,
    locks: KeyedLocks,
}

impl ScheduleEngine {
    pub fn new(stores: Stores, calendar: Arc<dyn Calendar>) -> Self {
        Self {
            posting: PostingEngine::new(&stores),
            stores,
            calendar,
            locks: KeyedLocks::new(),
        }
    }

    pub fn calendar(&self) -> &dyn Calendar {
        self.calendar.as_ref()
    }

    /// Runs `f` in the same exclusion scope materialize and skip use.
    pub(crate) fn with_plan_lock<T>(
        &self,
        plan_id: Uuid,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.locks.with_lock(plan_id, f)
    }

    /// The plan's next due date, one period after its current one.
    pub fn advance(&self, plan: &RecurringPlan) -> Result<NaiveDate> {
        next_due_date(&plan.frequency, plan.upcoming_date, self.calendar.as_ref())
    }

    /// Posts the plan's current occurrence and moves the plan one period on.
    ///
    /// Not idempotent: each call posts and advances once. Calls for the same
    /// plan are serialized. Lookup and validation failures leave everything
    /// untouched; a failure after the transaction was stored is returned as
    /// [`LedgerError::PartialPosting`].
    pub fn materialize(&self, plan_id: Uuid) -> Result<Transaction> {
        self.locks.with_lock(plan_id, || {
            let mut plan = self.stores.plans.get_plan(plan_id)?;
            let next = self.advance(&plan)?;
            let occurrence = plan.occurrence();
            let effect = self.posting.effect(&occurrence)?;

            let saved = self.stores.transactions.save_transaction(occurrence)?;
            if let Some(effect) = effect {
                if let Err(err) = self.stores.accounts.apply_delta(effect.account_id, effect.delta)
                {
                    tracing::error!(
                        plan_id = %plan_id,
                        transaction_id = %saved.id,
                        error = %err,
                        "plan occurrence stored but balance not updated"
                    );
                    return Err(LedgerError::partial(
                        format!("transaction {} stored without balance effect", saved.id),
                        err,
                    ));
                }
            }

            plan.upcoming_date = next;
            if let Err(err) = self.stores.plans.save_plan(plan) {
                tracing::error!(
                    plan_id = %plan_id,
                    transaction_id = %saved.id,
                    error = %err,
                    "plan occurrence posted but due date not advanced"
                );
                return Err(LedgerError::partial(
                    format!("transaction {} posted, plan not advanced", saved.id),
                    err,
                ));
            }

            tracing::info!(
                plan_id = %plan_id,
                transaction_id = %saved.id,
                next_due = %next,
                "plan materialized"
            );
            Ok(saved)
        })
    }

    /// Moves the plan one period on without posting anything.
    pub fn skip(&self, plan_id: Uuid) -> Result<RecurringPlan> {
        self.locks.with_lock(plan_id, || {
            let mut plan = self.stores.plans.get_plan(plan_id)?;
            let skipped = plan.upcoming_date;
            plan.upcoming_date = self.advance(&plan)?;
            self.stores.plans.save_plan(plan.clone())?;
            tracing::info!(
                plan_id = %plan_id,
                skipped = %skipped,
                next_due = %plan.upcoming_date,
                "plan occurrence skipped"
            );
            Ok(plan)
        })
    }

    /// Due status relative to the calendar's today.
    pub fn classify(&self, plan: &RecurringPlan) -> DueStatus {
        DueStatus::classify(&plan.frequency, plan.upcoming_date, self.calendar.today())
    }

    pub fn due_status(&self, plan_id: Uuid) -> Result<DueStatus> {
        let plan = self.stores.plans.get_plan(plan_id)?;
        Ok(self.classify(&plan))
    }

    /// Plans due today or earlier, oldest first.
    pub fn due_plans(&self) -> Result<Vec<RecurringPlan>> {
        let mut plans = self
            .stores
            .plans
            .list_plans_due_on_or_before(self.calendar.today())?;
        plans.sort_by_key(|plan| (plan.upcoming_date, plan.id));
        Ok(plans)
    }
}
