use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::schedule::ScheduleEngine;
use crate::errors::{LedgerError, Result};
use crate::ledger::{DueStatus, Frequency, PlanInput, RecurringPlan};
use crate::storage::Stores;

/// Create, edit, delete and list recurring plans. Writes share the schedule
/// engine's per-plan lock so an edit never races a materialize.
pub struct PlanService {
    stores: Stores,
    schedule: Arc<ScheduleEngine>,
}

impl PlanService {
    pub fn new(stores: Stores, schedule: Arc<ScheduleEngine>) -> Self {
        Self { stores, schedule }
    }

    /// The first occurrence is due on `input.upcoming_date`, which also
    /// becomes the plan's start date.
    pub fn create(&self, input: PlanInput) -> Result<RecurringPlan> {
        self.validate(&input)?;
        let mut plan = RecurringPlan::new(
            input.owner_id,
            input.category_id,
            input.amount,
            input.frequency,
            input.upcoming_date,
        )
        .with_description(input.description);
        plan.account_id = input.account_id;
        self.stores.plans.save_plan(plan.clone())?;
        tracing::info!(plan_id = %plan.id, frequency = %plan.frequency, "plan created");
        Ok(plan)
    }

    /// Already posted transactions are not touched.
    pub fn edit(&self, id: Uuid, input: PlanInput) -> Result<RecurringPlan> {
        self.validate(&input)?;
        self.schedule.with_plan_lock(id, || {
            let mut plan = self.stores.plans.get_plan(id)?;
            plan.owner_id = input.owner_id;
            plan.category_id = input.category_id;
            plan.account_id = input.account_id;
            plan.amount = input.amount;
            plan.description = input.description;
            plan.frequency = input.frequency;
            plan.upcoming_date = input.upcoming_date;
            self.stores.plans.save_plan(plan.clone())?;
            tracing::info!(plan_id = %id, "plan updated");
            Ok(plan)
        })
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.schedule.with_plan_lock(id, || {
            self.stores.plans.delete_plan(id)?;
            tracing::info!(plan_id = %id, "plan deleted");
            Ok(())
        })
    }

    pub fn get(&self, id: Uuid) -> Result<RecurringPlan> {
        self.stores.plans.get_plan(id)
    }

    /// The owner's plans with their due status, soonest first.
    pub fn list(&self, owner_id: Uuid) -> Result<Vec<(RecurringPlan, DueStatus)>> {
        let mut plans = self.stores.plans.list_plans(owner_id)?;
        plans.sort_by_key(|plan| (plan.upcoming_date, plan.id));
        Ok(plans
            .into_iter()
            .map(|plan| {
                let status = self.schedule.classify(&plan);
                (plan, status)
            })
            .collect())
    }

    fn validate(&self, input: &PlanInput) -> Result<()> {
        if input.amount < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "plan amount must not be negative".into(),
            ));
        }
        if let Frequency::Other(raw) = &input.frequency {
            return Err(LedgerError::UnsupportedFrequency(raw.clone()));
        }
        self.stores.users.get_user(input.owner_id)?;
        let category = self.stores.categories.get_category(input.category_id)?;
        if input.account_id.is_some() && category.kind.sign().is_none() {
            return Err(LedgerError::InvalidCategoryKind {
                category: category.id,
                kind: category.kind,
            });
        }
        if let Some(account_id) = input.account_id {
            let account = self.stores.accounts.get_account(account_id)?;
            if account.owner_id != input.owner_id {
                return Err(LedgerError::Validation(format!(
                    "account {account_id} belongs to another user"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, CategoryKind, FixedCalendar, User};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (PlanService, User, Category) {
        let stores = Stores::shared(Arc::new(MemoryStore::new()));
        let user = User::new("ana", "ana@example.com");
        let rent = Category::new("Rent", CategoryKind::Expense);
        stores.users.save_user(user.clone()).unwrap();
        stores.categories.save_category(rent.clone()).unwrap();
        let schedule = Arc::new(ScheduleEngine::new(
            stores.clone(),
            Arc::new(FixedCalendar::new(date(2024, 3, 10))),
        ));
        (PlanService::new(stores, schedule), user, rent)
    }

    fn input(user: &User, category: &Category, frequency: &str, due: NaiveDate) -> PlanInput {
        PlanInput {
            owner_id: user.id,
            category_id: category.id,
            account_id: None,
            amount: Decimal::new(900, 0),
            description: "Rent".into(),
            frequency: Frequency::from(frequency),
            upcoming_date: due,
        }
    }

    #[test]
    fn create_rejects_unsupported_frequency() {
        let (service, user, rent) = setup();
        let err = service
            .create(input(&user, &rent, "WEEKLY", date(2024, 3, 1)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedFrequency(_)));
    }

    #[test]
    fn list_is_sorted_and_classified() {
        let (service, user, rent) = setup();
        service
            .create(input(&user, &rent, "DAILY", date(2024, 3, 11)))
            .unwrap();
        service
            .create(input(&user, &rent, "MONTHLY", date(2024, 3, 10)))
            .unwrap();
        let listed = service.list(user.id).unwrap();
        assert_eq!(listed[0].1, DueStatus::DueToday);
        assert_eq!(listed[1].1, DueStatus::DueTomorrow);
    }

    #[test]
    fn edit_keeps_start_date_and_delete_removes() {
        let (service, user, rent) = setup();
        let plan = service
            .create(input(&user, &rent, "MONTHLY", date(2024, 3, 1)))
            .unwrap();
        let edited = service
            .edit(plan.id, input(&user, &rent, "DAILY", date(2024, 4, 2)))
            .unwrap();
        assert_eq!(edited.start_date, date(2024, 3, 1));
        assert_eq!(edited.upcoming_date, date(2024, 4, 2));
        assert_eq!(edited.frequency, Frequency::Daily);

        service.delete(plan.id).unwrap();
        assert!(matches!(
            service.get(plan.id),
            Err(LedgerError::PlanNotFound(_))
        ));
    }
}
