mod common;

use budget_ledger::{
    core::AlertOutcome,
    errors::LedgerError,
    ledger::{DueStatus, Frequency, TransactionInput},
    storage::{PlanStore, TransactionStore},
};
use common::{date, dec, world};
use rust_decimal::Decimal;

#[test]
fn expense_posting_reduces_balance() {
    let (w, _) = world(date(2024, 3, 1));
    w.tracker
        .post_transaction(w.expense(50, date(2024, 3, 1)))
        .unwrap();
    assert_eq!(w.balance(), dec(-50));
}

#[test]
fn editing_the_amount_reposts_the_difference() {
    let (w, _) = world(date(2024, 3, 1));
    let txn = w
        .tracker
        .post_transaction(w.expense(50, date(2024, 3, 1)))
        .unwrap();
    assert_eq!(w.balance(), dec(-50));

    let mut edit = TransactionInput::from(&txn);
    edit.amount = dec(30);
    w.tracker.update_transaction(txn.id, edit).unwrap();
    assert_eq!(w.balance(), dec(-30));
}

#[test]
fn switching_category_kind_flips_the_sign() {
    let (w, _) = world(date(2024, 3, 1));
    let txn = w
        .tracker
        .post_transaction(w.expense(40, date(2024, 3, 1)))
        .unwrap();
    let mut edit = TransactionInput::from(&txn);
    edit.category_id = w.salary.id;
    w.tracker.update_transaction(txn.id, edit).unwrap();
    assert_eq!(w.balance(), dec(40));
}

#[test]
fn unbanked_transactions_leave_balances_alone() {
    let (w, _) = world(date(2024, 3, 1));
    let input = TransactionInput::new(w.user.id, w.groceries.id, dec(12), date(2024, 3, 1));
    let txn = w.tracker.post_transaction(input).unwrap();
    assert_eq!(w.balance(), Decimal::ZERO);
    w.tracker.delete_transaction(txn.id).unwrap();
    assert_eq!(w.balance(), Decimal::ZERO);
}

#[test]
fn daily_plan_materializes_on_its_due_date_and_advances() {
    let (w, _) = world(date(2024, 3, 10));
    let plan = w.plan(Frequency::Daily, 5, date(2024, 3, 10));

    let txn = w.tracker.materialize_plan(plan.id).unwrap();
    assert_eq!(txn.date, date(2024, 3, 10));
    assert_eq!(txn.amount, dec(5));
    assert_eq!(txn.account_id, Some(w.checking.id));
    assert_eq!(
        w.store.get_plan(plan.id).unwrap().upcoming_date,
        date(2024, 3, 11)
    );
    assert_eq!(w.balance(), dec(-5));
    assert!(w.store.get_transaction(txn.id).is_ok());
}

#[test]
fn materialize_is_not_idempotent() {
    let (w, _) = world(date(2024, 3, 10));
    let plan = w.plan(Frequency::Monthly, 100, date(2024, 1, 31));

    let first = w.tracker.materialize_plan(plan.id).unwrap();
    let second = w.tracker.materialize_plan(plan.id).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.date, date(2024, 1, 31));
    assert_eq!(second.date, date(2024, 2, 29));
    assert_eq!(
        w.store.get_plan(plan.id).unwrap().upcoming_date,
        date(2024, 3, 29)
    );
    assert_eq!(w.balance(), dec(-200));
}

#[test]
fn skip_moves_the_date_like_materialize_without_posting() {
    let (w, _) = world(date(2024, 3, 10));
    let posted = w.plan(Frequency::Monthly, 20, date(2024, 3, 10));
    let skipped = w.plan(Frequency::Monthly, 20, date(2024, 3, 10));

    w.tracker.materialize_plan(posted.id).unwrap();
    let after_skip = w.tracker.skip_plan(skipped.id).unwrap();

    assert_eq!(
        after_skip.upcoming_date,
        w.store.get_plan(posted.id).unwrap().upcoming_date
    );
    assert_eq!(w.balance(), dec(-20));
    assert_eq!(w.tracker.transactions().list(w.user.id).unwrap().len(), 1);
}

#[test]
fn monthly_plan_overdue_with_leftover_days_rounds_up() {
    let (w, _) = world(date(2024, 4, 20));
    let plan = w.plan(Frequency::Monthly, 10, date(2024, 1, 15));
    let status = w.tracker.get_due_status(plan.id).unwrap();
    assert_eq!(status, DueStatus::MonthsOverdue(4));
    assert_eq!(status.to_string(), "4 months overdue");
}

#[test]
fn monthly_plan_overdue_by_whole_months() {
    let (w, _) = world(date(2024, 4, 15));
    let plan = w.plan(Frequency::Monthly, 10, date(2024, 1, 15));
    assert_eq!(
        w.tracker.get_due_status(plan.id).unwrap().to_string(),
        "3 months overdue"
    );
}

#[test]
fn due_status_is_stable_for_the_same_inputs() {
    let (w, _) = world(date(2024, 3, 10));
    let plan = w.plan(Frequency::Daily, 1, date(2024, 3, 1));
    let first = w.tracker.get_due_status(plan.id).unwrap();
    let second = w.tracker.get_due_status(plan.id).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), "9 days overdue");
}

#[test]
fn budget_alert_fires_once_per_period() {
    let (w, outbox) = world(date(2024, 3, 20));
    let budget = w.budget(100, 3, 2024);
    w.tracker
        .post_transaction(w.expense(91, date(2024, 3, 5)))
        .unwrap();

    let first = w.tracker.run_budget_sweep(3, 2024).unwrap();
    assert_eq!(first.outcome(budget.id), Some(&AlertOutcome::Sent));
    assert!(w.tracker.budgets().get(budget.id).unwrap().alert_sent);

    let messages = outbox.messages().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipient, "ana@example.com");
    assert_eq!(messages[0].subject, "Budget Alert: Groceries");
    assert!(messages[0].body.contains("Dear ana,"));
    assert!(messages[0].body.contains("has reached 91.00% of your budget"));
    assert!(messages[0].body.contains("Budget: $100.00"));
    assert!(messages[0].body.contains("Current Spending: $91.00"));

    let second = w.tracker.run_budget_sweep(3, 2024).unwrap();
    assert_eq!(second.outcome(budget.id), Some(&AlertOutcome::AlreadySent));
    assert_eq!(second.sent(), 0);
    assert_eq!(outbox.len(), 1);
}

#[test]
fn spend_below_threshold_sends_nothing() {
    let (w, outbox) = world(date(2024, 3, 20));
    let budget = w.budget(100, 3, 2024);
    w.tracker
        .post_transaction(w.expense(89, date(2024, 3, 5)))
        .unwrap();
    let report = w.tracker.run_budget_sweep(3, 2024).unwrap();
    assert_eq!(report.outcome(budget.id), Some(&AlertOutcome::BelowThreshold));
    assert!(outbox.is_empty());
    assert!(!w.tracker.budgets().get(budget.id).unwrap().alert_sent);
}

#[test]
fn missing_plan_is_reported_as_not_found() {
    let (w, _) = world(date(2024, 3, 10));
    let ghost = uuid::Uuid::new_v4();
    assert!(matches!(
        w.tracker.materialize_plan(ghost),
        Err(LedgerError::PlanNotFound(id)) if id == ghost
    ));
    assert!(matches!(
        w.tracker.skip_plan(ghost),
        Err(LedgerError::PlanNotFound(_))
    ));
    assert!(matches!(
        w.tracker.get_due_status(ghost),
        Err(LedgerError::PlanNotFound(_))
    ));
}

#[test]
fn stored_plan_with_unknown_frequency_cannot_advance() {
    let (w, _) = world(date(2024, 3, 10));
    let mut plan = w.plan(Frequency::Daily, 5, date(2024, 3, 10));
    plan.frequency = Frequency::from("WEEKLY");
    w.store.save_plan(plan.clone()).unwrap();

    let err = w.tracker.materialize_plan(plan.id).unwrap_err();
    assert!(matches!(err, LedgerError::UnsupportedFrequency(ref raw) if raw == "WEEKLY"));
    assert_eq!(w.balance(), Decimal::ZERO);
    assert!(w.tracker.transactions().list(w.user.id).unwrap().is_empty());
    assert_eq!(
        w.store.get_plan(plan.id).unwrap().upcoming_date,
        date(2024, 3, 10)
    );
}
