//! Posting, editing, and deleting transactions while keeping balances in step.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::locks::KeyedLocks;
use crate::core::posting::PostingEngine;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Transaction, TransactionInput};
use crate::storage::Stores;

/// Validated CRUD for ledger transactions. Edits and deletes of the same
/// transaction are serialized so its effect is never reversed twice.
pub struct TransactionService {
    stores: Stores,
    posting: PostingEngine,
    locks: KeyedLocks,
}

impl TransactionService {
    pub fn new(stores: Stores) -> Self {
        Self {
            posting: PostingEngine::new(&stores),
            stores,
            locks: KeyedLocks::new(),
        }
    }

    pub fn posting(&self) -> &PostingEngine {
        &self.posting
    }

    /// Stores a new transaction and applies its balance effect.
    pub fn post(&self, input: TransactionInput) -> Result<Transaction> {
        self.validate(&input)?;
        let transaction = Transaction::from_input(input);
        let effect = self.posting.effect(&transaction)?;

        let saved = self.stores.transactions.save_transaction(transaction)?;
        if let Some(effect) = effect {
            if let Err(err) = self
                .stores
                .accounts
                .apply_delta(effect.account_id, effect.delta)
            {
                tracing::error!(
                    transaction_id = %saved.id,
                    account_id = %effect.account_id,
                    error = %err,
                    "transaction stored but balance not updated"
                );
                return Err(LedgerError::partial(
                    format!("transaction {} stored without balance effect", saved.id),
                    err,
                ));
            }
        }
        tracing::info!(
            transaction_id = %saved.id,
            amount = %saved.amount,
            "transaction posted"
        );
        Ok(saved)
    }

    /// Replaces the editable fields. The old effect is swapped for the new one
    /// atomically before the edited row is stored.
    pub fn update(&self, id: Uuid, input: TransactionInput) -> Result<Transaction> {
        self.validate(&input)?;
        self.locks.with_lock(id, || {
            let old = self.stores.transactions.get_transaction(id)?;
            let mut updated = old.clone();
            updated.apply_input(input);

            self.posting.repost(&old, &updated)?;
            match self.stores.transactions.save_transaction(updated) {
                Ok(saved) => {
                    tracing::info!(transaction_id = %id, "transaction updated");
                    Ok(saved)
                }
                Err(err) => {
                    tracing::error!(
                        transaction_id = %id,
                        error = %err,
                        "balances reposted but transaction edit not stored"
                    );
                    Err(LedgerError::partial(
                        format!("balances reposted for transaction {id}"),
                        err,
                    ))
                }
            }
        })
    }

    /// Removes the transaction and reverses its balance effect.
    pub fn delete(&self, id: Uuid) -> Result<Transaction> {
        self.locks.with_lock(id, || {
            let transaction = self.stores.transactions.get_transaction(id)?;
            let effect = self.posting.effect(&transaction)?;

            self.stores.transactions.delete_transaction(id)?;
            if let Some(effect) = effect {
                let reversed = effect.reversed();
                if let Err(err) = self
                    .stores
                    .accounts
                    .apply_delta(reversed.account_id, reversed.delta)
                {
                    tracing::error!(
                        transaction_id = %id,
                        account_id = %reversed.account_id,
                        error = %err,
                        "transaction deleted but balance effect not reversed"
                    );
                    return Err(LedgerError::partial(
                        format!("transaction {id} deleted with its effect still applied"),
                        err,
                    ));
                }
            }
            tracing::info!(transaction_id = %id, "transaction deleted");
            Ok(transaction)
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Transaction> {
        self.stores.transactions.get_transaction(id)
    }

    /// The owner's transactions by date, then creation time within a day.
    pub fn list(&self, owner_id: Uuid) -> Result<Vec<Transaction>> {
        let mut transactions = self.stores.transactions.list_transactions(owner_id)?;
        transactions.sort_by_key(|txn| (txn.date, txn.timestamp));
        Ok(transactions)
    }

    fn validate(&self, input: &TransactionInput) -> Result<()> {
        if input.amount < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "transaction amount must not be negative".into(),
            ));
        }
        self.stores.users.get_user(input.owner_id)?;
        self.stores.categories.get_category(input.category_id)?;
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
    use crate::ledger::{Account, AccountKind, Category, CategoryKind, User};
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate, Utc};
    use std::sync::Arc;

    struct Fixture {
        stores: Stores,
        service: TransactionService,
        user: User,
        account: Account,
        groceries: Category,
    }

    fn fixture() -> Fixture {
        let stores = Stores::shared(Arc::new(MemoryStore::new()));
        let user = User::new("ana", "ana@example.com");
        let account = Account::new(user.id, "Checking", AccountKind::Checking);
        let groceries = Category::new("Groceries", CategoryKind::Expense);
        stores.users.save_user(user.clone()).unwrap();
        stores.accounts.save_account(account.clone()).unwrap();
        stores.categories.save_category(groceries.clone()).unwrap();
        Fixture {
            service: TransactionService::new(stores.clone()),
            stores,
            user,
            account,
            groceries,
        }
    }

    fn input(fx: &Fixture, amount: i64, day: u32) -> TransactionInput {
        TransactionInput::new(
            fx.user.id,
            fx.groceries.id,
            Decimal::new(amount, 0),
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        )
        .with_account(fx.account.id)
    }

    fn balance(fx: &Fixture) -> Decimal {
        fx.stores.accounts.get_account(fx.account.id).unwrap().balance
    }

    #[test]
    fn delete_reverses_effect() {
        let fx = fixture();
        let txn = fx.service.post(input(&fx, 50, 1)).unwrap();
        assert_eq!(balance(&fx), Decimal::new(-50, 0));
        let removed = fx.service.delete(txn.id).unwrap();
        assert_eq!(removed.id, txn.id);
        assert_eq!(balance(&fx), Decimal::ZERO);
        assert!(matches!(
            fx.service.get(txn.id),
            Err(LedgerError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn update_can_unbank_a_transaction() {
        let fx = fixture();
        let txn = fx.service.post(input(&fx, 50, 1)).unwrap();
        let mut edit = input(&fx, 50, 1);
        edit.account_id = None;
        let updated = fx.service.update(txn.id, edit).unwrap();
        assert_eq!(updated.account_id, None);
        assert_eq!(updated.timestamp, txn.timestamp);
        assert_eq!(balance(&fx), Decimal::ZERO);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let fx = fixture();
        let err = fx.service.post(input(&fx, -1, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn update_of_missing_transaction_fails_cleanly() {
        let fx = fixture();
        let err = fx
            .service
            .update(Uuid::new_v4(), input(&fx, 10, 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionNotFound(_)));
        assert_eq!(balance(&fx), Decimal::ZERO);
    }

    #[test]
    fn list_orders_by_date_then_timestamp() {
        let fx = fixture();
        let now = Utc::now();
        let mut late = input(&fx, 1, 5);
        late.timestamp = Some(now);
        let mut early_second = input(&fx, 2, 2);
        early_second.timestamp = Some(now);
        let mut early_first = input(&fx, 3, 2);
        early_first.timestamp = Some(now - Duration::minutes(5));

        for item in [late, early_second, early_first] {
            fx.service.post(item).unwrap();
        }
        let amounts: Vec<_> = fx
            .service
            .list(fx.user.id)
            .unwrap()
            .into_iter()
            .map(|txn| txn.amount)
            .collect();
        assert_eq!(
            amounts,
            vec![Decimal::new(3, 0), Decimal::new(2, 0), Decimal::new(1, 0)]
        );
    }
}
