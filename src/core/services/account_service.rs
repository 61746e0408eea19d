use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Account, AccountKind};
use crate::storage::Stores;

/// Account lifecycle. Balances are only set at creation; afterwards they move
/// through postings alone.
pub struct AccountService {
    stores: Stores,
}

impl AccountService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        kind: AccountKind,
        opening_balance: Decimal,
    ) -> Result<Account> {
        self.stores.users.get_user(owner_id)?;
        self.validate_name(owner_id, None, name)?;
        let account = Account::with_opening_balance(owner_id, name.trim(), kind, opening_balance);
        self.stores.accounts.save_account(account.clone())?;
        tracing::info!(account_id = %account.id, kind = %kind, "account created");
        Ok(account)
    }

    /// Changes name and kind; the balance is left alone.
    pub fn rename(&self, id: Uuid, name: &str, kind: AccountKind) -> Result<Account> {
        let current = self.stores.accounts.get_account(id)?;
        self.validate_name(current.owner_id, Some(id), name)?;
        let account = self
            .stores
            .accounts
            .update_account_details(id, name.trim(), kind)?;
        tracing::info!(account_id = %id, "account updated");
        Ok(account)
    }

    /// Refuses while any transaction or plan still points at the account.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        let account = self.stores.accounts.get_account(id)?;
        let linked_transactions = self
            .stores
            .transactions
            .list_transactions(account.owner_id)?
            .iter()
            .any(|txn| txn.account_id == Some(id));
        if linked_transactions {
            return Err(LedgerError::Validation(
                "account has linked transactions".into(),
            ));
        }
        let linked_plans = self
            .stores
            .plans
            .list_plans(account.owner_id)?
            .iter()
            .any(|plan| plan.account_id == Some(id));
        if linked_plans {
            return Err(LedgerError::Validation(
                "account has linked recurring plans".into(),
            ));
        }
        self.stores.accounts.delete_account(id)?;
        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<Account> {
        self.stores.accounts.get_account(id)
    }

    pub fn list(&self, owner_id: Uuid) -> Result<Vec<Account>> {
        let mut accounts = self.stores.accounts.list_accounts(owner_id)?;
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(accounts)
    }

    fn validate_name(&self, owner_id: Uuid, exclude: Option<Uuid>, candidate: &str) -> Result<()> {
        let normalized = candidate.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LedgerError::Validation("account name is empty".into()));
        }
        let duplicate = self
            .stores
            .accounts
            .list_accounts(owner_id)?
            .iter()
            .any(|account| {
                account.name.trim().to_lowercase() == normalized
                    && exclude.map_or(true, |id| account.id != id)
            });
        if duplicate {
            Err(LedgerError::Validation(format!(
                "account `{}` already exists",
                candidate.trim()
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, CategoryKind, Transaction, User};
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn setup() -> (Stores, AccountService, User) {
        let stores = Stores::shared(Arc::new(MemoryStore::new()));
        let user = User::new("ana", "ana@example.com");
        stores.users.save_user(user.clone()).unwrap();
        (stores.clone(), AccountService::new(stores), user)
    }

    #[test]
    fn duplicate_names_are_rejected_per_owner() {
        let (_, service, user) = setup();
        service
            .create(user.id, "Checking", AccountKind::Checking, Decimal::ZERO)
            .unwrap();
        let err = service
            .create(user.id, " checking ", AccountKind::Savings, Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn rename_keeps_balance() {
        let (_, service, user) = setup();
        let account = service
            .create(user.id, "Wallet", AccountKind::Cash, Decimal::new(25, 0))
            .unwrap();
        let renamed = service
            .rename(account.id, "Pocket", AccountKind::Cash)
            .unwrap();
        assert_eq!(renamed.name, "Pocket");
        assert_eq!(renamed.balance, Decimal::new(25, 0));
    }

    #[test]
    fn delete_is_refused_while_transactions_reference_the_account() {
        let (stores, service, user) = setup();
        let account = service
            .create(user.id, "Checking", AccountKind::Checking, Decimal::ZERO)
            .unwrap();
        let category = Category::new("Food", CategoryKind::Expense);
        let txn = Transaction::new(
            user.id,
            category.id,
            Decimal::ONE,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_account(account.id);
        stores.transactions.save_transaction(txn.clone()).unwrap();

        assert!(matches!(
            service.delete(account.id),
            Err(LedgerError::Validation(_))
        ));
        stores.transactions.delete_transaction(txn.id).unwrap();
        service.delete(account.id).unwrap();
        assert!(matches!(
            service.get(account.id),
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}
