//! Balance effects of posted transactions.
//!
//! Every mutation goes through the account store's atomic delta operations;
//! the engine never reads a balance and writes it back.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Account, Transaction};
use crate::storage::{AccountStore, CategoryStore, Stores};

/// The signed change a transaction makes to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub account_id: Uuid,
    pub delta: Decimal,
}

impl Effect {
    pub fn reversed(self) -> Self {
        Self {
            account_id: self.account_id,
            delta: -self.delta,
        }
    }
}

#[derive(Clone)]
pub struct PostingEngine {
    accounts: Arc<dyn AccountStore>,
    categories: Arc<dyn CategoryStore>,
}

impl PostingEngine {
    pub fn new(stores: &Stores) -> Self {
        Self {
            accounts: Arc::clone(&stores.accounts),
            categories: Arc::clone(&stores.categories),
        }
    }

    /// Resolves the effect `transaction` has on its account, or `None` when it
    /// is unbanked. Fails without mutating anything when the category cannot
    /// carry a balance effect or the account does not exist.
    pub fn effect(&self, transaction: &Transaction) -> Result<Option<Effect>> {
        let Some(account_id) = transaction.account_id else {
            return Ok(None);
        };
        let category = self.categories.get_category(transaction.category_id)?;
        let sign = category
            .kind
            .sign()
            .ok_or(LedgerError::InvalidCategoryKind {
                category: category.id,
                kind: category.kind,
            })?;
        self.accounts.get_account(account_id)?;
        Ok(Some(Effect {
            account_id,
            delta: sign * transaction.amount,
        }))
    }

    /// Adds the transaction's signed amount to its account.
    pub fn apply_effect(&self, transaction: &Transaction) -> Result<Option<Account>> {
        match self.effect(transaction)? {
            Some(effect) => self.commit(effect).map(Some),
            None => Ok(None),
        }
    }

    /// Removes a previously applied effect. Pass the transaction as it was
    /// when the effect was applied.
    pub fn reverse_effect(&self, transaction: &Transaction) -> Result<Option<Account>> {
        match self.effect(transaction)? {
            Some(effect) => self.commit(effect.reversed()).map(Some),
            None => Ok(None),
        }
    }

    /// Swaps `old`'s effect for `new`'s in one atomic batch, so no reader sees
    /// the old effect gone and the new one missing.
    pub fn repost(&self, old: &Transaction, new: &Transaction) -> Result<Vec<Account>> {
        let mut deltas = Vec::with_capacity(2);
        if let Some(effect) = self.effect(old)? {
            deltas.push((effect.account_id, -effect.delta));
        }
        if let Some(effect) = self.effect(new)? {
            deltas.push((effect.account_id, effect.delta));
        }
        if deltas.is_empty() {
            return Ok(Vec::new());
        }
        let updated = self.accounts.apply_deltas(&deltas)?;
        tracing::info!(
            transaction_id = %new.id,
            accounts = updated.len(),
            "transaction reposted"
        );
        Ok(updated)
    }

    fn commit(&self, effect: Effect) -> Result<Account> {
        let account = self.accounts.apply_delta(effect.account_id, effect.delta)?;
        tracing::debug!(
            account_id = %account.id,
            delta = %effect.delta,
            balance = %account.balance,
            "balance updated"
        );
        Ok(account)
    }
}
