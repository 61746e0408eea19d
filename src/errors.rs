use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::CategoryKind;

/// Error type shared by the posting, schedule, and alert engines and their stores.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Recurring plan not found: {0}")]
    PlanNotFound(Uuid),
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Category {category} has kind {kind:?}, which carries no balance effect")]
    InvalidCategoryKind { category: Uuid, kind: CategoryKind },
    #[error("Unsupported plan frequency: {0}")]
    UnsupportedFrequency(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Notification failed: {0}")]
    Notification(String),
    #[error("Operation incomplete after {completed}: {source}")]
    PartialPosting {
        completed: String,
        #[source]
        source: Box<LedgerError>,
    },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    /// Wraps a failure that happened after `completed` already mutated state.
    pub fn partial(completed: impl Into<String>, source: LedgerError) -> Self {
        LedgerError::PartialPosting {
            completed: completed.into(),
            source: Box::new(source),
        }
    }

    /// True when retrying the whole operation may succeed without any data fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::StoreUnavailable(_) | LedgerError::Notification(_) | LedgerError::Io(_)
        )
    }

    /// True when state was mutated before the failure and needs a retry or manual fix.
    pub fn is_partial(&self) -> bool {
        matches!(self, LedgerError::PartialPosting { .. })
    }
}

pub type Result<T> = StdResult<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_posting_keeps_the_underlying_cause() {
        let err = LedgerError::partial(
            "transaction saved",
            LedgerError::StoreUnavailable("timeout".into()),
        );
        assert!(err.is_partial());
        assert!(!err.is_transient());
        let message = err.to_string();
        assert!(message.contains("transaction saved"), "{message}");
        assert!(message.contains("timeout"), "{message}");
    }

    #[test]
    fn not_found_is_not_transient() {
        assert!(!LedgerError::PlanNotFound(Uuid::nil()).is_transient());
        assert!(LedgerError::StoreUnavailable("down".into()).is_transient());
    }
}
