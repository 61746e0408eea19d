use crate::errors::{LedgerError, Result};
use crate::ledger::User;
use crate::storage::Stores;

pub struct UserService {
    stores: Stores,
}

impl UserService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Usernames are unique ignoring case; the email receives budget alerts.
    pub fn create(&self, username: &str, email: &str) -> Result<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || !email.contains('@') {
            return Err(LedgerError::Validation(
                "a username and a valid email are required".into(),
            ));
        }
        let taken = self
            .stores
            .users
            .list_users()?
            .iter()
            .any(|user| user.username.eq_ignore_ascii_case(username));
        if taken {
            return Err(LedgerError::Validation(format!(
                "user `{username}` already exists"
            )));
        }
        let user = User::new(username, email);
        self.stores.users.save_user(user.clone())?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let mut users = self.stores.users.list_users()?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn usernames_are_unique() {
        let service = UserService::new(Stores::shared(Arc::new(MemoryStore::new())));
        service.create("ana", "ana@example.com").unwrap();
        assert!(service.create("ANA", "other@example.com").is_err());
        assert!(service.create("ben", "not-an-email").is_err());
        assert_eq!(service.list().unwrap().len(), 1);
    }
}
