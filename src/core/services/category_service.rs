use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Category, CategoryKind};
use crate::storage::Stores;

pub struct CategoryService {
    stores: Stores,
}

impl CategoryService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn create(&self, name: &str, kind: CategoryKind) -> Result<Category> {
        self.validate_name(name)?;
        let category = Category::new(name.trim(), kind);
        self.stores.categories.save_category(category.clone())?;
        tracing::info!(category_id = %category.id, kind = ?kind, "category created");
        Ok(category)
    }

    /// Disabled categories stay resolvable for existing postings.
    pub fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<Category> {
        let mut category = self.stores.categories.get_category(id)?;
        category.enabled = enabled;
        self.stores.categories.save_category(category.clone())?;
        Ok(category)
    }

    pub fn get(&self, id: Uuid) -> Result<Category> {
        self.stores.categories.get_category(id)
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        let mut categories = self.stores.categories.list_categories()?;
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    fn validate_name(&self, candidate: &str) -> Result<()> {
        let normalized = candidate.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LedgerError::Validation("category name is empty".into()));
        }
        let duplicate = self
            .stores
            .categories
            .list_categories()?
            .iter()
            .any(|category| category.name.trim().to_lowercase() == normalized);
        if duplicate {
            Err(LedgerError::Validation(format!(
                "category `{}` already exists",
                candidate.trim()
            )))
        } else {
            Ok(())
        }
    }
}
