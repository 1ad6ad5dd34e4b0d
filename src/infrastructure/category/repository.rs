//! In-memory category repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::category::{Category, CategoryId, CategoryKey, CategoryRepository};
use crate::domain::error::DuplicateKey;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct CategoryTable {
    categories: HashMap<CategoryId, Category>,
    name_index: HashMap<String, CategoryId>,
}

impl CategoryTable {
    fn resolve(&self, key: &CategoryKey) -> Option<CategoryId> {
        match key {
            CategoryKey::Id(id) => self.categories.contains_key(id).then_some(*id),
            CategoryKey::Name(name) => self.name_index.get(name).copied(),
        }
    }

    fn name_taken(&self, category: &Category) -> bool {
        self.name_index
            .get(category.name())
            .is_some_and(|owner| owner != category.id())
    }
}

/// In-memory implementation of CategoryRepository
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    table: Arc<RwLock<CategoryTable>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn get(&self, key: &CategoryKey) -> Result<Option<Category>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .resolve(key)
            .and_then(|id| table.categories.get(&id))
            .cloned())
    }

    async fn create(&self, category: Category) -> Result<Category, DomainError> {
        let mut table = self.table.write().await;

        if table.name_taken(&category) {
            return Err(DomainError::duplicate(DuplicateKey::CategoryName));
        }

        table
            .name_index
            .insert(category.name().to_string(), *category.id());
        table.categories.insert(*category.id(), category.clone());

        Ok(category)
    }

    async fn update(&self, category: &Category) -> Result<Option<Category>, DomainError> {
        let mut table = self.table.write().await;

        let Some(old_name) = table
            .categories
            .get(category.id())
            .map(|c| c.name().to_string())
        else {
            return Ok(None);
        };

        if table.name_taken(category) {
            return Err(DomainError::duplicate(DuplicateKey::CategoryName));
        }

        table.name_index.remove(&old_name);
        table
            .name_index
            .insert(category.name().to_string(), *category.id());
        table.categories.insert(*category.id(), category.clone());

        Ok(Some(category.clone()))
    }

    async fn delete(&self, key: &CategoryKey) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        let Some(id) = table.resolve(key) else {
            return Ok(false);
        };

        if let Some(category) = table.categories.remove(&id) {
            table.name_index.remove(category.name());
        }

        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let table = self.table.read().await;
        let mut categories: Vec<Category> = table.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.created_at());
        Ok(categories)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.categories.len())
    }
}
