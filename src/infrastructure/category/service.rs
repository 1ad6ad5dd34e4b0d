//! Category service

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::category::{
    Category, CategoryKey, CategoryPatch, CategoryRepository, NewCategoryInput,
};
use crate::domain::DomainError;

const CATEGORY_NOT_FOUND: &str = "Category not found";

/// Category service
#[derive(Debug)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, input: NewCategoryInput) -> Result<Category, DomainError> {
        let (name, description) = input.into_validated()?;

        let category = self
            .repository
            .create(Category::new(name, description))
            .await?;
        debug!(category_id = %category.id(), "Category created");

        Ok(category)
    }

    /// Look up by id or name, depending on the shape of `key`
    pub async fn get(&self, key: &str) -> Result<Category, DomainError> {
        self.repository
            .get(&CategoryKey::parse(key))
            .await?
            .ok_or_else(|| DomainError::not_found(CATEGORY_NOT_FOUND))
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.repository.list().await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    pub async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Category, DomainError> {
        let patch = CategoryPatch::from_json(fields)?;
        let mut category = self.get(key).await?;

        if patch.is_empty() {
            return Ok(category);
        }

        category.apply(patch);

        self.repository
            .update(&category)
            .await?
            .ok_or_else(|| DomainError::not_found(CATEGORY_NOT_FOUND))
    }

    pub async fn delete(&self, key: &str) -> Result<(), DomainError> {
        if !self.repository.delete(&CategoryKey::parse(key)).await? {
            return Err(DomainError::not_found(CATEGORY_NOT_FOUND));
        }

        debug!(key = %key, "Category deleted");
        Ok(())
    }
}
