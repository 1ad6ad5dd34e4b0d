//! Category repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Category, CategoryKey};
use crate::domain::DomainError;

/// Repository trait for category storage
///
/// Names are unique; a collision is reported as
/// `DomainError::Duplicate(DuplicateKey::CategoryName)`.
#[async_trait]
pub trait CategoryRepository: Send + Sync + Debug {
    /// Find a category by id or by name
    async fn get(&self, key: &CategoryKey) -> Result<Option<Category>, DomainError>;

    async fn create(&self, category: Category) -> Result<Category, DomainError>;

    /// Replace an existing category, `Ok(None)` when it does not exist
    async fn update(&self, category: &Category) -> Result<Option<Category>, DomainError>;

    /// Delete a category, returning whether a record was removed
    async fn delete(&self, key: &CategoryKey) -> Result<bool, DomainError>;

    /// List all categories, oldest first
    async fn list(&self) -> Result<Vec<Category>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;
}
