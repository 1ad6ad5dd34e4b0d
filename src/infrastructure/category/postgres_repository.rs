//! PostgreSQL category repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::category::{Category, CategoryId, CategoryKey, CategoryRepository};
use crate::domain::error::DuplicateKey;
use crate::domain::DomainError;
use crate::infrastructure::storage::map_write_error;

/// PostgreSQL implementation of CategoryRepository
#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn get(&self, key: &CategoryKey) -> Result<Option<Category>, DomainError> {
        let query = match key {
            CategoryKey::Id(id) => sqlx::query(
                "SELECT id, name, description, created_at, updated_at \
                 FROM categories WHERE id = $1",
            )
            .bind(*id.as_uuid()),
            CategoryKey::Name(name) => sqlx::query(
                "SELECT id, name, description, created_at, updated_at \
                 FROM categories WHERE name = $1",
            )
            .bind(name.as_str()),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get category: {}", e)))?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn create(&self, category: Category) -> Result<Category, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(category.id().as_uuid())
        .bind(category.name())
        .bind(category.description())
        .bind(category.created_at())
        .bind(category.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create category", duplicate_key_for))?;

        Ok(category)
    }

    async fn update(&self, category: &Category) -> Result<Option<Category>, DomainError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(category.id().as_uuid())
        .bind(category.name())
        .bind(category.description())
        .bind(category.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to update category", duplicate_key_for))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(category.clone()))
    }

    async fn delete(&self, key: &CategoryKey) -> Result<bool, DomainError> {
        let query = match key {
            CategoryKey::Id(id) => {
                sqlx::query("DELETE FROM categories WHERE id = $1").bind(*id.as_uuid())
            }
            CategoryKey::Name(name) => {
                sqlx::query("DELETE FROM categories WHERE name = $1").bind(name.as_str())
            }
        };

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete category: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, name, description, created_at, updated_at \
             FROM categories ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list categories: {}", e)))?;

        rows.iter().map(row_to_category).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count categories: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_category(row: &sqlx::postgres::PgRow) -> Result<Category, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid category row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let name: String = row.try_get("name").map_err(read)?;
    let description: Option<String> = row.try_get("description").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Ok(Category::restore(
        CategoryId::from(id),
        name,
        description,
        created_at,
        updated_at,
    ))
}

fn duplicate_key_for(constraint: &str) -> DuplicateKey {
    match constraint {
        "categories_name_key" => DuplicateKey::CategoryName,
        _ => DuplicateKey::Unknown,
    }
}
