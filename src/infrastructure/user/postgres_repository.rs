//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::error::DuplicateKey;
use crate::domain::user::{User, UserId, UserProfile, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::map_write_error;

const USER_COLUMNS: &str = "id, first_name, last_name, user_name, email, phone, \
                            password_hash, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
///
/// Uniqueness is enforced by the `users_user_name_key`, `users_email_key`
/// and `users_phone_key` constraints.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, user_name, email, phone,
                               password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.user_name())
        .bind(user.email())
        .bind(user.phone())
        .bind(user.password_hash())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create user", duplicate_key_for))?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, user_name = $4, email = $5,
                phone = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.user_name())
        .bind(user.email())
        .bind(user.phone())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to update user", duplicate_key_for))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let profile = UserProfile {
        first_name: row.try_get("first_name").map_err(read)?,
        last_name: row.try_get("last_name").map_err(read)?,
        user_name: row.try_get("user_name").map_err(read)?,
        email: row.try_get("email").map_err(read)?,
        phone: row.try_get("phone").map_err(read)?,
    };
    let password_hash: String = row.try_get("password_hash").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read)?;

    Ok(User::restore(
        UserId::from(id),
        profile,
        password_hash,
        created_at,
        updated_at,
    ))
}

/// Resolve a violated unique constraint to the field it guards
fn duplicate_key_for(constraint: &str) -> DuplicateKey {
    match constraint {
        "users_user_name_key" => DuplicateKey::UserName,
        "users_email_key" => DuplicateKey::Email,
        "users_phone_key" => DuplicateKey::Phone,
        _ => DuplicateKey::Unknown,
    }
}
