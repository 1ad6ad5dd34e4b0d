//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations enforce uniqueness of user name, email and phone
/// atomically with the write and report collisions as
/// `DomainError::Duplicate` naming the field.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their email address (for login)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace an existing user
    ///
    /// Returns `Ok(None)` when no user has the given ID.
    async fn update(&self, user: &User) -> Result<Option<User>, DomainError>;

    /// Delete a user, returning whether a record was removed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// List all users, oldest first
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Count users
    async fn count(&self) -> Result<usize, DomainError>;
}
