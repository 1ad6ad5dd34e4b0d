//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::error::DuplicateKey;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    user_name_index: HashMap<String, UserId>,
    email_index: HashMap<String, UserId>,
    phone_index: HashMap<String, UserId>,
}

impl UserTable {
    /// First unique field of `user` already held by a different record
    fn collision(&self, user: &User) -> Option<DuplicateKey> {
        let taken = |index: &HashMap<String, UserId>, value: &str| {
            index.get(value).is_some_and(|owner| owner != user.id())
        };

        if taken(&self.user_name_index, user.user_name()) {
            Some(DuplicateKey::UserName)
        } else if taken(&self.email_index, user.email()) {
            Some(DuplicateKey::Email)
        } else if taken(&self.phone_index, user.phone()) {
            Some(DuplicateKey::Phone)
        } else {
            None
        }
    }

    fn index(&mut self, user: &User) {
        let id = *user.id();
        self.user_name_index.insert(user.user_name().to_string(), id);
        self.email_index.insert(user.email().to_string(), id);
        self.phone_index.insert(user.phone().to_string(), id);
    }

    fn unindex(&mut self, user: &User) {
        self.user_name_index.remove(user.user_name());
        self.email_index.remove(user.email());
        self.phone_index.remove(user.phone());
    }
}

/// In-memory implementation of UserRepository
///
/// Records and unique indexes live behind one lock so a uniqueness check
/// and the write it guards are a single step.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::duplicate(DuplicateKey::Unknown));
        }

        if let Some(key) = table.collision(&user) {
            return Err(DomainError::duplicate(key));
        }

        table.index(&user);
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<Option<User>, DomainError> {
        let mut table = self.table.write().await;

        let Some(old_user) = table.users.get(user.id()).cloned() else {
            return Ok(None);
        };

        if let Some(key) = table.collision(user) {
            return Err(DomainError::duplicate(key));
        }

        table.unindex(&old_user);
        table.index(user);
        table.users.insert(*user.id(), user.clone());

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id) {
            Some(user) => {
                table.unindex(&user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        let mut users: Vec<User> = table.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at());
        Ok(users)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.table.read().await.users.len())
    }
}
