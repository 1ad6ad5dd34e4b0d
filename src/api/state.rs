//! Application state for shared services

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::category::{Category, CategoryRepository, NewCategoryInput};
use crate::domain::user::{LoginInput, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::category::CategoryService;
use crate::infrastructure::user::{PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub category_service: Arc<dyn CategoryServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, fields: Map<String, Value>) -> Result<User, DomainError>;
    async fn authenticate(&self, input: LoginInput) -> Result<User, DomainError>;
    async fn get(&self, id: &str) -> Result<User, DomainError>;
    async fn find(&self, id: &UserId) -> Result<Option<User>, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Trait for category service operations
#[async_trait::async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    async fn create(&self, input: NewCategoryInput) -> Result<Category, DomainError>;
    async fn get(&self, key: &str) -> Result<Category, DomainError>;
    async fn list(&self) -> Result<Vec<Category>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn update(&self, key: &str, fields: Map<String, Value>)
        -> Result<Category, DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + ?Sized + 'static,
{
    async fn create(&self, fields: Map<String, Value>) -> Result<User, DomainError> {
        UserService::create(self, fields).await
    }

    async fn authenticate(&self, input: LoginInput) -> Result<User, DomainError> {
        UserService::authenticate(self, input).await
    }

    async fn get(&self, id: &str) -> Result<User, DomainError> {
        UserService::get(self, id).await
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        UserService::find(self, id).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<User, DomainError> {
        UserService::update(self, id, fields).await
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        UserService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<R: CategoryRepository + 'static> CategoryServiceTrait for CategoryService<R> {
    async fn create(&self, input: NewCategoryInput) -> Result<Category, DomainError> {
        CategoryService::create(self, input).await
    }

    async fn get(&self, key: &str) -> Result<Category, DomainError> {
        CategoryService::get(self, key).await
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        CategoryService::list(self).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        CategoryService::count(self).await
    }

    async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Category, DomainError> {
        CategoryService::update(self, key, fields).await
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        CategoryService::delete(self, key).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        category_service: Arc<dyn CategoryServiceTrait>,
        jwt_service: Arc<dyn JwtGenerator>,
    ) -> Self {
        Self {
            user_service,
            category_service,
            jwt_service,
        }
    }
}
