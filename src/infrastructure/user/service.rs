//! User service for registration, authentication and user management

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::user::{LoginInput, NewUserInput, User, UserId, UserPatch, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

const USER_NOT_FOUND: &str = "User not found";

/// User service
///
/// Uniqueness of user name, email and phone is left to the repository;
/// the service never checks before writing.
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher + ?Sized> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + ?Sized + 'static,
{
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    pub async fn create(&self, fields: Map<String, Value>) -> Result<User, DomainError> {
        let (profile, password) = NewUserInput::from_json(fields)?;

        let password_hash = self.hash_password(password).await?;
        let user = User::new(profile, password_hash);

        let user = self.repository.create(user).await?;
        debug!(user_id = %user.id(), "User created");

        Ok(user)
    }

    /// Authenticate by email and password
    ///
    /// Unknown email is `NotFound`, a wrong password is `Unauthorized`.
    pub async fn authenticate(&self, input: LoginInput) -> Result<User, DomainError> {
        let (email, password) = input.into_validated()?;

        let user = self
            .repository
            .get_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        if !self
            .verify_password(password, user.password_hash().to_string())
            .await?
        {
            return Err(DomainError::unauthorized("Invalid password"));
        }

        Ok(user)
    }

    /// Get a user by the textual form of its ID
    pub async fn get(&self, id: &str) -> Result<User, DomainError> {
        let user_id = parse_user_id(id)?;
        self.find(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    /// Look up a user by ID, `None` when absent
    pub async fn find(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Count users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Overwrite allow-listed profile fields
    pub async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<User, DomainError> {
        let user_id = parse_user_id(id)?;
        let patch = UserPatch::from_json(fields)?;

        let mut user = self
            .repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;

        if patch.is_empty() {
            return Ok(user);
        }

        user.apply(patch);

        let user = self
            .repository
            .update(&user)
            .await?
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))?;
        debug!(user_id = %user.id(), "User updated");

        Ok(user)
    }

    /// Delete a user; deleting a missing user is `NotFound`
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let user_id = parse_user_id(id)?;

        if !self.repository.delete(&user_id).await? {
            return Err(DomainError::not_found(USER_NOT_FOUND));
        }

        debug!(user_id = %user_id, "User deleted");
        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
    }
}

fn parse_user_id(id: &str) -> Result<UserId, DomainError> {
    UserId::parse(id).map_err(|_| DomainError::invalid_id("Invalid user id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DuplicateKey;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::password::BcryptHasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;
    use serde_json::json;

    fn create_service() -> UserService<InMemoryUserRepository, BcryptHasher> {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(BcryptHasher::new(4).unwrap());
        UserService::new(repository, hasher)
    }

    fn make_input(user_name: &str, email: &str, phone: &str) -> Map<String, Value> {
        fields(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "userName": user_name,
            "email": email,
            "phone": phone,
            "password": "analytical-engine"
        }))
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = create_service();

        let user = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        assert_eq!(user.user_name(), "ada_l");
        assert_ne!(user.password_hash(), "analytical-engine");
        assert!(user.password_hash().starts_with("$2"));
    }

    #[tokio::test]
    async fn test_create_user_invalid_input() {
        let service = create_service();

        let result = service
            .create(make_input("abc", "not-an-email", "555-0100"))
            .await;

        match result {
            Err(DomainError::InvalidFields(errors)) => {
                assert!(errors.contains("userName"));
                assert!(errors.contains("email"));
            }
            other => panic!("expected field errors, got {other:?}"),
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_names_field() {
        let service = create_service();

        service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let result = service
            .create(make_input("ada_l", "other@example.com", "555-0199"))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Duplicate(DuplicateKey::UserName))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let service = create_service();
        let created = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let user = service
            .authenticate(login("ada@example.com", "analytical-engine"))
            .await
            .unwrap();

        assert_eq!(user.id(), created.id());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let service = create_service();
        service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let result = service
            .authenticate(login("ada@example.com", "difference-engine"))
            .await;

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let service = create_service();

        let result = service
            .authenticate(login("nobody@example.com", "analytical-engine"))
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_user() {
        let service = create_service();
        let created = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let user = service.get(&created.id().to_string()).await.unwrap();
        assert_eq!(user.email(), "ada@example.com");

        let missing = service.get(&UserId::generate().to_string()).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));

        let malformed = service.get("64f1c0ffee").await;
        assert!(matches!(malformed, Err(DomainError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn test_update_user() {
        let service = create_service();
        let created = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id().to_string(),
                fields(json!({"lastName": "Byron", "phone": "555-0199"})),
            )
            .await
            .unwrap();

        assert_eq!(updated.last_name(), "Byron");
        assert_eq!(updated.phone(), "555-0199");
        assert_eq!(updated.password_hash(), created.password_hash());
    }

    #[tokio::test]
    async fn test_update_forbidden_field_leaves_record_unchanged() {
        let service = create_service();
        let created = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();

        let result = service
            .update(
                &created.id().to_string(),
                fields(json!({"password": "new-password", "firstName": "Grace"})),
            )
            .await;
        assert!(matches!(result, Err(DomainError::InvalidFields(_))));

        let stored = service.get(&created.id().to_string()).await.unwrap();
        assert_eq!(stored.first_name(), "Ada");
        assert_eq!(stored.password_hash(), created.password_hash());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let service = create_service();

        let result = service
            .update(
                &UserId::generate().to_string(),
                fields(json!({"firstName": "Grace"})),
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_to_taken_email() {
        let service = create_service();
        service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();
        let second = service
            .create(make_input("grace_h", "grace@example.com", "555-0199"))
            .await
            .unwrap();

        let result = service
            .update(
                &second.id().to_string(),
                fields(json!({"email": "ada@example.com"})),
            )
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Duplicate(DuplicateKey::Email))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = create_service();
        let created = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();
        let id = created.id().to_string();

        service.delete(&id).await.unwrap();

        let again = service.delete(&id).await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_users() {
        let service = create_service();
        assert!(service.list().await.unwrap().is_empty());

        service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();
        service
            .create(make_input("grace_h", "grace@example.com", "555-0199"))
            .await
            .unwrap();

        let users = service.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_name(), "ada_l");
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repository = Arc::new(MockUserRepository::new());
        let service = UserService::new(
            Arc::clone(&repository),
            Arc::new(BcryptHasher::new(4).unwrap()),
        );

        repository.set_should_fail(true).await;

        let result = service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        let result = service.list().await;
        assert!(result.unwrap_err().is_server_side());
    }

    #[tokio::test]
    async fn test_works_with_dyn_hasher() {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(4).unwrap());
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()), hasher);

        service
            .create(make_input("ada_l", "ada@example.com", "555-0100"))
            .await
            .unwrap();
        assert!(service
            .authenticate(login("ada@example.com", "analytical-engine"))
            .await
            .is_ok());
    }
}
