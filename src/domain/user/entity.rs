//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_user_id, UserPatch, UserProfile, UserValidationError};

/// Opaque user identifier, assigned when the user is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller
    pub fn parse(id: &str) -> Result<Self, UserValidationError> {
        validate_user_id(id).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User account
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    user_name: String,
    email: String,
    phone: String,
    /// Salted hash, never the plaintext
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly generated identifier
    pub fn new(profile: UserProfile, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            user_name: profile.user_name,
            email: profile.email,
            phone: profile.phone,
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted state
    pub fn restore(
        id: UserId,
        profile: UserProfile,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            user_name: profile.user_name,
            email: profile.email,
            phone: profile.phone,
            password_hash: password_hash.into(),
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Overwrite the fields carried by a validated patch
    pub fn apply(&mut self, patch: UserPatch) {
        if patch.is_empty() {
            return;
        }

        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(user_name) = patch.user_name {
            self.user_name = user_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }

        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
pub(crate) fn test_profile(user_name: &str, email: &str, phone: &str) -> UserProfile {
    UserProfile {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        user_name: user_name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    }
}
