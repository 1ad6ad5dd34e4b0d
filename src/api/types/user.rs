//! Wire representations of a user

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::user::{User, UserId};

/// Public subset of a user, returned on registration and login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_name: String,
}

impl From<&User> for SanitizedUser {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            user_name: user.user_name().to_string(),
        }
    }
}

/// Full stored record, returned by list, get and update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub phone: String,
    /// Stored hash, never the plaintext
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            user_name: user.user_name().to_string(),
            email: user.email().to_string(),
            phone: user.phone().to_string(),
            password: user.password_hash().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}
