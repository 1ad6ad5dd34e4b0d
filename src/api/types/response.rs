//! Success envelope returned by every endpoint

use serde::Serialize;

/// Success body: `{success: true, message, data | user | newUser}`
///
/// At most one payload slot is filled; empty slots are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<T>,
    #[serde(rename = "newUser", skip_serializing_if = "Option::is_none")]
    pub new_user: Option<T>,
}

impl ApiResponse<()> {
    /// Message-only response
    pub fn message(message: impl Into<String>) -> Self {
        Self::empty(message)
    }
}

impl<T> ApiResponse<T> {
    fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            user: None,
            new_user: None,
        }
    }

    pub fn data(message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(message)
        }
    }

    pub fn user(message: impl Into<String>, user: T) -> Self {
        Self {
            user: Some(user),
            ..Self::empty(message)
        }
    }

    pub fn new_user(message: impl Into<String>, user: T) -> Self {
        Self {
            new_user: Some(user),
            ..Self::empty(message)
        }
    }
}
