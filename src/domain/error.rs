use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Validation error: {0}")]
    InvalidFields(FieldErrors),

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Duplicate key: {}", .0.message())]
    Duplicate(DuplicateKey),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_fields(errors: impl Into<FieldErrors>) -> Self {
        Self::InvalidFields(errors.into())
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn duplicate(key: DuplicateKey) -> Self {
        Self::Duplicate(key)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for failures caused by the server rather than the caller's input
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Internal { .. } | Self::Storage { .. }
        )
    }
}

/// The unique field a store reported a collision on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    UserName,
    Email,
    Phone,
    CategoryName,
    /// The store reported a collision but did not say which index
    Unknown,
}

impl DuplicateKey {
    /// Human-readable message shown to the caller
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserName => "Username already taken, please choose a different username.",
            Self::Email => "Email is already registered, please use a different email address.",
            Self::Phone => {
                "Phone number is already registered, please use a different phone number."
            }
            Self::CategoryName => {
                "Category name already exists, please choose a different name."
            }
            Self::Unknown => "Duplicate key error. Please check your input data.",
        }
    }

    /// Wire name of the colliding field, if known
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::UserName => Some("userName"),
            Self::Email => Some("email"),
            Self::Phone => Some("phone"),
            Self::CategoryName => Some("name"),
            Self::Unknown => None,
        }
    }
}

/// A single violated rule on a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub code: String,
    pub message: String,
}

/// Field-level validation failures, keyed by wire field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.0.entry(field.into()).or_default().push(FieldError {
            code: code.into(),
            message: message.into(),
        });
    }

    /// Merge another set of errors into this one
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, errors) in other.0 {
            self.0.entry(field).or_default().extend(errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when empty, otherwise the errors wrapped as a domain error
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidFields(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            let name = to_camel_case(&field.to_string());

            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", name));

                result.add(name.clone(), error.code.to_string(), message);
            }
        }

        result
    }
}

/// Struct fields are snake_case, the wire format is camelCase
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;

    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}
