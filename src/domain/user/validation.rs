//! User validation rules
//!
//! Field rules for registration and profile updates. Registration input is
//! validated as a whole so every violated field is reported at once; updates
//! only check the fields they carry.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::domain::error::{DomainError, FieldErrors};

pub const MIN_USER_NAME_LENGTH: usize = 4;
pub const MAX_USER_NAME_LENGTH: usize = 15;
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Upper bound on the plaintext password
///
/// bcrypt only reads the first 72 bytes of its input, so with the bcrypt
/// hasher two passwords sharing a 72-byte prefix verify as the same.
pub const MAX_PASSWORD_LENGTH: usize = 80;

/// Fields read from a registration payload
pub const REGISTRATION_FIELDS: [&str; 6] =
    ["firstName", "lastName", "userName", "email", "phone", "password"];

/// Fields a caller may change through a profile update
pub const UPDATABLE_FIELDS: [&str; 5] = ["firstName", "lastName", "userName", "email", "phone"];

const FIRST_NAME_REQUIRED: &str = "First name can't be empty";
const LAST_NAME_REQUIRED: &str = "Last name can't be empty";
const USER_NAME_REQUIRED: &str = "Username can't be empty";
const EMAIL_REQUIRED: &str = "Email can't be empty";
const PHONE_REQUIRED: &str = "Please enter your phone number";
const PASSWORD_REQUIRED: &str = "Password can't be empty";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$")
        .expect("email pattern is valid")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s+-]*$").expect("phone pattern is valid"));

/// Errors for the user identifier
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("Invalid user id '{0}'")]
    MalformedId(String),
}

/// Validate the textual form of a user identifier
pub fn validate_user_id(id: &str) -> Result<uuid::Uuid, UserValidationError> {
    let id = id.trim();

    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    uuid::Uuid::parse_str(id).map_err(|_| UserValidationError::MalformedId(id.to_string()))
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

fn validate_user_name_length(user_name: &str) -> Result<(), ValidationError> {
    let len = user_name.chars().count();

    if len < MIN_USER_NAME_LENGTH {
        return Err(field_error(
            "minLength",
            format!(
                "The username is too short! Minimum length is {} characters",
                MIN_USER_NAME_LENGTH
            ),
        ));
    }

    if len > MAX_USER_NAME_LENGTH {
        return Err(field_error(
            "maxLength",
            format!(
                "The username is too long! Maximum length is {} characters",
                MAX_USER_NAME_LENGTH
            ),
        ));
    }

    Ok(())
}

fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LENGTH {
        return Err(field_error(
            "minLength",
            format!(
                "The password is too short! Minimum length is {} characters",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(field_error(
            "maxLength",
            format!(
                "The password is too long! Maximum length is {} characters",
                MAX_PASSWORD_LENGTH
            ),
        ));
    }

    Ok(())
}

/// Validated, trimmed profile fields of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub phone: String,
}

/// Raw registration payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUserInput {
    #[validate(
        required(message = "First name can't be empty"),
        length(min = 1, message = "First name can't be empty")
    )]
    pub first_name: Option<String>,

    #[validate(
        required(message = "Last name can't be empty"),
        length(min = 1, message = "Last name can't be empty")
    )]
    pub last_name: Option<String>,

    #[validate(
        required(message = "Username can't be empty"),
        custom(function = "validate_user_name_length")
    )]
    pub user_name: Option<String>,

    #[validate(
        required(message = "Email can't be empty"),
        length(min = 1, message = "Email can't be empty"),
        regex(path = *EMAIL_REGEX, message = "Please fill a valid email address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Please enter your phone number"),
        length(min = 1, message = "Please enter your phone number"),
        regex(path = *PHONE_REGEX, message = "Please fill a valid phone number")
    )]
    pub phone: Option<String>,

    #[validate(
        required(message = "Password can't be empty"),
        custom(function = "validate_password_length")
    )]
    pub password: Option<String>,
}

impl NewUserInput {
    /// Trim every field except the password
    pub fn normalized(self) -> Self {
        Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            user_name: trimmed(self.user_name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            password: self.password,
        }
    }

    /// Build and validate a registration from an untyped JSON object
    ///
    /// Non-string values are reported as `type` errors alongside every other
    /// violated rule, so one response lists all offending fields. Unknown keys
    /// are ignored.
    pub fn from_json(mut fields: Map<String, Value>) -> Result<(UserProfile, String), DomainError> {
        let mut errors = FieldErrors::new();

        fields.retain(|key, value| {
            if !REGISTRATION_FIELDS.contains(&key.as_str()) {
                return false;
            }
            if value.is_null() || value.is_string() {
                return true;
            }
            errors.add(key.clone(), "type", format!("Field '{}' must be a string", key));
            false
        });

        let input: NewUserInput = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::validation(format!("Invalid registration payload: {}", e)))?;

        input.validated_with(errors)
    }

    /// Validate the whole payload on top of errors already collected
    ///
    /// Every violated field is reported in one `InvalidFields` error.
    fn validated_with(self, mut errors: FieldErrors) -> Result<(UserProfile, String), DomainError> {
        let input = self.normalized();

        if let Err(e) = input.validate() {
            let rule_errors = FieldErrors::from(e);

            // A field with the wrong type is reported once, as a type error
            for field in rule_errors.fields() {
                if errors.contains(field) {
                    continue;
                }
                for error in rule_errors.get(field).unwrap_or_default() {
                    errors.add(field, error.code.clone(), error.message.clone());
                }
            }
        }

        errors.into_result()?;

        match input {
            NewUserInput {
                first_name: Some(first_name),
                last_name: Some(last_name),
                user_name: Some(user_name),
                email: Some(email),
                phone: Some(phone),
                password: Some(password),
            } => Ok((
                UserProfile {
                    first_name,
                    last_name,
                    user_name,
                    email,
                    phone,
                },
                password,
            )),
            _ => Err(DomainError::validation("Incomplete registration payload")),
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Partial profile update restricted to [`UPDATABLE_FIELDS`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(length(min = 1, message = "First name can't be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name can't be empty"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_user_name_length"))]
    pub user_name: Option<String>,

    #[validate(
        length(min = 1, message = "Email can't be empty"),
        regex(path = *EMAIL_REGEX, message = "Please fill a valid email address")
    )]
    pub email: Option<String>,

    #[validate(
        length(min = 1, message = "Please enter your phone number"),
        regex(path = *PHONE_REGEX, message = "Please fill a valid phone number")
    )]
    pub phone: Option<String>,
}

impl UserPatch {
    /// Build a patch from an untyped JSON object
    ///
    /// Keys outside the allow-list and explicit `null`s are reported as field
    /// errors; supplied values are trimmed and validated.
    pub fn from_json(fields: Map<String, Value>) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        for (key, value) in &fields {
            if !UPDATABLE_FIELDS.contains(&key.as_str()) {
                errors.add(
                    key.clone(),
                    "forbidden_field",
                    format!("Field '{}' cannot be updated", key),
                );
            } else if value.is_null() {
                errors.add(key.clone(), "required", required_message(key));
            } else if !value.is_string() {
                errors.add(key.clone(), "type", format!("Field '{}' must be a string", key));
            }
        }

        errors.into_result()?;

        let patch: UserPatch = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::validation(format!("Invalid update payload: {}", e)))?;

        patch.into_validated()
    }

    fn into_validated(self) -> Result<Self, DomainError> {
        let patch = Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            user_name: trimmed(self.user_name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
        };

        patch.validate().map_err(DomainError::invalid_fields)?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(
        required(message = "Email can't be empty"),
        length(min = 1, message = "Email can't be empty")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password can't be empty"),
        length(min = 1, message = "Password can't be empty")
    )]
    pub password: Option<String>,
}

impl LoginInput {
    /// Returns the trimmed email and the password as given
    pub fn into_validated(self) -> Result<(String, String), DomainError> {
        let input = Self {
            email: trimmed(self.email),
            password: self.password,
        };

        input.validate().map_err(DomainError::invalid_fields)?;

        match (input.email, input.password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(DomainError::validation("Email and password are required")),
        }
    }
}

fn required_message(field: &str) -> &'static str {
    match field {
        "firstName" => FIRST_NAME_REQUIRED,
        "lastName" => LAST_NAME_REQUIRED,
        "userName" => USER_NAME_REQUIRED,
        "email" => EMAIL_REQUIRED,
        "phone" => PHONE_REQUIRED,
        _ => PASSWORD_REQUIRED,
    }
}
