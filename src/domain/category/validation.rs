//! Category validation rules

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::error::{DomainError, FieldErrors};

const UPDATABLE_FIELDS: [&str; 2] = ["name", "description"];

/// Raw category creation payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewCategoryInput {
    #[validate(
        required(message = "Category name can't be empty"),
        length(min = 1, max = 50, message = "Category name must be 1 to 50 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl NewCategoryInput {
    /// Trim and validate, returning the name and optional description
    pub fn into_validated(self) -> Result<(String, Option<String>), DomainError> {
        let input = Self {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
        };

        input.validate().map_err(DomainError::invalid_fields)?;

        let name = input
            .name
            .ok_or_else(|| DomainError::validation("Category name can't be empty"))?;

        Ok((name, input.description.filter(|d| !d.is_empty())))
    }
}

/// Partial category update
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct CategoryPatch {
    #[validate(
        length(min = 1, max = 50, message = "Category name must be 1 to 50 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl CategoryPatch {
    /// Build a patch from an untyped JSON object, rejecting unknown keys
    pub fn from_json(fields: Map<String, Value>) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        for (key, value) in &fields {
            if !UPDATABLE_FIELDS.contains(&key.as_str()) {
                errors.add(
                    key.clone(),
                    "forbidden_field",
                    format!("Field '{}' cannot be updated", key),
                );
            } else if !value.is_string() {
                errors.add(key.clone(), "type", format!("Field '{}' must be a string", key));
            }
        }

        errors.into_result()?;

        let patch: CategoryPatch = serde_json::from_value(Value::Object(fields))
            .map_err(|e| DomainError::validation(format!("Invalid update payload: {}", e)))?;

        let patch = Self {
            name: patch.name.map(|n| n.trim().to_string()),
            description: patch.description.map(|d| d.trim().to_string()),
        };

        patch.validate().map_err(DomainError::invalid_fields)?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
