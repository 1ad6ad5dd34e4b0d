//! Category entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::CategoryPatch;

/// Category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CategoryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a caller addresses a category in a path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryKey {
    Id(CategoryId),
    Name(String),
}

impl CategoryKey {
    /// A segment that parses as a UUID is an id, anything else is a name
    pub fn parse(segment: &str) -> Self {
        match Uuid::parse_str(segment.trim()) {
            Ok(id) => Self::Id(CategoryId(id)),
            Err(_) => Self::Name(segment.trim().to_string()),
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Category record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    id: CategoryId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            id: CategoryId::generate(),
            name: name.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a category from persisted state
    pub fn restore(
        id: CategoryId,
        name: String,
        description: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the key addresses this category
    pub fn matches(&self, key: &CategoryKey) -> bool {
        match key {
            CategoryKey::Id(id) => &self.id == id,
            CategoryKey::Name(name) => &self.name == name,
        }
    }

    pub fn apply(&mut self, patch: CategoryPatch) {
        if patch.is_empty() {
            return;
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }

        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        let id = Uuid::new_v4();
        assert_eq!(
            CategoryKey::parse(&id.to_string()),
            CategoryKey::Id(CategoryId(id))
        );
        assert_eq!(
            CategoryKey::parse(" books "),
            CategoryKey::Name("books".to_string())
        );
    }

    #[test]
    fn test_matches() {
        let category = Category::new("books", None);

        assert!(category.matches(&CategoryKey::Id(*category.id())));
        assert!(category.matches(&CategoryKey::Name("books".to_string())));
        assert!(!category.matches(&CategoryKey::Name("music".to_string())));
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let category = Category::new("books", Some("Printed matter".to_string()));
        let json = serde_json::to_value(&category).unwrap();

        assert_eq!(json["_id"], category.id().to_string());
        assert_eq!(json["name"], "books");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_apply_patch() {
        let mut category = Category::new("books", None);

        category.apply(CategoryPatch {
            description: Some("Printed matter".to_string()),
            ..Default::default()
        });

        assert_eq!(category.name(), "books");
        assert_eq!(category.description(), Some("Printed matter"));
    }
}
