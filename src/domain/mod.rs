//! Domain layer - Core business logic and entities

pub mod category;
pub mod error;
pub mod user;

pub use category::{Category, CategoryId, CategoryKey, CategoryRepository};
pub use error::{DomainError, DuplicateKey, FieldError, FieldErrors};
pub use user::{User, UserId, UserRepository};
