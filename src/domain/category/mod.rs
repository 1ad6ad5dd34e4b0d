//! Category domain

mod entity;
mod repository;
mod validation;

pub use entity::{Category, CategoryId, CategoryKey};
pub use repository::CategoryRepository;
pub use validation::{CategoryPatch, NewCategoryInput};

#[cfg(test)]
pub use repository::mock::MockCategoryRepository;
