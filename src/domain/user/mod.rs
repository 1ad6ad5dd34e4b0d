//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity, field validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_user_id, LoginInput, NewUserInput, UserPatch, UserProfile, UserValidationError,
    MAX_PASSWORD_LENGTH, MAX_USER_NAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USER_NAME_LENGTH,
    REGISTRATION_FIELDS, UPDATABLE_FIELDS,
};

#[cfg(test)]
pub(crate) use entity::test_profile;
#[cfg(test)]
pub use repository::mock::MockUserRepository;
