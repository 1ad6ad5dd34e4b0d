//! User infrastructure module
//!
//! Password hashing (bcrypt or Argon2), in-memory and PostgreSQL
//! repositories, and the user service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, BcryptHasher, PasswordHasher, DEFAULT_BCRYPT_COST};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::UserService;
