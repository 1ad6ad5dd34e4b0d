//! Accounts API
//!
//! JSON-over-HTTP backend for:
//! - User registration, login and bearer-token authentication
//! - User record maintenance (list, get, update, delete)
//! - A category resource addressable by id or name

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, warn};

use api::state::{AppState, CategoryServiceTrait, UserServiceTrait};
use config::{PasswordHasherKind, StorageBackend};
use infrastructure::{
    auth::{JwtConfig, JwtService},
    category::{CategoryService, InMemoryCategoryRepository, PostgresCategoryRepository},
    storage::{connect_pool, run_migrations, PostgresConfig},
    user::{
        Argon2Hasher, BcryptHasher, InMemoryUserRepository, PasswordHasher,
        PostgresUserRepository, UserService,
    },
};

/// Create the application state from configuration
///
/// Connects to PostgreSQL (and applies pending migrations) unless the memory
/// backend is selected.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher = create_password_hasher(config)?;
    let jwt_service = Arc::new(JwtService::new(create_jwt_config(config)));

    info!("Storage backend: {:?}", config.storage.backend);

    let (user_service, category_service): (
        Arc<dyn UserServiceTrait>,
        Arc<dyn CategoryServiceTrait>,
    ) = match config.storage.backend {
        StorageBackend::Memory => (
            Arc::new(UserService::new(
                Arc::new(InMemoryUserRepository::new()),
                hasher,
            )),
            Arc::new(CategoryService::new(Arc::new(
                InMemoryCategoryRepository::new(),
            ))),
        ),
        StorageBackend::Postgres => {
            let pool = connect_storage(config).await?;

            if config.storage.run_migrations {
                let applied = run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                info!(applied, "Database migrations complete");
            }

            (
                Arc::new(UserService::new(
                    Arc::new(PostgresUserRepository::new(pool.clone())),
                    hasher,
                )),
                Arc::new(CategoryService::new(Arc::new(
                    PostgresCategoryRepository::new(pool),
                ))),
            )
        }
    };

    Ok(AppState::new(user_service, category_service, jwt_service))
}

/// Open the PostgreSQL pool named by `storage.database_url`
pub async fn connect_storage(config: &AppConfig) -> anyhow::Result<PgPool> {
    let url = config
        .storage
        .database_url
        .as_deref()
        .context("DATABASE_URL (or storage.database_url) is required for the postgres backend")?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await
    .context("Failed to connect to PostgreSQL")?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

fn create_password_hasher(config: &AppConfig) -> anyhow::Result<Arc<dyn PasswordHasher>> {
    let hasher: Arc<dyn PasswordHasher> = match config.auth.password_hasher {
        PasswordHasherKind::Bcrypt => Arc::new(
            BcryptHasher::new(config.auth.bcrypt_cost).context("Invalid auth.bcrypt_cost")?,
        ),
        PasswordHasherKind::Argon2 => Arc::new(Argon2Hasher::new()),
    };

    Ok(hasher)
}

fn create_jwt_config(config: &AppConfig) -> JwtConfig {
    let hours = config.auth.jwt_expiration_hours;

    match config.auth.token_secret.as_deref() {
        Some(secret) => JwtConfig::new(secret, hours),
        None => {
            warn!(
                "No token secret configured (TOKEN_SECRET); using a random secret. \
                 Tokens will not survive a restart."
            );
            JwtConfig::with_random_secret(hours)
        }
    }
}
