//! Migrate command - applies pending PostgreSQL migrations

use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::{run_migrations, PostgresMigrator};

/// Run all pending migrations against `storage.database_url`
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let pool = crate::connect_storage(&config).await?;

    let applied = run_migrations(&pool).await?;
    let version = PostgresMigrator::new(pool.clone()).current_version().await?;

    info!(
        applied,
        version = version.unwrap_or_default(),
        "Migrations complete"
    );

    pool.close().await;
    Ok(())
}
