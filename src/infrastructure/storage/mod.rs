//! Storage infrastructure - PostgreSQL pool, error mapping and migrations

pub mod migrations;
mod postgres;

pub use migrations::{account_migrations, run_migrations, Migration, PostgresMigrator};
pub(crate) use postgres::map_write_error;
pub use postgres::{connect_pool, PostgresConfig};
