//! CLI module for the accounts API
//!
//! Provides subcommands:
//! - `serve`: run the HTTP server (default)
//! - `migrate`: apply pending PostgreSQL migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Accounts API - user registration, authentication and categories
#[derive(Parser)]
#[command(name = "accounts-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default mode)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}

/// Load `.env`, the layered configuration and the log subscriber
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
