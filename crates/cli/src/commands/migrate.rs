//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! maru-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MARU_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! `crates/commerce/migrations/`

use secrecy::SecretString;
use thiserror::Error;

use maru_commerce::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending shop migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration does not apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARU_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("MARU_DATABASE_URL"))?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../commerce/migrations").run(&pool).await?;

    tracing::info!("Shop migrations complete!");
    Ok(())
}
