//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use solar_portal_site::storage::{StorageError, create_pool};

/// Errors shared by the subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Reading or writing a stored record failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No account with the given email.
    #[error("No user with email: {0}")]
    UnknownUser(String),

    /// Bad input on stdin or the command line.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Connect to the site database named by `SITE_DATABASE_URL` or `DATABASE_URL`.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if neither is set.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = ["SITE_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(SecretString::from)
        .ok_or(CommandError::MissingEnvVar("SITE_DATABASE_URL"))?;

    tracing::info!("Connecting to site database...");
    Ok(create_pool(&database_url).await?)
}
