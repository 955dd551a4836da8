//! Database migration command.
//!
//! Applies `crates/site/migrations/`: the `site.kv_store` table holding
//! users, formations and enrollments, and the `tower_sessions.session`
//! table.
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use super::{CommandError, connect};

/// Run the site migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}
