//! `PostgreSQL` storage backend.
//!
//! # Table: `site.kv_store`
//!
//! Created by `crates/site/migrations`, applied with:
//! ```bash
//! cargo run -p solar-portal-cli -- migrate
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{Storage, StorageError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// JSON records stored as `jsonb` rows.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT value FROM site.kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|Json(value)| value))
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO site.kv_store (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM site.kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
