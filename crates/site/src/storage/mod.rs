//! Key/value storage for JSON records.
//!
//! Every record the site keeps (formations, the user directory, enrollments,
//! the signed-in user) is a JSON blob under a well-known key. Backends:
//!
//! - [`MemoryStorage`] - process-local map (tests, local development)
//! - [`PgStorage`] - `site.kv_store` table in `PostgreSQL`
//! - `tower_sessions::Session` - the per-visitor store
//!
//! # Keys
//!
//! | Key                      | Scope   | Contents                 |
//! |--------------------------|---------|--------------------------|
//! | `formations_data`        | global  | `Vec<Formation>`         |
//! | `users`                  | global  | `Vec<User>`              |
//! | `enrollments/{user_id}`  | global  | `Vec<Enrollment>`        |
//! | `formations_next_id`     | global  | next formation id        |
//! | `users_next_id`          | global  | next user id             |
//! | `user`                   | session | `User`                   |
//! | `authToken`              | session | opaque token string      |

mod memory;
mod postgres;
mod session;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

pub use memory::MemoryStorage;
pub use postgres::{PgStorage, create_pool};

/// Well-known storage keys.
pub mod keys {
    use solar_portal_core::UserId;

    pub const FORMATIONS: &str = "formations_data";
    pub const USERS: &str = "users";
    pub const NEXT_FORMATION_ID: &str = "formations_next_id";
    pub const NEXT_USER_ID: &str = "users_next_id";
    pub const SESSION_USER: &str = "user";
    pub const AUTH_TOKEN: &str = "authToken";

    /// Key holding one user's enrollment records.
    #[must_use]
    pub fn enrollments(user_id: UserId) -> String {
        format!("enrollments/{user_id}")
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A string-keyed store of JSON values.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value under `key`.
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set_value(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn remove_value(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode the record under `key`.
///
/// A stored value that no longer decodes as `T` is logged, removed and
/// reported as absent.
///
/// # Errors
///
/// Returns `StorageError` if the backend fails.
pub async fn load<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(value) = storage.get_value(key).await? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable stored record");
            storage.remove_value(key).await?;
            Ok(None)
        }
    }
}

/// Encode and write `record` under `key`.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend fails.
pub async fn save<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    record: &T,
) -> Result<(), StorageError> {
    storage.set_value(key, serde_json::to_value(record)?).await
}

/// Take the next id from the counter under `key`.
///
/// The counter only moves forward, so an id is never handed out twice even
/// after its record is deleted. `highest` is the largest id currently in
/// use; the result is always above it. Callers hold the datastore lock.
///
/// # Errors
///
/// Returns `StorageError` if the backend fails.
pub async fn allocate_id(
    storage: &dyn Storage,
    key: &str,
    highest: Option<i64>,
) -> Result<i64, StorageError> {
    let counter: i64 = load(storage, key).await?.unwrap_or(1);
    let id = highest.map_or(counter, |highest| counter.max(highest + 1));
    save(storage, key, &(id + 1)).await?;
    Ok(id)
}

/// Shared handle to the global record store.
///
/// Read-modify-write sequences take [`Datastore::lock`] first so two
/// requests in this process never interleave their updates.
#[derive(Clone)]
pub struct Datastore {
    backend: Arc<dyn Storage>,
    write_lock: Arc<Mutex<()>>,
}

impl Datastore {
    #[must_use]
    pub fn new(backend: Arc<dyn Storage>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A datastore backed by process memory.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// A datastore backed by the `site.kv_store` table.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgStorage::new(pool)))
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Storage {
        self.backend.as_ref()
    }

    /// Serialize a read-modify-write sequence.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore").finish_non_exhaustive()
    }
}
