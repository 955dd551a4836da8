//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions.session`) when a database
//! is configured and in process memory otherwise.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sp_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Signing key length expected by the cookie jar.
const SIGNING_KEY_LENGTH: usize = 64;

/// Session store selected at startup.
#[derive(Debug, Clone)]
pub enum SiteSessionStore {
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl SiteSessionStore {
    /// `PostgreSQL` store when a pool is given, memory otherwise.
    #[must_use]
    pub fn new(pool: Option<&PgPool>) -> Self {
        // The sessions table must be created via migration
        pool.map_or_else(
            || Self::Memory(MemoryStore::default()),
            |pool| Self::Postgres(PostgresStore::new(pool.clone())),
        )
    }
}

#[async_trait]
impl SessionStore for SiteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.create(record).await,
            Self::Postgres(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.save(record).await,
            Self::Postgres(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            Self::Memory(store) => store.load(session_id).await,
            Self::Postgres(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.delete(session_id).await,
            Self::Postgres(store) => store.delete(session_id).await,
        }
    }
}

/// Create the session layer.
///
/// # Arguments
///
/// * `store` - Session store
/// * `config` - Site configuration (cookie signing secret, HTTPS detection)
#[must_use]
pub fn create_session_layer(
    store: SiteSessionStore,
    config: &SiteConfig,
) -> SessionManagerLayer<SiteSessionStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}

/// Stretch the session secret to the key length by repetition.
///
/// The secret is at least 32 characters, so the signing half of the key is
/// the secret's first 32 bytes.
fn signing_key(config: &SiteConfig) -> Key {
    let material: Vec<u8> = config
        .session_secret
        .expose_secret()
        .bytes()
        .cycle()
        .take(SIGNING_KEY_LENGTH)
        .collect();
    Key::try_from(material.as_slice()).unwrap_or_else(|_| {
        tracing::warn!("Session secret unusable as signing key, using an ephemeral key");
        Key::generate()
    })
}
