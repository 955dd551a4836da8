//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_BASE_URL` - Public URL for the site
//! - `SITE_SESSION_SECRET` - Session cookie signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_DATABASE_URL` / `DATABASE_URL` - `PostgreSQL` connection string;
//!   without it records and sessions live in process memory
//! - `SITE_ADMIN_EMAIL` - Email granted the admin panel at login
//! - `SITE_ADMIN_PASSWORD_HASH` - Argon2 PHC hash of that account's password
//! - `SITE_AUTH_DELAY_MS` - Simulated sign-in latency (default: 500)
//! - `GEMINI_API_KEY` - Generative model API key; without it estimates fail
//! - `GEMINI_MODEL` - Model name (default: gemini-3-flash-preview)
//! - `GEMINI_API_BASE` - API base URL (default: <https://generativelanguage.googleapis.com>)
//! - `GEMINI_TIMEOUT_SECS` - Estimate request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// `PostgreSQL` connection URL; `None` keeps everything in memory
    pub database_url: Option<SecretString>,
    /// Sign-in settings
    pub auth: AuthSettings,
    /// Generative model settings for the solar estimate
    pub gemini: GeminiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("session_secret", &"[REDACTED]")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("auth", &self.auth)
            .field("gemini", &self.gemini)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

/// Sign-in settings.
#[derive(Clone)]
pub struct AuthSettings {
    /// Account granted the admin panel when its password matches.
    pub admin_email: Option<String>,
    /// Argon2 PHC hash of the admin password.
    pub admin_password_hash: Option<SecretString>,
    /// Simulated latency applied to login and register.
    pub delay: Duration,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("admin_email", &self.admin_email)
            .field(
                "admin_password_hash",
                &self.admin_password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("delay", &self.delay)
            .finish()
    }
}

/// Generative model API configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; estimates are unavailable without it.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("SITE_HOST", "127.0.0.1")?;
        let port = parse_env("SITE_PORT", "3000")?;
        let base_url = get_required_env("SITE_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string()))?;
        let session_secret = get_validated_secret("SITE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SITE_SESSION_SECRET")?;
        let database_url = get_database_url("SITE_DATABASE_URL");

        let auth = AuthSettings::from_env()?;
        let gemini = GeminiConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            database_url,
            auth,
            gemini,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl AuthSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let delay_ms: u64 = parse_env("SITE_AUTH_DELAY_MS", "500")?;
        let admin_password_hash =
            get_optional_env("SITE_ADMIN_PASSWORD_HASH").map(SecretString::from);
        if let Some(hash) = &admin_password_hash {
            argon2::PasswordHash::new(hash.expose_secret()).map_err(|e| {
                ConfigError::InvalidEnvVar("SITE_ADMIN_PASSWORD_HASH".to_string(), e.to_string())
            })?;
        }

        Ok(Self {
            admin_email: get_optional_env("SITE_ADMIN_EMAIL"),
            admin_password_hash,
            delay: Duration::from_millis(delay_ms),
        })
    }
}

impl GeminiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = match get_optional_env("GEMINI_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "GEMINI_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };
        let timeout_secs: u64 = parse_env("GEMINI_TIMEOUT_SECS", "30")?;

        Ok(Self {
            api_key,
            model: get_env_or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            api_base: get_env_or_default("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
