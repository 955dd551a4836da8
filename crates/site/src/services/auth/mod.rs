//! Authentication service.
//!
//! Mock sign-in over the visitor's session: any well-formed email and
//! non-empty password signs the visitor in. Passwords of regular users are
//! never stored. The one credential that is checked is the configured admin
//! account, against an Argon2 hash.
//!
//! A signed-in session holds two keys: `user` (the [`User`] record) and
//! `authToken` (an opaque `token_...` string). A session missing either key
//! is signed out.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::ExposeSecret;
use solar_portal_core::{Email, User};
use tracing::instrument;

use crate::config::AuthSettings;
use crate::services::users::UserDirectory;
use crate::storage::{Datastore, Storage, keys, save};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

const AUTH_TOKEN_LENGTH: usize = 24;

/// Registration form contents.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Authentication service for one visitor.
pub struct AuthService<'a> {
    session: &'a dyn Storage,
    users: UserDirectory<'a>,
    settings: &'a AuthSettings,
}

impl<'a> AuthService<'a> {
    /// Create a service over the visitor's session storage.
    #[must_use]
    pub const fn new(
        session: &'a dyn Storage,
        store: &'a Datastore,
        settings: &'a AuthSettings,
    ) -> Self {
        Self {
            session,
            users: UserDirectory::new(store),
            settings,
        }
    }

    /// Sign in with email and password.
    ///
    /// The directory record is created on first sign-in. Admin rights are
    /// granted when the pair matches the configured admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is empty and
    /// `AuthError::InvalidEmail` if the email is malformed. No session is
    /// written on error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        tokio::time::sleep(self.settings.delay).await;

        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let email = Email::parse(email)?;

        let grant_admin = self.is_admin_credential(&email, password);
        let user = self.users.upsert_login(&email, grant_admin).await?;
        self.start_session(&user).await?;

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User signed in");
        Ok(user)
    }

    /// Register and sign in.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, `MissingFields`, `PasswordMismatch`,
    /// `WeakPassword` or `InvalidEmail`. No session is written on error.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        tokio::time::sleep(self.settings.delay).await;

        let name = form.name.trim();
        let email = form.email.trim();
        if name.is_empty()
            || email.is_empty()
            || form.password.is_empty()
            || form.confirm_password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(form.password)?;
        let email = Email::parse(email)?;

        let user = self.users.create(&email, name).await?;
        self.start_session(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Sign out. Signing out a signed-out session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session cannot be modified.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.clear_session().await
    }

    /// The signed-in user, if any.
    ///
    /// The user directory is authoritative: the returned record is the
    /// directory's, and a session whose user was deleted, or whose `user`
    /// record no longer decodes, is signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session or directory cannot be
    /// read.
    pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
        if self.session.get_value(keys::AUTH_TOKEN).await?.is_none() {
            return Ok(None);
        }
        let Some(raw) = self.session.get_value(keys::SESSION_USER).await? else {
            return Ok(None);
        };

        let user: User = match serde_json::from_value(raw) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt session user, signing out");
                self.clear_session().await?;
                return Ok(None);
            }
        };

        match self.users.get(user.id).await? {
            Some(record) if record.email.matches(user.email.as_str()) => {
                if record != user {
                    save(self.session, keys::SESSION_USER, &record).await?;
                }
                Ok(Some(record))
            }
            _ => {
                tracing::info!(user_id = %user.id, "Session user no longer in directory, signing out");
                self.clear_session().await?;
                Ok(None)
            }
        }
    }

    async fn start_session(&self, user: &User) -> Result<(), AuthError> {
        save(self.session, keys::SESSION_USER, user).await?;
        save(self.session, keys::AUTH_TOKEN, &generate_auth_token()).await?;
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), AuthError> {
        self.session.remove_value(keys::SESSION_USER).await?;
        self.session.remove_value(keys::AUTH_TOKEN).await?;
        Ok(())
    }

    fn is_admin_credential(&self, email: &Email, password: &str) -> bool {
        let (Some(admin_email), Some(hash)) = (
            self.settings.admin_email.as_deref(),
            self.settings.admin_password_hash.as_ref(),
        ) else {
            return false;
        };

        email.matches(admin_email) && verify_password(password, hash.expose_secret()).is_ok()
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

fn generate_auth_token() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AUTH_TOKEN_LENGTH)
        .map(char::from)
        .collect();
    format!("token_{suffix}")
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
