//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was left empty.
    #[error("all fields are required")]
    MissingFields,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] solar_portal_core::EmailError),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password too short.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Password does not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl AuthError {
    /// Short code carried in `?error=` redirects and mapped to a message by
    /// the login and register pages.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidEmail(_) => "invalid_email",
            Self::PasswordMismatch => "password_mismatch",
            Self::WeakPassword { .. } => "weak_password",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Storage(_) | Self::PasswordHash => "server",
        }
    }
}
