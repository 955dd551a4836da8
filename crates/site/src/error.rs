//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`
//! where a failure has no better answer than an error page; validation
//! failures redirect with an `?error=` code instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use solar_portal_core::EnrollmentError;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::estimate::{ESTIMATE_FAILURE_MESSAGE, EstimateError};
use crate::services::formations::FormationError;
use crate::storage::StorageError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Formation operation failed.
    #[error("Formation error: {0}")]
    Formation(#[from] FormationError),

    /// Estimate provider failed.
    #[error("Estimate error: {0}")]
    Estimate(#[from] EstimateError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Signed-in user lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(err, AuthError::Storage(_) | AuthError::PasswordHash),
            Self::Formation(err) => matches!(err, FormationError::Storage(_)),
            Self::Estimate(err) => !matches!(err, EstimateError::NotConfigured),
            Self::NotFound(_) | Self::Forbidden(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::Storage(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Formation(err) => match err {
                FormationError::NotFound(_) => StatusCode::NOT_FOUND,
                FormationError::Enrollment(_) => StatusCode::CONFLICT,
                FormationError::Invalid(_) => StatusCode::BAD_REQUEST,
                FormationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Estimate(err) => match err {
                EstimateError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Storage(_)
            | Self::Internal(_)
            | Self::Auth(AuthError::Storage(_) | AuthError::PasswordHash)
            | Self::Formation(FormationError::Storage(_)) => {
                "Erreur interne du serveur".to_string()
            }
            Self::Estimate(_) => ESTIMATE_FAILURE_MESSAGE.to_string(),
            Self::Formation(FormationError::NotFound(_)) => "Formation introuvable".to_string(),
            Self::Formation(FormationError::Enrollment(EnrollmentError::Full)) => {
                "Cette formation est complète".to_string()
            }
            Self::Formation(FormationError::Enrollment(EnrollmentError::Empty)) => {
                "Aucune place à libérer".to_string()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
