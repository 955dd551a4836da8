//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in visitor, or an admin, in
//! route handlers. The visitor's identity is read from the session through
//! [`AuthService::current_user`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use solar_portal_core::User;
use tower_sessions::Session;

use crate::filters;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a signed-in visitor.
///
/// If the visitor is not signed in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Bonjour, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a signed-in admin.
///
/// Admin status is read from the user directory, not the session copy, so
/// a revoked grant takes effect on the next request.
pub struct RequireAdmin(pub User);

/// Extractor that optionally gets the signed-in visitor.
pub struct OptionalUser(pub Option<User>);

/// Page shown to a signed-in visitor without admin rights.
#[derive(Template, WebTemplate)]
#[template(path = "admin/denied.html")]
pub struct AccessDeniedTemplate {
    pub current_user: Option<User>,
}

/// Error returned when authentication is required but missing.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden(User),
    /// Session or directory could not be read.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden(user) => (
                StatusCode::FORBIDDEN,
                AccessDeniedTemplate {
                    current_user: Some(user),
                },
            )
                .into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl AuthRejection {
    fn signed_out(parts: &Parts) -> Self {
        if parts.uri.path().starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

/// Read the signed-in visitor from the request's session.
async fn session_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AuthRejection> {
    // Set by SessionManagerLayer
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    AuthService::new(session, state.store(), &state.config().auth)
        .current_user()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read session user");
            AuthRejection::Internal
        })
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AuthRejection::signed_out(parts))
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await.ok().flatten()))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if user.is_admin {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.id, "Admin access denied");
            Err(AuthRejection::Forbidden(user))
        }
    }
}
