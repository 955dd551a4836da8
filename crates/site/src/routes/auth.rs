//! Authentication route handlers.
//!
//! Handles login, registration and logout over the visitor's session.
//! Validation failures redirect back with an `?error=` code that the page
//! turns into an inline message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use solar_portal_core::User;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Which form an error code is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthPage {
    Login,
    Register,
}

impl AuthPage {
    const fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
        }
    }
}

/// Inline French message for an `?error=` code.
fn error_message(page: AuthPage, code: &str) -> Option<&'static str> {
    let message = match code {
        "missing_fields" if page == AuthPage::Login => "L'email et le mot de passe sont requis",
        "missing_fields" => "Tous les champs sont requis",
        "password_mismatch" => "Les mots de passe ne correspondent pas",
        "weak_password" => "Le mot de passe doit contenir au moins 6 caractères",
        "invalid_email" => "Format d'email invalide",
        "invalid_credentials" => "Identifiants invalides",
        "login_required" => "Veuillez vous connecter pour vous inscrire à une formation",
        "server" => "Une erreur est survenue. Veuillez réessayer.",
        _ => return None,
    };
    Some(message)
}

/// Redirect back to the form with the error's code.
fn reject(page: AuthPage, err: &AuthError) -> Redirect {
    if err.code() == "server" {
        tracing::error!(error = %err, "Authentication failed");
    } else {
        tracing::info!(code = err.code(), "Authentication rejected");
    }
    Redirect::to(&format!("{}?error={}", page.path(), err.code()))
}

/// Rotate the session id after sign-in and tag Sentry with the user.
async fn after_sign_in(session: &Session, user: &User) {
    if let Err(e) = session.cycle_id().await {
        tracing::warn!(error = %e, "Failed to rotate session id");
    }
    set_sentry_user(&user.id, Some(user.email.as_str()));
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<User>,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<User>,
    pub error: Option<&'static str>,
    pub min_password_length: usize,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalUser(current_user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> LoginTemplate {
    LoginTemplate {
        current_user,
        error: query
            .error
            .as_deref()
            .and_then(|code| error_message(AuthPage::Login, code)),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Redirect {
    let auth = AuthService::new(&session, state.store(), &state.config().auth);

    match auth.login(&form.email, &form.password).await {
        Ok(user) => {
            after_sign_in(&session, &user).await;
            add_breadcrumb("auth", "User signed in", None);
            Redirect::to("/")
        }
        Err(e) => reject(AuthPage::Login, &e),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalUser(current_user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        current_user,
        error: query
            .error
            .as_deref()
            .and_then(|code| error_message(AuthPage::Register, code)),
        min_password_length: MIN_PASSWORD_LENGTH,
    }
}

/// Handle registration form submission. Success signs the visitor in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    let auth = AuthService::new(&session, state.store(), &state.config().auth);
    let registration = Registration {
        name: &form.name,
        email: &form.email,
        password: &form.password,
        confirm_password: &form.confirm_password,
    };

    match auth.register(registration).await {
        Ok(user) => {
            after_sign_in(&session, &user).await;
            add_breadcrumb("auth", "User registered", None);
            Redirect::to("/")
        }
        Err(e) => reject(AuthPage::Register, &e),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Removes the signed-in keys, then destroys the whole session record.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let auth = AuthService::new(&session, state.store(), &state.config().auth);
    if let Err(e) = auth.logout().await {
        tracing::error!(error = %e, "Failed to clear session");
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }

    clear_sentry_user();
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_per_page() {
        assert_eq!(
            error_message(AuthPage::Login, "missing_fields"),
            Some("L'email et le mot de passe sont requis")
        );
        assert_eq!(
            error_message(AuthPage::Register, "missing_fields"),
            Some("Tous les champs sont requis")
        );
        assert_eq!(
            error_message(AuthPage::Register, "weak_password"),
            Some("Le mot de passe doit contenir au moins 6 caractères")
        );
        assert_eq!(error_message(AuthPage::Login, "<script>"), None);
    }

    #[test]
    fn test_reject_redirects_with_code() {
        let response = axum::response::IntoResponse::into_response(reject(
            AuthPage::Register,
            &AuthError::PasswordMismatch,
        ));
        assert_eq!(
            response.headers()["location"],
            "/auth/register?error=password_mismatch"
        );
    }
}
