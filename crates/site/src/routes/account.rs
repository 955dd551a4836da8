//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{DateTime, Utc};
use solar_portal_core::{Formation, User};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;
use crate::services::formations::{EnrollmentLedger, FormationRepository};
use crate::state::AppState;

/// An enrollment joined with its formation.
pub struct EnrollmentView {
    pub formation: Formation,
    pub enrolled_at: DateTime<Utc>,
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub current_user: Option<User>,
    pub user: User,
    pub enrollments: Vec<EnrollmentView>,
}

/// Display the profile and the visitor's enrollments.
///
/// Records pointing at a deleted formation are not shown.
///
/// # Errors
///
/// Returns `AppError::Storage` if records cannot be read.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<AccountTemplate> {
    let formations = FormationRepository::new(state.store()).list().await?;
    let enrollments = EnrollmentLedger::new(state.store())
        .list(user.id)
        .await?
        .into_iter()
        .filter_map(|record| {
            formations
                .iter()
                .find(|f| f.id == record.formation_id)
                .map(|formation| EnrollmentView {
                    formation: formation.clone(),
                    enrolled_at: record.enrolled_at,
                })
        })
        .collect();

    Ok(AccountTemplate {
        current_user: Some(user.clone()),
        user,
        enrollments,
    })
}
