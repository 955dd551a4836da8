//! Formation catalogue and enrollment handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use solar_portal_core::{CATEGORIES, EnrollmentError, Formation, FormationId, FormationLevel, User};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::services::formations::{
    EnrollmentChange, EnrollmentLedger, FormationError, FormationRepository,
};
use crate::state::AppState;

/// Filter value matching every formation.
const ALL: &str = "Tous";

// =============================================================================
// Query Types
// =============================================================================

/// Filters and flash codes of the catalogue page.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogueQuery {
    pub level: Option<String>,
    pub category: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl CatalogueQuery {
    /// Selected level; unknown values and "Tous" select everything.
    fn level(&self) -> Option<FormationLevel> {
        self.level.as_deref().and_then(|level| level.parse().ok())
    }

    /// Selected category; only the fixed categories filter.
    fn category(&self) -> Option<&'static str> {
        let wanted = self.category.as_deref()?;
        CATEGORIES.into_iter().find(|c| *c == wanted)
    }
}

// =============================================================================
// View Types
// =============================================================================

/// A filter chip.
pub struct FilterChip {
    pub label: &'static str,
    /// Query value, empty for "Tous".
    pub value: &'static str,
    pub active: bool,
}

/// A formation card with the visitor's enrollment state.
pub struct FormationCard {
    pub formation: Formation,
    pub is_enrolled: bool,
}

impl FormationCard {
    /// Label of the card's action button.
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        if self.is_enrolled {
            "Se retirer"
        } else if self.formation.is_full() {
            "Complet"
        } else {
            "S'inscrire"
        }
    }

    /// Whether the action button can be pressed.
    #[must_use]
    pub const fn can_act(&self) -> bool {
        self.is_enrolled || !self.formation.is_full()
    }
}

fn level_chips(selected: Option<FormationLevel>) -> Vec<FilterChip> {
    std::iter::once(FilterChip {
        label: ALL,
        value: "",
        active: selected.is_none(),
    })
    .chain(FormationLevel::ALL.iter().map(|level| FilterChip {
        label: level.label(),
        value: level.slug(),
        active: selected == Some(*level),
    }))
    .collect()
}

fn category_chips(selected: Option<&str>) -> Vec<FilterChip> {
    std::iter::once(FilterChip {
        label: ALL,
        value: "",
        active: selected.is_none(),
    })
    .chain(CATEGORIES.iter().map(|category| FilterChip {
        label: *category,
        value: *category,
        active: selected == Some(*category),
    }))
    .collect()
}

fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "login_required" => Some("Veuillez vous connecter pour vous inscrire à une formation"),
        "full" => Some("Cette formation est complète"),
        "not_found" => Some("Formation introuvable"),
        _ => None,
    }
}

fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "enrolled" => Some("Inscription confirmée"),
        "unenrolled" => Some("Vous êtes retiré de la formation"),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Formation catalogue template.
#[derive(Template, WebTemplate)]
#[template(path = "formations/index.html")]
pub struct FormationsTemplate {
    pub current_user: Option<User>,
    pub cards: Vec<FormationCard>,
    pub levels: Vec<FilterChip>,
    pub categories: Vec<FilterChip>,
    /// Current filter values, carried across chip links.
    pub level_value: &'static str,
    pub category_value: &'static str,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the formation catalogue.
///
/// # Errors
///
/// Returns `AppError::Storage` if the catalogue cannot be read.
#[instrument(skip(state, current_user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(current_user): OptionalUser,
    Query(query): Query<CatalogueQuery>,
) -> Result<FormationsTemplate> {
    let level = query.level();
    let category = query.category();

    let formations = FormationRepository::new(state.store())
        .list_filtered(level, category)
        .await?;
    let enrolled = match &current_user {
        Some(user) => {
            EnrollmentLedger::new(state.store())
                .formation_ids(user.id)
                .await?
        }
        None => std::collections::HashSet::new(),
    };

    let cards = formations
        .into_iter()
        .map(|formation| FormationCard {
            is_enrolled: enrolled.contains(&formation.id),
            formation,
        })
        .collect();

    Ok(FormationsTemplate {
        current_user,
        cards,
        levels: level_chips(level),
        categories: category_chips(category),
        level_value: level.map_or("", |l| l.slug()),
        category_value: category.unwrap_or(""),
        error: query.error.as_deref().and_then(error_message),
        success: query.success.as_deref().and_then(success_message),
    })
}

/// Enroll in a formation, or withdraw if already enrolled.
///
/// # Errors
///
/// Returns `AppError` only for storage failures; a full or unknown
/// formation redirects back with an error code.
#[instrument(skip(state, current_user))]
pub async fn toggle_enrollment(
    State(state): State<AppState>,
    OptionalUser(current_user): OptionalUser,
    Path(id): Path<FormationId>,
) -> Result<Redirect> {
    let Some(user) = current_user else {
        return Ok(Redirect::to("/auth/login?error=login_required"));
    };

    let change = EnrollmentLedger::new(state.store())
        .toggle(user.id, id)
        .await;

    match change {
        Ok(EnrollmentChange::Enrolled(formation)) => {
            let formation_id = formation.id.to_string();
            add_breadcrumb(
                "formation",
                "Enrolled",
                Some(&[("formation_id", formation_id.as_str())]),
            );
            Ok(Redirect::to("/formations?success=enrolled"))
        }
        Ok(EnrollmentChange::Unenrolled(formation)) => {
            let formation_id = formation.id.to_string();
            add_breadcrumb(
                "formation",
                "Unenrolled",
                Some(&[("formation_id", formation_id.as_str())]),
            );
            Ok(Redirect::to("/formations?success=unenrolled"))
        }
        Err(FormationError::Enrollment(EnrollmentError::Full)) => {
            Ok(Redirect::to("/formations?error=full"))
        }
        Err(FormationError::NotFound(_)) => Ok(Redirect::to("/formations?error=not_found")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(level: Option<&str>, category: Option<&str>) -> CatalogueQuery {
        CatalogueQuery {
            level: level.map(String::from),
            category: category.map(String::from),
            ..CatalogueQuery::default()
        }
    }

    #[test]
    fn test_query_filters() {
        let q = query(Some("intermediaire"), Some("Maintenance"));
        assert_eq!(q.level(), Some(FormationLevel::Intermediate));
        assert_eq!(q.category(), Some("Maintenance"));

        let q = query(Some("Tous"), Some("Tous"));
        assert_eq!(q.level(), None);
        assert_eq!(q.category(), None);
    }

    #[test]
    fn test_chips_mark_selection() {
        let chips = level_chips(Some(FormationLevel::Advanced));
        assert_eq!(chips.len(), 4);
        assert!(!chips[0].active);
        assert!(chips[3].active);

        let chips = category_chips(None);
        assert!(chips[0].active);
        assert_eq!(chips[0].label, ALL);
    }

    #[test]
    fn test_flash_codes() {
        assert_eq!(error_message("full"), Some("Cette formation est complète"));
        assert_eq!(error_message("unknown"), None);
        assert_eq!(success_message("enrolled"), Some("Inscription confirmée"));
    }
}
