//! Admin panel route handlers.
//!
//! Every handler takes [`RequireAdmin`], which re-reads the admin flag from
//! the user directory on each request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use solar_portal_core::{
    CATEGORIES, Formation, FormationDraft, FormationId, FormationLevel, FormationPatch,
    FormationValidationError, Price, User, UserId,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::home::SelectOption;
use crate::services::formations::{EnrollmentLedger, FormationError, FormationRepository};
use crate::services::users::UserDirectory;
use crate::state::AppState;

// =============================================================================
// Stats
// =============================================================================

/// Overview figures shown above the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminStats {
    pub users: usize,
    pub admins: usize,
    pub formations: usize,
    pub seats_taken: u32,
    pub seats_capacity: u32,
    /// Σ price × enrolled.
    pub revenue: Price,
}

impl AdminStats {
    #[must_use]
    pub fn compute(users: &[User], formations: &[Formation]) -> Self {
        Self {
            users: users.len(),
            admins: users.iter().filter(|u| u.is_admin).count(),
            formations: formations.len(),
            seats_taken: formations.iter().map(|f| f.enrolled).sum(),
            seats_capacity: formations.iter().map(|f| f.capacity).sum(),
            revenue: Price::usd(
                formations
                    .iter()
                    .map(|f| f.price.times(f.enrolled).amount)
                    .sum::<Decimal>(),
            ),
        }
    }

    /// Seats taken as a whole percentage of capacity.
    #[must_use]
    pub fn occupancy_percent(&self) -> u32 {
        if self.seats_capacity == 0 {
            return 0;
        }
        (u64::from(self.seats_taken) * 100 / u64::from(self.seats_capacity))
            .try_into()
            .unwrap_or(100)
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Formation create/edit form data.
///
/// Every field arrives as text and is parsed in [`FormationForm::to_draft`],
/// so a bad value redirects back with a code instead of a 422.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormationForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub location: String,
    pub instructor: String,
    pub capacity: String,
    pub enrolled: String,
    pub level: String,
    pub category: String,
    pub price: String,
    pub image: String,
}

impl FormationForm {
    /// Pre-filled values for editing.
    fn from_formation(formation: &Formation) -> Self {
        Self {
            title: formation.title.clone(),
            description: formation.description.clone(),
            date: formation.date.format("%Y-%m-%d").to_string(),
            time: formation.time.format("%H:%M").to_string(),
            duration: formation.duration.clone(),
            location: formation.location.clone(),
            instructor: formation.instructor.clone(),
            capacity: formation.capacity.to_string(),
            enrolled: formation.enrolled.to_string(),
            level: formation.level.slug().to_string(),
            category: formation.category.clone(),
            price: formation.price.amount.to_string(),
            image: formation.image.clone().unwrap_or_default(),
        }
    }

    /// Values for a new formation.
    fn blank() -> Self {
        Self {
            capacity: "20".to_string(),
            enrolled: "0".to_string(),
            level: FormationLevel::Beginner.slug().to_string(),
            category: CATEGORIES.first().copied().unwrap_or_default().to_string(),
            price: "0".to_string(),
            ..Self::default()
        }
    }

    /// Parse into a validated draft; the error is a `?error=` code.
    fn to_draft(&self) -> std::result::Result<FormationDraft, &'static str> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "invalid_date")?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(self.time.trim(), "%H:%M:%S"))
            .map_err(|_| "invalid_time")?;
        let capacity = self.capacity.trim().parse().map_err(|_| "invalid_number")?;
        let enrolled = match self.enrolled.trim() {
            "" => 0,
            value => value.parse().map_err(|_| "invalid_number")?,
        };
        let price: Decimal = self.price.trim().parse().map_err(|_| "invalid_price")?;
        if price.is_sign_negative() {
            return Err("invalid_price");
        }
        let level: FormationLevel = self.level.parse().map_err(|_| "invalid_level")?;
        let category = CATEGORIES
            .into_iter()
            .find(|c| *c == self.category)
            .ok_or("invalid_category")?;
        let image = Some(self.image.trim())
            .filter(|url| !url.is_empty())
            .map(String::from);

        let draft = FormationDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date,
            time,
            duration: self.duration.trim().to_string(),
            location: self.location.trim().to_string(),
            instructor: self.instructor.trim().to_string(),
            capacity,
            enrolled,
            level,
            category: category.to_string(),
            price: Price::usd(price),
            image,
        };
        draft.validate().map_err(|e| validation_code(&e))?;
        Ok(draft)
    }

    fn level_options(&self) -> Vec<SelectOption> {
        FormationLevel::ALL
            .iter()
            .map(|level| SelectOption {
                value: level.slug(),
                label: level.label(),
                selected: level.slug() == self.level,
            })
            .collect()
    }

    fn category_options(&self) -> Vec<SelectOption> {
        CATEGORIES
            .iter()
            .map(|category| SelectOption {
                value: *category,
                label: *category,
                selected: *category == self.category,
            })
            .collect()
    }
}

const fn validation_code(err: &FormationValidationError) -> &'static str {
    match err {
        FormationValidationError::EmptyTitle => "empty_title",
        FormationValidationError::ZeroCapacity => "zero_capacity",
        FormationValidationError::OverCapacity { .. } => "over_capacity",
    }
}

/// A full replacement expressed as a patch.
fn patch_from_draft(draft: FormationDraft) -> FormationPatch {
    FormationPatch {
        title: Some(draft.title),
        description: Some(draft.description),
        date: Some(draft.date),
        time: Some(draft.time),
        duration: Some(draft.duration),
        location: Some(draft.location),
        instructor: Some(draft.instructor),
        capacity: Some(draft.capacity),
        enrolled: Some(draft.enrolled),
        level: Some(draft.level),
        category: Some(draft.category),
        price: Some(draft.price),
        image: Some(draft.image),
    }
}

/// Query parameters for flash display.
#[derive(Debug, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "invalid_date" => "Date invalide",
        "invalid_time" => "Heure invalide",
        "invalid_number" => "La capacité et le nombre d'inscrits doivent être des nombres entiers",
        "invalid_price" => "Prix invalide",
        "invalid_level" => "Niveau invalide",
        "invalid_category" => "Catégorie invalide",
        "empty_title" => "Le titre est requis",
        "zero_capacity" => "La capacité doit être d'au moins 1",
        "over_capacity" => "Le nombre d'inscrits dépasse la capacité",
        "self_action" => "Vous ne pouvez pas modifier votre propre compte",
        "user_not_found" => "Utilisateur introuvable",
        "formation_not_found" => "Formation introuvable",
        _ => return None,
    };
    Some(message)
}

fn success_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "formation_created" => "Formation créée",
        "formation_updated" => "Formation mise à jour",
        "formation_deleted" => "Formation supprimée",
        "admin_toggled" => "Rôle mis à jour",
        "user_deleted" => "Utilisateur supprimé",
        _ => return None,
    };
    Some(message)
}

// =============================================================================
// Templates
// =============================================================================

/// Admin overview template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub current_user: Option<User>,
    pub admin: User,
    pub stats: AdminStats,
    pub users: Vec<User>,
    pub formations: Vec<Formation>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Formation create/edit template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/formation_form.html")]
pub struct FormationFormTemplate {
    pub current_user: Option<User>,
    pub heading: &'static str,
    pub action: String,
    pub form: FormationForm,
    pub levels: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
    pub error: Option<&'static str>,
}

impl FormationFormTemplate {
    fn new(
        admin: User,
        heading: &'static str,
        action: String,
        form: FormationForm,
        error: Option<&str>,
    ) -> Self {
        Self {
            current_user: Some(admin),
            heading,
            action,
            levels: form.level_options(),
            categories: form.category_options(),
            form,
            error: error.and_then(error_message),
        }
    }
}

// =============================================================================
// Overview
// =============================================================================

/// Display the admin overview.
///
/// # Errors
///
/// Returns `AppError::Storage` if records cannot be read.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<FlashQuery>,
) -> Result<AdminTemplate> {
    let users = UserDirectory::new(state.store()).list().await?;
    let formations = FormationRepository::new(state.store()).list().await?;

    Ok(AdminTemplate {
        current_user: Some(admin.clone()),
        admin,
        stats: AdminStats::compute(&users, &formations),
        users,
        formations,
        error: query.error.as_deref().and_then(error_message),
        success: query.success.as_deref().and_then(success_message),
    })
}

// =============================================================================
// Users
// =============================================================================

/// Grant or revoke admin rights.
///
/// # Errors
///
/// Returns `AppError::Storage` if the directory cannot be updated.
#[instrument(skip(state, admin))]
pub async fn toggle_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    if id == admin.id {
        return Ok(Redirect::to("/admin?error=self_action"));
    }

    match UserDirectory::new(state.store()).toggle_admin(id).await? {
        Some(is_admin) => {
            tracing::info!(admin_id = %admin.id, user_id = %id, is_admin, "Admin flag toggled");
            Ok(Redirect::to("/admin?success=admin_toggled"))
        }
        None => Ok(Redirect::to("/admin?error=user_not_found")),
    }
}

/// Delete a user, releasing their formation seats first.
///
/// # Errors
///
/// Returns `AppError::Storage` if records cannot be updated.
#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    if id == admin.id {
        return Ok(Redirect::to("/admin?error=self_action"));
    }

    let directory = UserDirectory::new(state.store());
    if directory.get(id).await?.is_none() {
        return Ok(Redirect::to("/admin?error=user_not_found"));
    }

    let released = EnrollmentLedger::new(state.store()).withdraw_all(id).await?;
    directory.delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, released, "User deleted by admin");

    Ok(Redirect::to("/admin?success=user_deleted"))
}

// =============================================================================
// Formations
// =============================================================================

/// Display the new formation form.
pub async fn new_formation(
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<FlashQuery>,
) -> FormationFormTemplate {
    FormationFormTemplate::new(
        admin,
        "Nouvelle formation",
        "/admin/formations".to_string(),
        FormationForm::blank(),
        query.error.as_deref(),
    )
}

/// Create a formation.
///
/// # Errors
///
/// Returns `AppError` if the catalogue cannot be updated.
#[instrument(skip_all)]
pub async fn create_formation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<FormationForm>,
) -> Result<Redirect> {
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(code) => return Ok(Redirect::to(&format!("/admin/formations/new?error={code}"))),
    };

    FormationRepository::new(state.store()).add(draft).await?;
    Ok(Redirect::to("/admin?success=formation_created"))
}

/// Display the edit form of a formation.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown formation.
#[instrument(skip(state, admin, query))]
pub async fn edit_formation(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<FormationId>,
    Query(query): Query<FlashQuery>,
) -> Result<FormationFormTemplate> {
    let formation = FormationRepository::new(state.store())
        .get(id)
        .await?
        .ok_or(AppError::Formation(FormationError::NotFound(id)))?;

    Ok(FormationFormTemplate::new(
        admin,
        "Modifier la formation",
        format!("/admin/formations/{id}"),
        FormationForm::from_formation(&formation),
        query.error.as_deref(),
    ))
}

/// Update a formation.
///
/// # Errors
///
/// Returns `AppError` if the catalogue cannot be updated.
#[instrument(skip(state, _admin, form))]
pub async fn update_formation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<FormationId>,
    Form(form): Form<FormationForm>,
) -> Result<Redirect> {
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(code) => {
            return Ok(Redirect::to(&format!(
                "/admin/formations/{id}/edit?error={code}"
            )));
        }
    };

    match FormationRepository::new(state.store())
        .update(id, patch_from_draft(draft))
        .await
    {
        Ok(Some(_)) => Ok(Redirect::to("/admin?success=formation_updated")),
        Ok(None) => Ok(Redirect::to("/admin?error=formation_not_found")),
        Err(FormationError::Invalid(e)) => Ok(Redirect::to(&format!(
            "/admin/formations/{id}/edit?error={}",
            validation_code(&e)
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Delete a formation.
///
/// # Errors
///
/// Returns `AppError::Storage` if the catalogue cannot be updated.
#[instrument(skip(state, _admin))]
pub async fn delete_formation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<FormationId>,
) -> Result<Redirect> {
    if FormationRepository::new(state.store()).delete(id).await? {
        Ok(Redirect::to("/admin?success=formation_deleted"))
    } else {
        Ok(Redirect::to("/admin?error=formation_not_found"))
    }
}
