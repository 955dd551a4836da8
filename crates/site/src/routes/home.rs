//! Home page and solar estimate handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, Json, extract::State};
use serde::Deserialize;
use solar_portal_core::{
    EstimateRequest, EstimateRequestError, RoofType, SolarEstimate, SunExposure, User,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::services::estimate::ESTIMATE_FAILURE_MESSAGE;
use crate::state::AppState;

// =============================================================================
// Static Content
// =============================================================================

/// A service area shown on the home page.
pub struct Solution {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const SOLUTIONS: [Solution; 3] = [
    Solution {
        icon: "solar-panel",
        title: "Photovoltaïque",
        description: "Solutions sur-mesure pour toitures industrielles et résidentielles avec optimisation du rendement en temps réel.",
    },
    Solution {
        icon: "building-shield",
        title: "Électricité Bâtiment",
        description: "Conception et rénovation de colonnes montantes, tableaux divisionnaires et mise aux normes NF C 15-100.",
    },
    Solution {
        icon: "microchip",
        title: "Audit & Innovation",
        description: "Analyses thermographiques et bilans de puissance pour identifier les gisements d'économies d'énergie.",
    },
];

// =============================================================================
// Form Types
// =============================================================================

/// Calculator form data.
///
/// Fields stay strings so a bad value re-renders the form instead of
/// rejecting the request.
#[derive(Debug, Deserialize)]
pub struct EstimateForm {
    pub monthly_bill: String,
    pub roof_type: String,
    pub location: String,
    pub sun_exposure: String,
}

/// An `<option>` of a calculator select.
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Values the calculator form is rendered with.
pub struct CalculatorView {
    pub monthly_bill: String,
    pub location: String,
    pub roof_types: Vec<SelectOption>,
    pub exposures: Vec<SelectOption>,
}

impl CalculatorView {
    fn new(monthly_bill: String, location: String, roof: RoofType, sun: SunExposure) -> Self {
        Self {
            monthly_bill,
            location,
            roof_types: RoofType::ALL
                .iter()
                .map(|r| SelectOption {
                    value: r.slug(),
                    label: r.label(),
                    selected: *r == roof,
                })
                .collect(),
            exposures: SunExposure::ALL
                .iter()
                .map(|e| SelectOption {
                    value: e.slug(),
                    label: e.label(),
                    selected: *e == sun,
                })
                .collect(),
        }
    }

    fn from_request(request: &EstimateRequest) -> Self {
        Self::new(
            request.monthly_bill.to_string(),
            request.location.clone(),
            request.roof_type,
            request.sun_exposure,
        )
    }
}

impl EstimateForm {
    /// Parse into a request, falling back to defaults for unknown selects.
    fn parse(&self) -> std::result::Result<EstimateRequest, EstimateRequestError> {
        let defaults = EstimateRequest::default();
        let monthly_bill = self.monthly_bill.trim().parse().unwrap_or(0);
        let roof_type = RoofType::from_slug(&self.roof_type).unwrap_or(defaults.roof_type);
        let sun_exposure =
            SunExposure::from_slug(&self.sun_exposure).unwrap_or(defaults.sun_exposure);

        EstimateRequest::new(monthly_bill, roof_type, &self.location, sun_exposure)
    }

    fn view(&self) -> CalculatorView {
        CalculatorView::new(
            self.monthly_bill.clone(),
            self.location.clone(),
            RoofType::from_slug(&self.roof_type).unwrap_or(RoofType::Tiles),
            SunExposure::from_slug(&self.sun_exposure).unwrap_or(SunExposure::High),
        )
    }
}

fn request_error_message(err: EstimateRequestError) -> &'static str {
    match err {
        EstimateRequestError::ZeroBill => "Veuillez saisir une facture mensuelle valide.",
        EstimateRequestError::EmptyLocation => "Veuillez indiquer votre localisation.",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<User>,
    pub solutions: &'static [Solution],
    pub calculator: CalculatorView,
    pub estimate: Option<SolarEstimate>,
    pub error: Option<&'static str>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page with an empty calculator.
#[instrument(skip_all)]
pub async fn home(OptionalUser(current_user): OptionalUser) -> HomeTemplate {
    HomeTemplate {
        current_user,
        solutions: &SOLUTIONS,
        calculator: CalculatorView::from_request(&EstimateRequest::default()),
        estimate: None,
        error: None,
    }
}

/// Handle the calculator form and re-render the home page.
///
/// A failed estimate shows the generic failure message and no result.
#[instrument(skip_all)]
pub async fn estimate(
    State(state): State<AppState>,
    OptionalUser(current_user): OptionalUser,
    Form(form): Form<EstimateForm>,
) -> HomeTemplate {
    let (estimate, error) = match form.parse() {
        Ok(request) => match state.estimator().estimate(&request).await {
            Ok(estimate) => (Some(estimate), None),
            Err(e) => {
                tracing::warn!(error = %e, "Estimate failed");
                (None, Some(ESTIMATE_FAILURE_MESSAGE))
            }
        },
        Err(e) => (None, Some(request_error_message(e))),
    };

    HomeTemplate {
        current_user,
        solutions: &SOLUTIONS,
        calculator: form.view(),
        estimate,
        error,
    }
}

/// JSON estimate API.
///
/// # Errors
///
/// Returns 400 for invalid inputs and 502/503 with the generic failure
/// message when the provider fails.
#[instrument(skip_all)]
pub async fn api_estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<SolarEstimate>> {
    let request = EstimateRequest::new(
        request.monthly_bill,
        request.roof_type,
        &request.location,
        request.sun_exposure,
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let estimate = state.estimator().estimate(&request).await?;
    Ok(Json(estimate))
}
