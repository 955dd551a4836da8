//! Solar estimate request and result shapes.
//!
//! JSON field names follow the public estimate API (`monthlyBill`,
//! `roofType`, `state`, `sunlightHours`) and the model's structured reply
//! (`potentialSavings`, `recommendedPanels`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Roof covering of the installation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoofType {
    #[serde(rename = "Tuiles", alias = "tiles")]
    Tiles,
    #[serde(rename = "Métal", alias = "metal")]
    Metal,
    #[serde(rename = "Ardoise", alias = "slate")]
    Slate,
    #[serde(rename = "Toit plat", alias = "flat")]
    Flat,
}

impl RoofType {
    pub const ALL: [Self; 4] = [Self::Tiles, Self::Metal, Self::Slate, Self::Flat];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Tiles => "Tuiles",
            Self::Metal => "Métal",
            Self::Slate => "Ardoise",
            Self::Flat => "Toit plat",
        }
    }

    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Tiles => "tiles",
            Self::Metal => "metal",
            Self::Slate => "slate",
            Self::Flat => "flat",
        }
    }

    /// Look up a variant by its slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|roof| roof.slug() == slug)
    }
}

impl std::fmt::Display for RoofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How much direct sun the roof receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SunExposure {
    #[serde(rename = "Exposition Élevée", alias = "high")]
    High,
    #[serde(rename = "Exposition Moyenne", alias = "medium")]
    Medium,
    #[serde(rename = "Faible Exposition", alias = "low")]
    Low,
}

impl SunExposure {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::High => "Exposition Élevée",
            Self::Medium => "Exposition Moyenne",
            Self::Low => "Faible Exposition",
        }
    }

    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|exposure| exposure.slug() == slug)
    }
}

impl std::fmt::Display for SunExposure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Invalid estimate inputs.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateRequestError {
    #[error("monthly bill must be greater than zero")]
    ZeroBill,
    #[error("location cannot be empty")]
    EmptyLocation,
}

/// Inputs of the solar audit calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRequest {
    /// Monthly electricity bill, whole currency units.
    #[serde(rename = "monthlyBill")]
    pub monthly_bill: u32,
    #[serde(rename = "roofType")]
    pub roof_type: RoofType,
    #[serde(rename = "state")]
    pub location: String,
    #[serde(rename = "sunlightHours")]
    pub sun_exposure: SunExposure,
}

impl EstimateRequest {
    /// Build a validated request. The location is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero bill or a blank location.
    pub fn new(
        monthly_bill: u32,
        roof_type: RoofType,
        location: &str,
        sun_exposure: SunExposure,
    ) -> Result<Self, EstimateRequestError> {
        let request = Self {
            monthly_bill,
            roof_type,
            location: location.trim().to_owned(),
            sun_exposure,
        };
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns an error for a zero bill or a blank location.
    pub fn validate(&self) -> Result<(), EstimateRequestError> {
        if self.monthly_bill == 0 {
            return Err(EstimateRequestError::ZeroBill);
        }
        if self.location.trim().is_empty() {
            return Err(EstimateRequestError::EmptyLocation);
        }
        Ok(())
    }
}

impl Default for EstimateRequest {
    /// The values the calculator form starts with.
    fn default() -> Self {
        Self {
            monthly_bill: 150,
            roof_type: RoofType::Tiles,
            location: "France".to_owned(),
            sun_exposure: SunExposure::High,
        }
    }
}

/// The model's structured estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarEstimate {
    /// Estimated monthly savings, free text (e.g. "95 $ / mois").
    pub potential_savings: String,
    #[serde(deserialize_with = "deserialize_panel_count")]
    pub recommended_panels: u32,
    /// CO2 reduction equivalent, free text.
    pub environmental_impact: String,
    /// Estimated payback period, free text.
    pub payback_period: String,
    pub advice: String,
}

/// Accepts any non-negative JSON number and rounds it to whole panels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_panel_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "invalid panel count: {value}"
        )));
    }
    Ok(value.round() as u32)
}
