//! Solar estimate provider.
//!
//! The calculator's inputs go to a generative model that replies with a
//! [`SolarEstimate`]. Handlers depend on the [`EstimateProvider`] trait so
//! tests can substitute a stub.

mod client;
mod error;
mod prompt;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use solar_portal_core::{EstimateRequest, SolarEstimate};

use crate::config::GeminiConfig;

pub use client::{GeminiClient, parse_estimate};
pub use error::EstimateError;
pub use prompt::{build_prompt, response_schema};

/// The only failure text visitors ever see.
pub const ESTIMATE_FAILURE_MESSAGE: &str =
    "Échec de la génération de l'estimation. Veuillez réessayer.";

/// Produces a solar estimate from calculator inputs.
#[async_trait]
pub trait EstimateProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `EstimateError` on any failure; no partial estimate is
    /// produced.
    async fn estimate(&self, request: &EstimateRequest) -> Result<SolarEstimate, EstimateError>;
}

/// Stand-in used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredEstimator;

#[async_trait]
impl EstimateProvider for UnconfiguredEstimator {
    async fn estimate(&self, _request: &EstimateRequest) -> Result<SolarEstimate, EstimateError> {
        Err(EstimateError::NotConfigured)
    }
}

/// Build the provider described by the configuration.
///
/// # Errors
///
/// Returns `EstimateError` if the configured client cannot be built.
pub fn provider_from_config(
    config: &GeminiConfig,
) -> Result<Arc<dyn EstimateProvider>, EstimateError> {
    match &config.api_key {
        Some(api_key) => Ok(Arc::new(GeminiClient::new(config, api_key)?)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, solar estimates are disabled");
            Ok(Arc::new(UnconfiguredEstimator))
        }
    }
}
