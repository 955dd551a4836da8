//! Gemini API client for the solar estimate.
//!
//! One `generateContent` call per estimate, constrained to the JSON schema
//! in [`super::prompt::response_schema`]. No retries.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use solar_portal_core::{EstimateRequest, SolarEstimate};
use tracing::instrument;

use crate::config::GeminiConfig;

use super::EstimateProvider;
use super::error::{ApiErrorResponse, EstimateError};
use super::prompt::{build_prompt, response_schema};
use super::types::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::NotConfigured` if the API key is not a valid
    /// header value, or `EstimateError::Http` if the HTTP client cannot be
    /// built.
    pub fn new(config: &GeminiConfig, api_key: &SecretString) -> Result<Self, EstimateError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| EstimateError::NotConfigured)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint: endpoint_url(&config.api_base, &config.model),
                model: config.model.clone(),
            }),
        })
    }

    /// Handle a response, successful or not.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<SolarEstimate, EstimateError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            let reply: GenerateContentResponse = serde_json::from_str(&body)
                .map_err(|e| EstimateError::Parse(format!("Failed to parse response: {e}")))?;
            let text = reply.first_text().ok_or(EstimateError::EmptyResponse)?;
            parse_estimate(text)
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> EstimateError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return EstimateError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return EstimateError::Unauthorized(format!(
                "API key rejected by {}",
                self.inner.model
            ));
        }

        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => EstimateError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                },
                Err(_) => EstimateError::Api {
                    status: status.to_string(),
                    message: body,
                },
            },
            Err(e) => EstimateError::Http(e),
        }
    }
}

#[async_trait]
impl EstimateProvider for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.inner.model))]
    async fn estimate(&self, request: &EstimateRequest) -> Result<SolarEstimate, EstimateError> {
        let body = GenerateContentRequest::json_reply(build_prompt(request), response_schema());

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

/// `{base}/v1beta/models/{model}:generateContent`
fn endpoint_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{model}:generateContent",
        api_base.trim_end_matches('/')
    )
}

/// Decode the model's JSON text into an estimate.
///
/// Tolerates a Markdown code fence around the JSON.
///
/// # Errors
///
/// Returns `EstimateError::EmptyResponse` for blank text and
/// `EstimateError::Parse` when the text is not a complete estimate.
pub fn parse_estimate(text: &str) -> Result<SolarEstimate, EstimateError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim);

    if unfenced.is_empty() {
        return Err(EstimateError::EmptyResponse);
    }

    serde_json::from_str(unfenced)
        .map_err(|e| EstimateError::Parse(format!("Invalid estimate JSON: {e}")))
}
