//! Error types for the solar estimate provider.

use thiserror::Error;

/// Errors that can occur while producing an estimate.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// HTTP request failed (connection, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// Status string from the API (e.g. `INVALID_ARGUMENT`).
        status: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The model returned no text.
    #[error("empty response from model")]
    EmptyResponse,

    /// The model's text is not a valid estimate.
    #[error("parse error: {0}")]
    Parse(String),

    /// No API key is configured.
    #[error("estimate provider is not configured")]
    NotConfigured,
}

/// Error body returned by the model API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_error_display() {
        let err = EstimateError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30 seconds");

        let err = EstimateError::Api {
            status: "INVALID_ARGUMENT".to_string(),
            message: "Request contains an invalid argument.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (INVALID_ARGUMENT): Request contains an invalid argument."
        );
    }

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        }"#;

        let response: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(response.error.code, 400);
        assert_eq!(response.error.status, "INVALID_ARGUMENT");
        assert!(response.error.message.starts_with("API key not valid"));
    }
}
