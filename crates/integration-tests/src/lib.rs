//! Integration test harness for the solar portal.
//!
//! Each test spawns the site in-process on an ephemeral port, backed by the
//! in-memory datastore and a stub estimate provider, and drives it over
//! HTTP with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p solar-portal-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pages` - Public pages, health checks and response headers
//! - `estimate` - Calculator form, JSON API and the Gemini client
//! - `auth` - Registration, sign-in and sign-out
//! - `formations` - Catalogue filters and enrollment
//! - `admin` - Admin panel access and actions

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, redirect::Policy};
use secrecy::SecretString;
use solar_portal_core::{EstimateRequest, SolarEstimate};
use solar_portal_site::config::{AuthSettings, GeminiConfig, SiteConfig};
use solar_portal_site::services::auth::hash_password;
use solar_portal_site::services::estimate::{EstimateError, EstimateProvider};
use solar_portal_site::state::AppState;
use solar_portal_site::storage::Datastore;

/// Admin account configured for every test app.
pub const ADMIN_EMAIL: &str = "admin@adinnovation.ht";
/// Password matching the configured admin hash.
pub const ADMIN_PASSWORD: &str = "soleil-levant-2026";

/// Site configuration for an app listening on `port`.
#[must_use]
pub fn test_config(port: u16) -> SiteConfig {
    SiteConfig {
        host: [127, 0, 0, 1].into(),
        port,
        base_url: format!("http://127.0.0.1:{port}"),
        session_secret: SecretString::from("integration-test-session-secret-0123456789abcdef"),
        database_url: None,
        auth: AuthSettings {
            admin_email: Some(ADMIN_EMAIL.to_string()),
            admin_password_hash: Some(SecretString::from(
                hash_password(ADMIN_PASSWORD).expect("hash admin password"),
            )),
            delay: Duration::ZERO,
        },
        gemini: GeminiConfig {
            api_key: None,
            model: "gemini-test".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(5),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A plausible model reply.
#[must_use]
pub fn sample_estimate() -> SolarEstimate {
    SolarEstimate {
        potential_savings: "95 $ par mois".to_string(),
        recommended_panels: 12,
        environmental_impact: "1,8 tonne de CO2 évitée par an".to_string(),
        payback_period: "5 à 6 ans".to_string(),
        advice: "Privilégiez une orientation plein sud.".to_string(),
    }
}

/// Estimate provider returning a fixed reply, or failing.
#[derive(Debug, Default)]
pub struct StubEstimator {
    reply: Option<SolarEstimate>,
    calls: AtomicUsize,
}

impl StubEstimator {
    #[must_use]
    pub fn succeeding(reply: SolarEstimate) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
        })
    }

    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of estimates requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EstimateProvider for StubEstimator {
    async fn estimate(&self, _request: &EstimateRequest) -> Result<SolarEstimate, EstimateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(EstimateError::EmptyResponse)
    }
}

/// A running site and the address it listens on.
pub struct TestApp {
    pub base_url: String,
}

impl TestApp {
    /// Spawn the site with a succeeding estimator.
    pub async fn spawn() -> Self {
        Self::spawn_with(StubEstimator::succeeding(sample_estimate())).await
    }

    /// Spawn the site with the given estimate provider.
    pub async fn spawn_with(estimator: Arc<dyn EstimateProvider>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let port = listener.local_addr().expect("local addr").port();

        let state = AppState::new(test_config(port), Datastore::memory(), estimator, None);
        let router = solar_portal_site::app(state);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve test app");
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A fresh visitor with its own cookie jar. Redirects are not followed.
    #[must_use]
    pub fn visitor(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("build test client")
    }

    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    pub async fn post_form(&self, client: &Client, path: &str, form: &[(&str, &str)]) -> Response {
        client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// Register a regular account on `client`.
    pub async fn register(&self, client: &Client, name: &str, email: &str) -> Response {
        self.post_form(
            client,
            "/auth/register",
            &[
                ("name", name),
                ("email", email),
                ("password", "motdepasse"),
                ("confirm_password", "motdepasse"),
            ],
        )
        .await
    }

    /// Sign in on `client`.
    pub async fn login(&self, client: &Client, email: &str, password: &str) -> Response {
        self.post_form(
            client,
            "/auth/login",
            &[("email", email), ("password", password)],
        )
        .await
    }

    /// A visitor signed in as the configured admin.
    pub async fn admin(&self) -> Client {
        let client = self.visitor();
        let response = self.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(location(&response), "/");
        client
    }

    /// Whether `client` is signed in, judged by `/account`.
    pub async fn is_signed_in(&self, client: &Client) -> bool {
        self.get(client, "/account").await.status().is_success()
    }
}

/// `Location` header of a redirect, or `""`.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
