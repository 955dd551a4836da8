//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::services::estimate::EstimateProvider;
use crate::storage::Datastore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the record store, the estimate provider and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: Datastore,
    estimator: Arc<dyn EstimateProvider>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `store` - Global record store
    /// * `estimator` - Solar estimate provider
    /// * `pool` - `PostgreSQL` pool when running against a database
    #[must_use]
    pub fn new(
        config: SiteConfig,
        store: Datastore,
        estimator: Arc<dyn EstimateProvider>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                estimator,
                pool,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the global record store.
    #[must_use]
    pub fn store(&self) -> &Datastore {
        &self.inner.store
    }

    /// Get a reference to the solar estimate provider.
    #[must_use]
    pub fn estimator(&self) -> &dyn EstimateProvider {
        self.inner.estimator.as_ref()
    }

    /// Get the database pool, if the site runs against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
