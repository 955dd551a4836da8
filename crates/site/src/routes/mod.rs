//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page with the estimate calculator
//! POST /estimate                      - Calculator submit (re-renders home)
//! POST /api/estimate                  - JSON estimate API
//! GET  /team                          - Team page
//!
//! # Formations
//! GET  /formations?level=&category=   - Catalogue with filters
//! POST /formations/{id}/enroll        - Enroll, or withdraw if enrolled
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! GET  /auth/register                 - Register page
//! POST /auth/register                 - Register action
//! POST /auth/logout                   - Logout action
//!
//! # Account (requires auth)
//! GET  /account                       - Profile and enrollments
//!
//! # Admin (requires admin)
//! GET  /admin                         - Stats, users, formations
//! POST /admin/users/{id}/toggle-admin - Grant or revoke admin
//! POST /admin/users/{id}/delete       - Delete user, releasing seats
//! GET  /admin/formations/new          - New formation form
//! POST /admin/formations              - Create formation
//! GET  /admin/formations/{id}/edit    - Edit formation form
//! POST /admin/formations/{id}         - Update formation
//! POST /admin/formations/{id}/delete  - Delete formation
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod formations;
pub mod home;
pub mod team;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the formation routes router.
pub fn formation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(formations::index))
        .route("/{id}/enroll", post(formations::toggle_enrollment))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/users/{id}/toggle-admin", post(admin::toggle_admin))
        .route("/users/{id}/delete", post(admin::delete_user))
        .route("/formations", post(admin::create_formation))
        .route("/formations/new", get(admin::new_formation))
        .route("/formations/{id}", post(admin::update_formation))
        .route("/formations/{id}/edit", get(admin::edit_formation))
        .route("/formations/{id}/delete", post(admin::delete_formation))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/estimate", post(home::estimate))
        .route("/api/estimate", post(home::api_estimate))
        .route("/team", get(team::index))
        .route("/account", get(account::index))
        .nest("/formations", formation_routes())
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
