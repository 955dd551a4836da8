//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Mock sign-in, registration and session handling
//! - `users` - User directory (admin panel, admin grants)
//! - `formations` - Formation catalogue and per-user enrollments
//! - `estimate` - Solar estimate from a generative model

pub mod auth;
pub mod estimate;
pub mod formations;
pub mod users;
