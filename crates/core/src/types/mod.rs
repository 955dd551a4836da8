//! Core types for the solar portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod estimate;
pub mod formation;
pub mod id;
pub mod price;
pub mod user;

pub use email::{Email, EmailError};
pub use estimate::{EstimateRequest, EstimateRequestError, RoofType, SolarEstimate, SunExposure};
pub use formation::{
    CATEGORIES, Enrollment, EnrollmentError, Formation, FormationDraft, FormationLevel,
    FormationPatch, FormationValidationError,
};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use user::User;
