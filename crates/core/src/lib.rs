//! Solar Portal Core - Shared types library.
//!
//! This crate provides the domain types used across the portal components:
//! - `site` - Public marketing site, customer area and admin panel
//! - `cli` - Command-line tools for migrations, seeding and admin grants
//!
//! # Architecture
//!
//! The core crate contains only types and the arithmetic on them. No I/O,
//! no storage access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, prices, users, formations and
//!   estimate request/response shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
