//! # Legacy Module
//!
//! Thin pass-throughs to the identity provider kept for older clients:
//! provider ID token verification, admin user creation and deletion.
//! None of these routes issue session tokens.

pub mod handlers;
pub mod models;
pub mod routes;


pub use routes::legacy_routes;
