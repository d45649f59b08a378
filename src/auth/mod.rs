//! # Auth Module
//!
//! This module handles the session-token side of authentication:
//! - Registration through the identity provider
//! - Email/password login verified by the identity provider
//! - Session token issuance on success
//! - SessionUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use extractors::SessionUser;
pub use routes::auth_routes;
