//! # Session Module
//!
//! Locally-signed session tokens handed out after register/login:
//! - `SessionClaims`: subject uid, email, issue/expiry timestamps
//! - `SessionCodec`: HS256 signing and validation with the shared secret
//! - `TokenError`: why a presented token was rejected

pub mod codec;
pub mod models;


pub use codec::{SessionCodec, TokenError, DEFAULT_TTL_MINUTES};
pub use models::SessionClaims;
