//! Session token data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim names owned by the codec; caller-supplied fields never override them.
pub const RESERVED_CLAIMS: [&str; 4] = ["sub", "email", "iat", "exp"];

/// Claims carried inside a session token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionClaims {
    /// Identity provider uid
    pub sub: String,
    pub email: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
    /// Any extra caller-supplied fields, flattened into the payload
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
