//! Authentication data models

use serde::{Deserialize, Serialize};

pub const TOKEN_TYPE: &str = "bearer";

/// Registration payload
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
}

/// Login payload
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued session token
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

/// Body of `GET /protected`
#[derive(Serialize, Deserialize, Debug)]
pub struct ProtectedResponse {
    pub message: String,
    pub user_id: String,
    pub email: String,
}
