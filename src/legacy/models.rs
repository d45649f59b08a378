//! Legacy request and response shapes

use serde::{Deserialize, Serialize};

use crate::services::ProviderUser;

#[derive(Deserialize, Debug)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Query string of `POST /create-user/`
#[derive(Deserialize, Debug)]
pub struct CreateUserQuery {
    pub email: String,
    pub password: String,
}

/// Provider identity as returned by the legacy routes; `email` may be null
#[derive(Serialize, Deserialize, Debug)]
pub struct ProviderIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<ProviderUser> for ProviderIdentity {
    fn from(user: ProviderUser) -> Self {
        Self {
            user_id: user.uid,
            email: user.email,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
