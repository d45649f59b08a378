// src/services/identity.rs
//
// Seam between the HTTP surface and the external identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error; the message is the provider's own.
    #[error("{0}")]
    Rejected(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid identity token: {0}")]
    InvalidIdToken(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("service account credentials rejected: {0}")]
    Credentials(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
}

/// A user record as the provider reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Operations the gateway delegates to the identity provider.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderUser, ProviderError>;

    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, ProviderError>;

    async fn delete_user(&self, uid: &str) -> Result<(), ProviderError>;

    /// Verify an ID token issued by the provider itself (not a session token)
    async fn verify_id_token(&self, id_token: &str) -> Result<ProviderUser, ProviderError>;

    /// Check an email/password pair against the provider's credential store
    async fn verify_password(&self, email: &str, password: &str)
        -> Result<ProviderUser, ProviderError>;
}
