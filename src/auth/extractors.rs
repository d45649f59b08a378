//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_email_log, ApiError, AppState, INVALID_CREDENTIALS_MESSAGE};
use crate::session::SessionClaims;

/// Authenticated caller extractor
///
/// Validates the `Authorization: Bearer <token>` session token. No provider
/// round trip is made; the token alone is the credential.
#[derive(Debug)]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
    pub claims: SessionClaims,
}

/// Bearer credential from the Authorization header, scheme matched case-insensitively
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match bearer_token(&parts.headers) {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing or non-bearer Authorization header");
                return Err(ApiError::Unauthorized(
                    INVALID_CREDENTIALS_MESSAGE.to_string(),
                ));
            }
        };

        let claims = app_state.codec.decode(token)?;

        debug!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "Session token accepted"
        );

        Ok(SessionUser {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            claims,
        })
    }
}
