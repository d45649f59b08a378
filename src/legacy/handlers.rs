//! Legacy provider handlers

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{CreateUserQuery, MessageResponse, ProviderIdentity, VerifyTokenRequest};
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

pub const INVALID_ID_TOKEN_MESSAGE: &str = "Invalid authentication token";

/// GET /
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "CloudVault Auth Service is running".to_string(),
    })
}

/// POST /verify-token/
/// Verifies a provider-issued ID token (not a session token)
///
/// # Request Body
/// ```json
/// { "token": "<provider id token>" }
/// ```
pub async fn verify_token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<ProviderIdentity>, ApiError> {
    let user = state
        .identity
        .verify_id_token(&payload.token)
        .await
        .map_err(|e| {
            warn!(
                error = %e,
                token = %safe_token_log(&payload.token),
                "Provider ID token rejected"
            );
            ApiError::Unauthorized(INVALID_ID_TOKEN_MESSAGE.to_string())
        })?;

    Ok(Json(ProviderIdentity::from(user)))
}

/// POST /create-user/?email=&password=
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<CreateUserQuery>,
) -> Result<Json<ProviderIdentity>, ApiError> {
    let user = state
        .identity
        .create_user(&query.email, &query.password, None)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %safe_email_log(&query.email), "User creation failed");
            ApiError::BadRequest(e.to_string())
        })?;

    info!(user_id = %user.uid, "User created through legacy endpoint");
    Ok(Json(ProviderIdentity::from(user)))
}

/// DELETE /delete-user/:user_id
pub async fn delete_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.delete_user(&user_id).await.map_err(|e| {
        warn!(error = %e, user_id = %user_id, "User deletion failed");
        ApiError::BadRequest(e.to_string())
    })?;

    info!(user_id = %user_id, "User deleted");
    Ok(Json(MessageResponse {
        message: format!("User {} deleted successfully", user_id),
    }))
}
