//! Authentication handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::extractors::SessionUser;
use super::models::{LoginRequest, ProtectedResponse, RegisterRequest, TokenResponse};
use super::validators::{LoginValidator, RegisterValidator};
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::services::ProviderError;

/// Single answer for every failed login
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid credentials";

/// POST /register
/// Creates the account with the identity provider and issues a session token
///
/// # Request Body
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "<password>",
///   "display_name": "Optional Name"
/// }
/// ```
///
/// # Response
/// ```json
/// {
///   "access_token": "<jwt token>",
///   "token_type": "bearer"
/// }
/// ```
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    info!(email = %safe_email_log(&payload.email), "🔐 Received registration request");

    let validation = RegisterValidator.validate(&payload);
    if !validation.is_valid {
        warn!(
            email = %safe_email_log(&payload.email),
            errors = ?validation.errors,
            "Registration validation failed"
        );
    }
    validation.into_result()?;

    let user = state
        .identity
        .create_user(
            &payload.email,
            &payload.password,
            payload.display_name.as_deref(),
        )
        .await
        .map_err(|e| {
            warn!(
                error = %e,
                email = %safe_email_log(&payload.email),
                "Identity provider refused registration"
            );
            ApiError::BadRequest(e.to_string())
        })?;

    let email = user.email.unwrap_or(payload.email);
    let access_token = state.codec.issue(&user.uid, &email)?;

    info!(
        user_id = %user.uid,
        email = %safe_email_log(&email),
        "User registered, session token issued"
    );

    Ok(Json(TokenResponse::bearer(access_token)))
}

/// POST /login
/// Verifies email and password with the identity provider and issues a session token
///
/// Blank input and every provider refusal get the same 401.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    info!(email = %safe_email_log(&payload.email), "🔐 Received login request");

    let validation = LoginValidator.validate(&payload);
    if !validation.is_valid {
        warn!(
            email = %safe_email_log(&payload.email),
            errors = ?validation.errors,
            "Login rejected before reaching identity provider"
        );
        return Err(ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string()));
    }

    let user = state
        .identity
        .verify_password(&payload.email, &payload.password)
        .await
        .map_err(|e| match e {
            ProviderError::NotConfigured(what) => {
                error!(missing = what, "Password verification is not configured");
                ApiError::ServiceUnavailable("login is not available".to_string())
            }
            other => {
                warn!(
                    error = %other,
                    email = %safe_email_log(&payload.email),
                    "Login rejected by identity provider"
                );
                ApiError::Unauthorized(INVALID_LOGIN_MESSAGE.to_string())
            }
        })?;

    let email = user.email.unwrap_or(payload.email);
    let access_token = state.codec.issue(&user.uid, &email)?;

    info!(
        user_id = %user.uid,
        email = %safe_email_log(&email),
        "Login successful, session token issued"
    );

    Ok(Json(TokenResponse::bearer(access_token)))
}

/// GET /protected
/// Returns the identity carried by a valid session token
///
/// # Response
/// ```json
/// {
///   "message": "This is a protected route",
///   "user_id": "<uid>",
///   "email": "user@example.com"
/// }
/// ```
pub async fn protected_handler(user: SessionUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected route".to_string(),
        user_id: user.user_id,
        email: user.email,
    })
}
