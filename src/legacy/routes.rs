//! Legacy provider routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

/// Creates and returns the legacy router
///
/// # Routes
/// - `GET /` - Service banner
/// - `POST /verify-token/` - Verify a provider-issued ID token
/// - `POST /create-user/` - Create a provider account from query parameters
/// - `DELETE /delete-user/:user_id` - Delete a provider account
pub fn legacy_routes() -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/verify-token/", post(handlers::verify_token_handler))
        .route("/create-user/", post(handlers::create_user_handler))
        .route("/delete-user/:user_id", delete(handlers::delete_user_handler))
}
