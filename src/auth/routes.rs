//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /register` - Create a provider account and issue a session token
/// - `POST /login` - Verify credentials and issue a session token
/// - `GET /protected` - Echo the caller's session claims
pub fn auth_routes() -> Router {
    Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/protected", get(handlers::protected_handler))
}
