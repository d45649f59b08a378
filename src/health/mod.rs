//! # Health Module
//!
//! Liveness probe. Answers without touching the identity provider so an
//! upstream outage does not take the process out of rotation.

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};


#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}
