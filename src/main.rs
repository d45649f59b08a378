// src/main.rs
use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod health;
mod legacy;
mod logging_middleware;
mod services;
mod session;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::{AppState, Config};
use services::{FirebaseClient, ServiceAccount};
use session::SessionCodec;

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

/// Every route the service exposes, with state attached. CORS and tracing
/// are added by `main` so tests can drive this router directly.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Session tokens: register, login, protected
        .merge(auth::auth_routes())
        // Provider pass-throughs kept for older clients
        .merge(legacy::legacy_routes())
        // Liveness
        .merge(health::health_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = Config::from_env()?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let account = ServiceAccount::from_file(&config.firebase_credentials)?;
    let firebase = FirebaseClient::new(&account, config.firebase_web_api_key.clone())?;
    info!(project_id = %firebase.project_id(), "FirebaseClient initialized");
    if !firebase.password_sign_in_enabled() {
        warn!("FIREBASE_WEB_API_KEY is not set; /login will answer 503");
    }

    let codec = SessionCodec::new(config.jwt_secret.as_bytes(), config.token_ttl);
    info!(ttl_minutes = codec.ttl().num_minutes(), "SessionCodec initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState::new(codec, Arc::new(firebase)));

    let app = app_router(state)
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    info!("Listening on {}", config.bind_addr);
    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
