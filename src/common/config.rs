// src/common/config.rs
//! Startup configuration loaded from the environment (and `.env` via dotenv).
//! Any problem here is fatal: the server refuses to start.

use chrono::Duration;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::session::DEFAULT_TTL_MINUTES;

/// Value shipped in old `.env` templates; never accepted as a signing secret.
const PLACEHOLDER_SECRET: &str = "your-secret-key-here";
const MIN_RECOMMENDED_SECRET_LEN: usize = 32;
/// One year; session tokens are short-lived and nothing needs longer
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

const DEFAULT_CREDENTIALS_PATH: &str = "backend/firebase_admin_sdk.json";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:3002,http://127.0.0.1:3000,http://127.0.0.1:3002";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("JWT_SECRET_KEY is still set to the placeholder value")]
    PlaceholderSecret,

    #[error("Firebase credentials not found at {}", .0.display())]
    MissingCredentials(PathBuf),

    #[error("Firebase credentials at {} are invalid: {reason}", .path.display())]
    InvalidCredentials { path: PathBuf, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub firebase_credentials: PathBuf,
    pub firebase_web_api_key: Option<String>,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = get("JWT_SECRET_KEY").ok_or(ConfigError::MissingVar("JWT_SECRET_KEY"))?;
        if jwt_secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::PlaceholderSecret);
        }
        if jwt_secret.len() < MIN_RECOMMENDED_SECRET_LEN {
            warn!(
                secret_len = jwt_secret.len(),
                recommended = MIN_RECOMMENDED_SECRET_LEN,
                "JWT_SECRET_KEY is shorter than recommended"
            );
        }

        let token_ttl_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw.parse::<i64>().map_err(|e| ConfigError::InvalidVar {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TTL_MINUTES,
        };
        if !(1..=MAX_TTL_MINUTES).contains(&token_ttl_minutes) {
            return Err(ConfigError::InvalidVar {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: format!("must be between 1 and {}", MAX_TTL_MINUTES),
            });
        }
        let token_ttl =
            Duration::try_minutes(token_ttl_minutes).ok_or_else(|| ConfigError::InvalidVar {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "out of range".to_string(),
            })?;

        let firebase_credentials = PathBuf::from(
            get("FIREBASE_CREDENTIALS").unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
        );
        if !firebase_credentials.is_file() {
            return Err(ConfigError::MissingCredentials(firebase_credentials));
        }

        let firebase_web_api_key = get("FIREBASE_WEB_API_KEY");

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip = host.parse::<IpAddr>().map_err(|e| ConfigError::InvalidVar {
            name: "HOST",
            reason: e.to_string(),
        })?;
        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            jwt_secret,
            token_ttl,
            firebase_credentials,
            firebase_web_api_key,
            bind_addr: SocketAddr::new(ip, port),
            cors_origins,
        })
    }
}
