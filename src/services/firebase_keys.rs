// src/services/firebase_keys.rs
//
// Google's public signing keys for Firebase ID tokens, cached for as long as
// the `Cache-Control: max-age` header allows.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::DecodingKey;
use reqwest::{header::CACHE_CONTROL, header::HeaderMap, Client};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::identity::ProviderError;

pub const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_KEYS_TTL_SECS: i64 = 3600;
/// Upper bound on how long a fetched key set is trusted, whatever `max-age` says
const MAX_KEYS_TTL_SECS: i64 = 24 * 3600;
/// Minimum spacing between refetches triggered by an unknown `kid`
const MIN_FORCED_REFETCH_SECS: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    pub fn find_key(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonWebKey {
    pub kid: Option<String>,
    /// RSA modulus (base64url)
    pub n: String,
    /// RSA public exponent (base64url)
    pub e: String,
}

#[derive(Clone)]
struct CachedKeySet {
    keys: JsonWebKeySet,
    expires_at: DateTime<Utc>,
}

pub struct FirebaseKeyCache {
    client: Client,
    url: String,
    cached: RwLock<Option<CachedKeySet>>,
    last_forced_fetch: Mutex<Option<DateTime<Utc>>>,
}

impl FirebaseKeyCache {
    pub fn new(client: Client) -> Self {
        Self::with_url(client, SECURETOKEN_JWKS_URL)
    }

    pub fn with_url(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            cached: RwLock::new(None),
            last_forced_fetch: Mutex::new(None),
        }
    }

    /// Decoding key for `kid`. An unknown `kid` forces one refetch in case
    /// Google rotated its keys, at most once per `MIN_FORCED_REFETCH_SECS`.
    pub async fn key_for(&self, kid: &str) -> Result<DecodingKey, ProviderError> {
        let keys = self.keys(false).await?;
        let keys = if keys.find_key(kid).is_some() {
            keys
        } else if self.claim_forced_refetch(Utc::now()).await {
            debug!(kid = %kid, "Signing key not cached, refetching key set");
            self.keys(true).await?
        } else {
            debug!(kid = %kid, "Signing key not cached, refetch throttled");
            keys
        };

        let jwk = keys
            .find_key(kid)
            .ok_or_else(|| ProviderError::InvalidIdToken(format!("unknown signing key {}", kid)))?;

        DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| ProviderError::InvalidIdToken(format!("unusable signing key: {}", e)))
    }

    /// Records a forced refetch at `now` unless one happened too recently
    async fn claim_forced_refetch(&self, now: DateTime<Utc>) -> bool {
        let mut last = self.last_forced_fetch.lock().await;
        match *last {
            Some(at) if now < at + Duration::seconds(MIN_FORCED_REFETCH_SECS) => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    async fn keys(&self, force_refresh: bool) -> Result<JsonWebKeySet, ProviderError> {
        if !force_refresh {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if Utc::now() < entry.expires_at {
                    return Ok(entry.keys.clone());
                }
            }
        }

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %self.url, "JWKS endpoint returned error status");
            return Err(ProviderError::RequestFailed(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        let ttl = max_age(response.headers()).unwrap_or(DEFAULT_KEYS_TTL_SECS);
        let keys = response
            .json::<JsonWebKeySet>()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to parse JWKS: {}", e)))?;

        debug!(key_count = keys.keys.len(), ttl_secs = ttl, "Fetched Firebase signing keys");

        *self.cached.write().await = Some(CachedKeySet {
            keys: keys.clone(),
            expires_at: cache_expiry(Utc::now(), ttl),
        });

        Ok(keys)
    }
}

/// When a key set fetched at `now` goes stale; `ttl_secs` comes from the
/// remote server and is clamped to `0..=MAX_KEYS_TTL_SECS`
fn cache_expiry(now: DateTime<Utc>, ttl_secs: i64) -> DateTime<Utc> {
    now + Duration::seconds(ttl_secs.clamp(0, MAX_KEYS_TTL_SECS))
}

/// `max-age` directive of a `Cache-Control` header, in seconds
pub fn max_age(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<i64>().ok())
}
