//! HS256 session token codec

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{SessionClaims, RESERVED_CLAIMS};

pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Reasons a token is refused. At the HTTP boundary every variant is a plain 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("session subject must not be empty")]
    EmptySubject,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl TokenError {
    fn from_decode(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Issues and validates session tokens with one shared secret.
///
/// The codec keeps no state besides its keys, so a restart never invalidates
/// tokens that have not yet expired.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `decode_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject` valid for the configured TTL from now
    pub fn issue(&self, subject: &str, email: &str) -> Result<String, TokenError> {
        self.issue_at(subject, email, Map::new(), Utc::now())
    }

    /// Mint a token carrying extra claims next to the standard ones
    pub fn issue_with(
        &self,
        subject: &str,
        email: &str,
        extra: Map<String, Value>,
    ) -> Result<String, TokenError> {
        self.issue_at(subject, email, extra, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        mut extra: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }

        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            TokenError::Encoding(format!("expiry overflows with ttl {}", self.ttl))
        })?;

        let claims = SessionClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a presented token against the current time
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Validate a presented token as of `now`.
    ///
    /// Claims are only returned when the signature matches and `now` has not
    /// passed `exp`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::from_decode)?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
