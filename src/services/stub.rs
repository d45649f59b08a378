// src/services/stub.rs
//
// In-memory identity provider and router helpers for handler tests.

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::identity::{IdentityProvider, ProviderError, ProviderUser};
use crate::common::AppState;
use crate::session::SessionCodec;

pub const TEST_SECRET: &str = "test_secret_key";

struct StoredAccount {
    uid: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, StoredAccount>>,
    id_tokens: Mutex<HashMap<String, String>>,
    next_uid: AtomicUsize,
    unavailable: bool,
    password_check_disabled: bool,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the provider were unreachable
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Password verification reports itself as not configured
    pub fn without_password_check() -> Self {
        Self {
            password_check_disabled: true,
            ..Self::default()
        }
    }

    pub fn add_user(&self, email: &str, password: &str) -> String {
        let uid = format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1);
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            StoredAccount {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
            },
        );
        uid
    }

    /// Register a provider ID token that `verify_id_token` will accept
    pub fn issue_id_token(&self, email: &str) -> String {
        let token = format!("provider-token-{}", email);
        self.id_tokens
            .lock()
            .unwrap()
            .insert(token.clone(), email.to_string());
        token
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(email)
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable {
            Err(ProviderError::RequestFailed(
                "identity provider unreachable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn user(email: &str, account: &StoredAccount) -> ProviderUser {
        ProviderUser {
            uid: account.uid.clone(),
            email: Some(email.to_string()),
            display_name: account.display_name.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderUser, ProviderError> {
        self.check_available()?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(ProviderError::Rejected("EMAIL_EXISTS".to_string()));
        }
        let account = StoredAccount {
            uid: format!("uid-{}", self.next_uid.fetch_add(1, Ordering::SeqCst) + 1),
            password: password.to_string(),
            display_name: display_name.map(str::to_string),
        };
        let user = Self::user(email, &account);
        accounts.insert(email.to_string(), account);
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, ProviderError> {
        self.check_available()?;
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .map(|account| Self::user(email, account))
            .ok_or(ProviderError::UserNotFound)
    }

    async fn delete_user(&self, uid: &str) -> Result<(), ProviderError> {
        self.check_available()?;
        let mut accounts = self.accounts.lock().unwrap();
        let email = accounts
            .iter()
            .find(|(_, account)| account.uid == uid)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| ProviderError::Rejected("USER_NOT_FOUND".to_string()))?;
        accounts.remove(&email);
        Ok(())
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<ProviderUser, ProviderError> {
        self.check_available()?;
        let email = self
            .id_tokens
            .lock()
            .unwrap()
            .get(id_token)
            .cloned()
            .ok_or_else(|| ProviderError::InvalidIdToken("unknown token".to_string()))?;
        self.get_user_by_email(&email).await
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        self.check_available()?;
        if self.password_check_disabled {
            return Err(ProviderError::NotConfigured("FIREBASE_WEB_API_KEY"));
        }
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get(email)
            .ok_or_else(|| ProviderError::Rejected("EMAIL_NOT_FOUND".to_string()))?;
        if account.password != password {
            return Err(ProviderError::Rejected("INVALID_PASSWORD".to_string()));
        }
        Ok(Self::user(email, account))
    }
}

pub fn test_codec() -> SessionCodec {
    SessionCodec::new(TEST_SECRET.as_bytes(), Duration::minutes(30))
}

pub fn test_router(identity: Arc<InMemoryIdentityProvider>) -> Router {
    let state = Arc::new(AppState::new(test_codec(), identity));
    crate::app_router(state)
}

/// Send one request through the router and return the response head and body;
/// non-JSON bodies come back as a JSON string
pub async fn send(router: Router, request: Request<Body>) -> (Response, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (Response::from_parts(parts, Body::empty()), json)
}
