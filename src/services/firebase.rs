// src/services/firebase.rs
//
// Firebase Authentication over the Identity Toolkit REST API.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::firebase_keys::FirebaseKeyCache;
use super::identity::{IdentityProvider, ProviderError, ProviderUser};
use super::service_account::{AccessTokenSource, ServiceAccount};
use crate::common::{safe_email_log, ConfigError};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURETOKEN_ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Account record shape shared by the create, lookup and sign-in responses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

impl From<AccountRecord> for ProviderUser {
    fn from(record: AccountRecord) -> Self {
        ProviderUser {
            uid: record.local_id,
            email: record.email,
            display_name: record.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Claims of a Firebase-issued ID token that we surface
#[derive(Debug, Deserialize)]
struct FirebaseIdClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success Identity Toolkit response into a `ProviderError`,
/// keeping the provider's own message (e.g. `EMAIL_EXISTS`).
pub fn provider_error(status: StatusCode, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ProviderError::Rejected(envelope.error.message),
        Err(_) => ProviderError::Rejected(format!("HTTP {}: {}", status, body.trim())),
    }
}

fn rs256_header(id_token: &str) -> Result<Header, ProviderError> {
    let header = decode_header(id_token)
        .map_err(|e| ProviderError::InvalidIdToken(format!("bad header: {}", e)))?;

    if header.alg != Algorithm::RS256 {
        return Err(ProviderError::InvalidIdToken(format!(
            "unexpected algorithm {:?}",
            header.alg
        )));
    }
    Ok(header)
}

/// Validate a Firebase ID token against one of Google's signing keys.
///
/// Accepts only RS256 tokens issued by securetoken for `project_id`, with an
/// unexpired `exp` and a non-empty `sub`.
pub fn validate_id_token(
    id_token: &str,
    key: &DecodingKey,
    project_id: &str,
) -> Result<ProviderUser, ProviderError> {
    rs256_header(id_token)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[format!("{}{}", SECURETOKEN_ISSUER_PREFIX, project_id)]);
    validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

    let data = decode::<FirebaseIdClaims>(id_token, key, &validation).map_err(|e| {
        warn!(error = %e, "Firebase ID token validation failed");
        ProviderError::InvalidIdToken(e.to_string())
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(ProviderError::InvalidIdToken("empty subject".to_string()));
    }

    Ok(ProviderUser {
        uid: data.claims.sub,
        email: data.claims.email,
        display_name: data.claims.name,
    })
}

pub struct FirebaseClient {
    client: Client,
    base_url: String,
    project_id: String,
    web_api_key: Option<String>,
    tokens: AccessTokenSource,
    keys: FirebaseKeyCache,
}

impl FirebaseClient {
    pub fn new(account: &ServiceAccount, web_api_key: Option<String>) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let tokens = AccessTokenSource::new(account, client.clone())?;
        let keys = FirebaseKeyCache::new(client.clone());

        Ok(Self {
            client,
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            project_id: account.project_id.clone(),
            web_api_key,
            tokens,
            keys,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Whether `/login` can verify passwords (needs the web API key)
    pub fn password_sign_in_enabled(&self) -> bool {
        self.web_api_key.is_some()
    }

    fn project_url(&self, method: &str) -> String {
        format!("{}/projects/{}/{}", self.base_url, self.project_id, method)
    }

    /// POST an admin call authenticated with the service-account access token
    async fn admin_call<B, R>(&self, url: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let access_token = self.tokens.access_token().await?;
        let request = self.client.post(url).bearer_auth(access_token).json(body);
        self.send(request).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, ProviderError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "HTTP error contacting Identity Toolkit");
            ProviderError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = provider_error(status, &body);
            debug!(http_status = %status, error = %err, "Identity Toolkit returned error");
            return Err(err);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("unexpected response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseClient {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<ProviderUser, ProviderError> {
        let body = CreateAccountRequest {
            email,
            password,
            display_name,
        };
        let record: AccountRecord = self.admin_call(&self.project_url("accounts"), &body).await?;

        info!(
            user_id = %record.local_id,
            email = %safe_email_log(email),
            "Created Firebase user"
        );

        // The create response may omit fields that were sent; fill them in.
        Ok(ProviderUser {
            uid: record.local_id,
            email: record.email.or_else(|| Some(email.to_string())),
            display_name: record.display_name.or_else(|| display_name.map(str::to_string)),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, ProviderError> {
        let body = json!({ "email": [email] });
        let response: LookupResponse = self
            .admin_call(&self.project_url("accounts:lookup"), &body)
            .await?;

        response
            .users
            .into_iter()
            .next()
            .map(ProviderUser::from)
            .ok_or(ProviderError::UserNotFound)
    }

    async fn delete_user(&self, uid: &str) -> Result<(), ProviderError> {
        let body = json!({ "localId": uid });
        let _: serde_json::Value = self
            .admin_call(&self.project_url("accounts:delete"), &body)
            .await?;

        info!(user_id = %uid, "Deleted Firebase user");
        Ok(())
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<ProviderUser, ProviderError> {
        let kid = rs256_header(id_token)?
            .kid
            .ok_or_else(|| ProviderError::InvalidIdToken("missing key id".to_string()))?;
        let key = self.keys.key_for(&kid).await?;

        validate_id_token(id_token, &key, &self.project_id)
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let api_key = self
            .web_api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("FIREBASE_WEB_API_KEY"))?;

        let body = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };
        let request = self
            .client
            .post(format!("{}/accounts:signInWithPassword", self.base_url))
            .query(&[("key", api_key)])
            .json(&body);

        let record: AccountRecord = self.send(request).await?;
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use serde_json::Value;
    use std::path::PathBuf;

    const PROJECT_ID: &str = "cloud-vault-88f26";
    const SIGNING_KEY_PEM: &str = include_str!("testdata/id_token_signing.pem");
    const VERIFYING_KEY_PEM: &str = include_str!("testdata/id_token_signing.pub.pem");

    fn verifying_key() -> DecodingKey {
        DecodingKey::from_rsa_pem(VERIFYING_KEY_PEM.as_bytes()).unwrap()
    }

    fn id_claims() -> Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": format!("https://securetoken.google.com/{}", PROJECT_ID),
            "aud": PROJECT_ID,
            "sub": "firebase-uid-1",
            "email": "a@b.com",
            "name": "Ada",
            "iat": now,
            "exp": now + 3600,
        })
    }

    fn sign_rs256(claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("test-kid".to_string());
        let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap();
        encode(&header, claims, &key).unwrap()
    }

    fn with(field: &str, value: Value) -> Value {
        let mut claims = id_claims();
        claims[field] = value;
        claims
    }

    #[test]
    fn test_valid_id_token_is_accepted() {
        let token = sign_rs256(&id_claims());

        let user = validate_id_token(&token, &verifying_key(), PROJECT_ID).unwrap();

        assert_eq!(user.uid, "firebase-uid-1");
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_id_token_for_other_project_is_rejected() {
        let token = sign_rs256(&with("aud", json!("someone-else")));

        let result = validate_id_token(&token, &verifying_key(), PROJECT_ID);

        assert!(matches!(result, Err(ProviderError::InvalidIdToken(_))));
    }

    #[test]
    fn test_id_token_from_other_issuer_is_rejected() {
        let token = sign_rs256(&with("iss", json!("https://accounts.example.org")));

        let result = validate_id_token(&token, &verifying_key(), PROJECT_ID);

        assert!(matches!(result, Err(ProviderError::InvalidIdToken(_))));
    }

    #[test]
    fn test_expired_id_token_is_rejected() {
        let token = sign_rs256(&with("exp", json!(Utc::now().timestamp() - 3600)));

        let result = validate_id_token(&token, &verifying_key(), PROJECT_ID);

        assert!(matches!(result, Err(ProviderError::InvalidIdToken(_))));
    }

    #[test]
    fn test_id_token_without_expiry_is_rejected() {
        let mut claims = id_claims();
        claims.as_object_mut().unwrap().remove("exp");
        let token = sign_rs256(&claims);

        let result = validate_id_token(&token, &verifying_key(), PROJECT_ID);

        assert!(matches!(result, Err(ProviderError::InvalidIdToken(_))));
    }

    #[test]
    fn test_id_token_with_empty_subject_is_rejected() {
        let token = sign_rs256(&with("sub", json!("")));

        match validate_id_token(&token, &verifying_key(), PROJECT_ID) {
            Err(ProviderError::InvalidIdToken(reason)) => assert_eq!(reason, "empty subject"),
            other => panic!("expected InvalidIdToken, got {:?}", other),
        }
    }

    #[test]
    fn test_hmac_signed_id_token_is_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &id_claims(),
            &EncodingKey::from_secret(VERIFYING_KEY_PEM.as_bytes()),
        )
        .unwrap();

        match validate_id_token(&token, &verifying_key(), PROJECT_ID) {
            Err(ProviderError::InvalidIdToken(reason)) => {
                assert!(reason.contains("unexpected algorithm"))
            }
            other => panic!("expected InvalidIdToken, got {:?}", other),
        }
    }

    #[test]
    fn test_id_token_with_altered_payload_is_rejected() {
        let token = sign_rs256(&id_claims());
        let (header, rest) = token.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();
        let payload = URL_SAFE_NO_PAD.encode(with("sub", json!("attacker")).to_string());
        let forged = format!("{}.{}.{}", header, payload, signature);

        let result = validate_id_token(&forged, &verifying_key(), PROJECT_ID);

        assert!(matches!(result, Err(ProviderError::InvalidIdToken(_))));
    }

    #[test]
    fn test_client_builds_from_service_account() {
        let account = ServiceAccount {
            project_id: PROJECT_ID.to_string(),
            private_key_id: Some("test-kid".to_string()),
            private_key: SIGNING_KEY_PEM.to_string(),
            client_email: "firebase-adminsdk@cloud-vault-88f26.iam.gserviceaccount.com"
                .to_string(),
            token_uri: None,
            source: PathBuf::from("firebase_admin_sdk.json"),
        };

        let client = FirebaseClient::new(&account, None).unwrap();

        assert_eq!(client.project_id(), PROJECT_ID);
        assert!(!client.password_sign_in_enabled());
    }

    #[test]
    fn test_provider_error_keeps_firebase_message() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;

        let err = provider_error(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.to_string(), "EMAIL_EXISTS");
    }

    #[test]
    fn test_provider_error_falls_back_to_raw_body() {
        let err = provider_error(StatusCode::BAD_GATEWAY, "upstream exploded\n");

        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway: upstream exploded");
    }

    #[test]
    fn test_account_record_maps_to_provider_user() {
        let record: AccountRecord = serde_json::from_str(
            r#"{"kind":"identitytoolkit#SignupNewUserResponse","localId":"abc","email":"a@b.com","displayName":"Ada","idToken":"x"}"#,
        )
        .unwrap();

        let user = ProviderUser::from(record);

        assert_eq!(user.uid, "abc");
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_lookup_without_users_is_empty() {
        let response: LookupResponse =
            serde_json::from_str(r#"{"kind":"identitytoolkit#GetAccountInfoResponse"}"#).unwrap();

        assert!(response.users.is_empty());
    }

    #[test]
    fn test_create_request_omits_missing_display_name() {
        let body = CreateAccountRequest {
            email: "a@b.com",
            password: "secret1",
            display_name: None,
        };

        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value, json!({"email": "a@b.com", "password": "secret1"}));
    }
}
