//! Identity backend client.
//!
//! Speaks the Identity Toolkit REST dialect used by the managed backend:
//! `accounts:signInWithPassword` and `accounts:signUp`, both keyed by a web
//! API key and answering with `localId`/`idToken`/`expiresIn`.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::session::{IdentityId, Session};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Exchanges credentials for a session.
pub trait Authenticator: Send + Sync {
    /// Sign in an existing account
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    /// Create a new account and sign it in
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
    /// Seconds, sent as a string
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `Authenticator` backed by the identity REST API
#[derive(Debug, Clone)]
pub struct RestAuthenticator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestAuthenticator {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, AuthError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::NotConfigured)?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email), level = "info")]
    async fn post_account(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        credentials.validate()?;

        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let body = PasswordRequest {
            email: &credentials.email,
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let account: AccountResponse = self.handle_response(response).await?;
        Ok(session_from(account, &credentials.email))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuthError::Rejected(format!("JSON parse error: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("{}: {}", status, text));

        tracing::warn!(target: "auth", "Identity backend rejected request: {}", code);
        Err(map_backend_error(&code))
    }
}

impl Authenticator for RestAuthenticator {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.post_account("signInWithPassword", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.post_account("signUp", credentials).await
    }
}

fn session_from(account: AccountResponse, fallback_email: &str) -> Session {
    let expires_in = account
        .expires_in
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    Session {
        identity: IdentityId::new(account.local_id),
        email: account.email.unwrap_or_else(|| fallback_email.to_string()),
        id_token: account.id_token,
        refresh_token: account.refresh_token,
        expires_at: chrono::Utc::now().timestamp() + expires_in,
    }
}

/// Map backend error codes such as `INVALID_PASSWORD` or
/// `TOO_MANY_ATTEMPTS_TRY_LATER : ...` to our error type.
fn map_backend_error(message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailTaken,
        _ => AuthError::Rejected(message.to_string()),
    }
}
