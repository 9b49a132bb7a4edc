//! REST adapter for the managed real-time store.
//!
//! Values are written with `PUT {base}/{path}.json?auth={id_token}`.

use std::sync::Arc;
use std::time::Duration;

use nimbus_auth::SessionContext;
use tracing::instrument;

use crate::retry::{with_retry, RetryConfig};
use crate::store::{normalize_path, SharedStore, StoreError};

/// `SharedStore` backed by the real-time store's REST API
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    session: Option<Arc<SessionContext>>,
    retry: RetryConfig,
}

impl RestStore {
    /// Create a store client with the given per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
            retry: RetryConfig::default(),
        })
    }

    /// Authenticate writes with the current session's id token
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path)
    }
}

impl SharedStore for RestStore {
    #[instrument(skip(self, value), level = "debug")]
    async fn write(&self, path: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = normalize_path(path)?;
        let url = self.url_for(&path);
        let token = self.session.as_ref().and_then(|s| s.id_token());

        let response = with_retry(&self.retry, || {
            let mut request = self.client.put(&url).json(&value);
            if let Some(token) = &token {
                request = request.query(&[("auth", token.as_str())]);
            }
            request.send()
        })
        .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(StoreError::Unauthorized);
        }

        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
