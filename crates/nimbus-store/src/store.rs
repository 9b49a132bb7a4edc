//! Shared key-value store contract.

use std::future::Future;

use nimbus_core::STORE_PATH_FORBIDDEN_CHARS;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("Write rejected: not authorized")]
    Unauthorized,

    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// A shared store addressed by slash-separated paths.
///
/// A write replaces whatever value the path held; the last write to
/// complete wins.
pub trait SharedStore: Send + Sync {
    fn write(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Join path segments with `/`, trimming stray slashes.
pub fn join_path(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix.trim_matches('/'), key.trim_matches('/'))
}

/// Validate and normalize a store path.
///
/// Leading/trailing slashes are dropped; empty segments and segments with
/// characters the store rejects are errors.
pub fn normalize_path(path: &str) -> Result<String, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() || segment.contains(STORE_PATH_FORBIDDEN_CHARS) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
    }

    Ok(trimmed.to_string())
}
