//! Authentication error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Identity backend not configured")]
    NotConfigured,

    #[error("Rejected by identity backend: {0}")]
    Rejected(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    /// Errors the user fixes by editing the form rather than retrying.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::PasswordMismatch | Self::InvalidCredentials | Self::EmailTaken
        )
    }
}
