//! Centralized error types for the Nimbus application.
//!
//! Domain crates declare their own error enums; the app crate maps them into
//! this hierarchy so every failure has a UI-appropriate message while the
//! full error keeps its context for logging.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Location broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level errors that have no dedicated category.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Broadcast(e) => e.user_message(),
            AppError::Map(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// True when the user can do something about the error (sign in, grant
    /// a permission, fix a form) rather than just wait.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_)
                | AppError::Broadcast(BroadcastError::Unauthenticated)
                | AppError::Broadcast(BroadcastError::PermissionDenied)
        )
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Authentication errors (sign-in, registration, session storage).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Sign-in rejected: {0}")]
    Rejected(String),

    #[error("Session storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::SessionExpired => "Your session has expired. Please sign in again.",
            AuthError::InvalidCredentials => "Invalid email or password. Please try again.",
            AuthError::PasswordMismatch => "Passwords do not match!",
            AuthError::EmailTaken => "An account with this email already exists.",
            AuthError::Rejected(_) => "Sign-in failed. Please try again.",
            AuthError::StorageError(_) => "Failed to save your session. Please try again.",
        }
    }
}

/// Location broadcast errors.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("No signed-in user")]
    Unauthenticated,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Store write failed: {0}")]
    StoreWriteFailed(String),
}

impl BroadcastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            BroadcastError::Unauthenticated => {
                "Sign in to broadcast your location."
            }
            BroadcastError::PermissionDenied => {
                "Location permission is required. Allow it and toggle broadcasting again."
            }
            BroadcastError::PositionUnavailable(_) => {
                "Your location is not available right now."
            }
            BroadcastError::StoreWriteFailed(_) => "Failed to share your location.",
        }
    }
}

/// Weather map errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("Unknown map layer: {0}")]
    InvalidLayer(String),

    #[error("Map failed to load: {description} (code {code})")]
    RenderSurface { code: i32, description: String },
}

impl MapError {
    pub fn user_message(&self) -> &'static str {
        match self {
            MapError::InvalidLayer(_) => "That map layer is not available.",
            MapError::RenderSurface { .. } => "The map failed to load. Check your connection.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
