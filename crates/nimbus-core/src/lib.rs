pub mod config;
pub mod error;
pub mod screen;

pub use config::{
    AuthConfig, BroadcastConfig, Config, MapConfig, StoreConfig, ValidationResult,
    STORE_PATH_FORBIDDEN_CHARS, WEATHER_LAYER_IDS,
};
pub use error::{
    AppError, AuthError, BroadcastError, ConfigError, MapError, NetworkError, ReqwestErrorExt,
};
pub use screen::{Screen, ScreenEvent};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Nimbus core initialized");
    Ok(())
}
