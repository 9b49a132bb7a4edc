use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `map.api_key`
pub const MAP_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Environment variable that overrides `auth.api_key`
pub const AUTH_API_KEY_ENV: &str = "NIMBUS_AUTH_API_KEY";

/// Weather overlay identifiers accepted by `map.default_layer`, in menu order.
pub const WEATHER_LAYER_IDS: [&str; 5] = [
    "precipitation_new",
    "temperature_new",
    "clouds_new",
    "wind_new",
    "pressure_new",
];

/// Characters the shared store refuses in path segments.
pub const STORE_PATH_FORBIDDEN_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Identity backend settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Shared location store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Location broadcast behaviour
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Weather map settings
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Web API key for the identity backend (can be set via environment)
    pub api_key: Option<String>,

    /// Base URL of the identity REST API
    #[serde(default = "default_auth_base_url")]
    pub base_url: String,

    /// File name (inside the config directory) of the persisted session
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_auth_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_session_file() -> String {
    "session.json".to_string()
}

impl AuthConfig {
    /// Check if an API key is configured (not a placeholder)
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty() && !k.starts_with("YOUR_"))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var(AUTH_API_KEY_ENV).ok(),
            base_url: default_auth_base_url(),
            session_file: default_session_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root URL of the shared real-time store
    pub base_url: String,

    /// Path prefix for per-user location records
    #[serde(default = "default_locations_path")]
    pub locations_path: String,

    /// Path prefix for user profile records written at registration
    #[serde(default = "default_users_path")]
    pub users_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Keep writes in memory instead of sending them to `base_url`
    #[serde(default)]
    pub offline: bool,
}

fn default_locations_path() -> String {
    "user_locations".to_string()
}

fn default_users_path() -> String {
    "users".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nimbus-default-rtdb.firebaseio.com".to_string(),
            locations_path: default_locations_path(),
            users_path: default_users_path(),
            request_timeout_secs: default_request_timeout(),
            offline: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Cancel the in-flight cycle when broadcasting is switched off.
    /// When false, a pending write is allowed to land (fire-and-forget).
    #[serde(default = "default_cancel_on_disable")]
    pub cancel_on_disable: bool,
}

fn default_cancel_on_disable() -> bool {
    true
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            cancel_on_disable: default_cancel_on_disable(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// OpenWeather API key used by the weather tile layer
    pub api_key: Option<String>,

    /// Initial map centre latitude
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,

    /// Initial map centre longitude
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Layer shown before the user picks one
    #[serde(default = "default_layer")]
    pub default_layer: String,
}

fn default_center_latitude() -> f64 {
    12.8797
}

fn default_center_longitude() -> f64 {
    121.7740
}

fn default_zoom() -> u8 {
    6
}

fn default_layer() -> String {
    WEATHER_LAYER_IDS[0].to_string()
}

impl MapConfig {
    /// Check if the weather API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty() && !k.starts_with("YOUR_"))
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var(MAP_API_KEY_ENV).ok(),
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            zoom: default_zoom(),
            default_layer: default_layer(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nimbus");

        Self {
            config_dir,
            auth: AuthConfig::default(),
            store: StoreConfig::default(),
            broadcast: BroadcastConfig::default(),
            map: MapConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let mut config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Environment variables win over values stored in the file
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(MAP_API_KEY_ENV) {
            self.map.api_key = Some(key);
        }
        if let Ok(key) = std::env::var(AUTH_API_KEY_ENV) {
            self.auth.api_key = Some(key);
        }
    }

    /// Path of the persisted session file
    pub fn session_path(&self) -> PathBuf {
        self.config_dir.join(&self.auth.session_file)
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.auth.base_url, "auth.base_url", &mut result);
        self.validate_url(&self.store.base_url, "store.base_url", &mut result);

        if self.auth.session_file.trim().is_empty() {
            result.add_error("auth.session_file", "Session file name must not be empty");
        }

        for (field, value) in [
            ("store.locations_path", &self.store.locations_path),
            ("store.users_path", &self.store.users_path),
        ] {
            let trimmed = value.trim_matches('/');
            if trimmed.is_empty() {
                result.add_error(field, "Store path must not be empty");
            } else if trimmed
                .split('/')
                .any(|segment| segment.is_empty() || segment.contains(STORE_PATH_FORBIDDEN_CHARS))
            {
                result.add_error(
                    field,
                    format!(
                        "Store path '{}' has an empty segment or one of: . # $ [ ]",
                        value
                    ),
                );
            }
        }

        if self.store.request_timeout_secs == 0 {
            result.add_error(
                "store.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.store.request_timeout_secs > 120 {
            result.add_warning(
                "store.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if !(-90.0..=90.0).contains(&self.map.center_latitude) {
            result.add_error("map.center_latitude", "Latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.map.center_longitude) {
            result.add_error(
                "map.center_longitude",
                "Longitude must be within [-180, 180]",
            );
        }
        if self.map.zoom > 19 {
            result.add_error("map.zoom", "Zoom level must be within [0, 19]");
        }

        if !WEATHER_LAYER_IDS.contains(&self.map.default_layer.as_str()) {
            result.add_error(
                "map.default_layer",
                format!(
                    "Unknown layer '{}' (expected one of: {})",
                    self.map.default_layer,
                    WEATHER_LAYER_IDS.join(", ")
                ),
            );
        }

        if !self.map.is_configured() {
            result.add_warning(
                "map.api_key",
                "Weather API key not configured - overlay tiles will fail to load",
            );
        }

        if !self.auth.is_configured() {
            result.add_warning(
                "auth.api_key",
                "Identity API key not configured - sign-in will be unavailable",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("nimbus");

        Ok(config_dir.join("config.toml"))
    }
}
