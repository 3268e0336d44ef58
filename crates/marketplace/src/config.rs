//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FARMCONNECT_ENV` - `development` or `production` (default: development)
//! - `FARMCONNECT_SESSION_DIR` - Directory for the file-backed session store
//!   (default: in-memory session storage)
//! - `FARMCONNECT_OTP_SEND_DELAY_MS` - Simulated OTP send delay (default: 1000)
//! - `FARMCONNECT_LOGIN_CHECK_DELAY_MS` - Simulated registration check delay (default: 500)
//! - `FARMCONNECT_CHAT_REPLY_MIN_MS` - Minimum mock chat reply delay (default: 1000)
//! - `FARMCONNECT_CHAT_REPLY_MAX_MS` - Maximum mock chat reply delay (default: 2000)
//! - `FARMCONNECT_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## Image storage (all or nothing)
//! - `FIREBASE_API_KEY`
//! - `FIREBASE_AUTH_DOMAIN`
//! - `FIREBASE_PROJECT_ID`
//! - `FIREBASE_STORAGE_BUCKET`
//! - `FIREBASE_MESSAGING_SENDER_ID`
//! - `FIREBASE_APP_ID`
//!
//! If any of the Firebase variables is missing, image uploads are disabled
//! and every caller falls back to placeholder images.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Runtime environment.
///
/// Controls whether the mock data store is shared across re-initialisation
/// (development) or always rebuilt from seed data (production).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("expected development or production, got {s}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected text or json, got {s}")),
        }
    }
}

/// Marketplace application configuration.
#[derive(Debug, Clone, Default)]
pub struct MarketplaceConfig {
    /// Runtime environment
    pub environment: Environment,
    /// Directory for file-backed session storage (in-memory if unset)
    pub session_dir: Option<PathBuf>,
    /// Simulated mock-network delays
    pub delays: DelayConfig,
    /// Image storage configuration (uploads disabled if `None`)
    pub storage: Option<StorageConfig>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Simulated network delays used for UX pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayConfig {
    /// Pause before an OTP is reported as sent
    pub otp_send: Duration,
    /// Pause while checking whether a phone number is registered
    pub login_check: Duration,
    /// Minimum pause before the mock farmer replies in chat
    pub chat_reply_min: Duration,
    /// Maximum pause before the mock farmer replies in chat
    pub chat_reply_max: Duration,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            otp_send: Duration::from_millis(1000),
            login_check: Duration::from_millis(500),
            chat_reply_min: Duration::from_millis(1000),
            chat_reply_max: Duration::from_millis(2000),
        }
    }
}

impl DelayConfig {
    /// No delays at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            otp_send: Duration::ZERO,
            login_check: Duration::ZERO,
            chat_reply_min: Duration::ZERO,
            chat_reply_max: Duration::ZERO,
        }
    }
}

/// Firebase Storage configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StorageConfig {
    /// Web API key
    pub api_key: SecretString,
    /// Auth domain (e.g., your-project.firebaseapp.com)
    pub auth_domain: String,
    /// Project ID
    pub project_id: String,
    /// Storage bucket (e.g., your-project.appspot.com)
    pub storage_bucket: String,
    /// Messaging sender ID
    pub messaging_sender_id: String,
    /// App ID
    pub app_id: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("api_key", &"[REDACTED]")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl MarketplaceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = get_env_or_default("FARMCONNECT_ENV", "development")
            .parse::<Environment>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMCONNECT_ENV".to_string(), e))?;
        let session_dir = get_optional_env("FARMCONNECT_SESSION_DIR").map(PathBuf::from);
        let log_format = get_env_or_default("FARMCONNECT_LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMCONNECT_LOG_FORMAT".to_string(), e))?;

        let defaults = DelayConfig::default();
        let delays = DelayConfig {
            otp_send: get_millis("FARMCONNECT_OTP_SEND_DELAY_MS", defaults.otp_send)?,
            login_check: get_millis("FARMCONNECT_LOGIN_CHECK_DELAY_MS", defaults.login_check)?,
            chat_reply_min: get_millis("FARMCONNECT_CHAT_REPLY_MIN_MS", defaults.chat_reply_min)?,
            chat_reply_max: get_millis("FARMCONNECT_CHAT_REPLY_MAX_MS", defaults.chat_reply_max)?,
        };
        if delays.chat_reply_max < delays.chat_reply_min {
            return Err(ConfigError::InvalidEnvVar(
                "FARMCONNECT_CHAT_REPLY_MAX_MS".to_string(),
                "must not be smaller than FARMCONNECT_CHAT_REPLY_MIN_MS".to_string(),
            ));
        }

        let storage = StorageConfig::from_env();
        if storage.is_none() {
            tracing::error!(
                "CRITICAL: Firebase config is incomplete. Ensure all FIREBASE_ variables are set. \
                 Image uploads will not work."
            );
        }

        Ok(Self {
            environment,
            session_dir,
            delays,
            storage,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether image uploads can be attempted.
    #[must_use]
    pub const fn uploads_enabled(&self) -> bool {
        self.storage.is_some()
    }
}

impl StorageConfig {
    /// Read the Firebase variables; `None` unless every one of them is set.
    fn from_env() -> Option<Self> {
        Some(Self {
            api_key: SecretString::from(get_optional_env("FIREBASE_API_KEY")?),
            auth_domain: get_optional_env("FIREBASE_AUTH_DOMAIN")?,
            project_id: get_optional_env("FIREBASE_PROJECT_ID")?,
            storage_bucket: get_optional_env("FIREBASE_STORAGE_BUCKET")?,
            messaging_sender_id: get_optional_env("FIREBASE_MESSAGING_SENDER_ID")?,
            app_id: get_optional_env("FIREBASE_APP_ID")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a duration in milliseconds with a default value.
fn get_millis(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| parse_millis(key, &value))
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
