// Configuration management

use crate::core::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Configuration loaded from environment variables.
///
/// Covers the knobs of the built-in handlers and logging; the resolver
/// itself is assembled in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scheme `challenge` targets when none is requested explicitly
    pub default_scheme: Option<String>,

    /// Login page the session handler redirects challenges to
    pub login_url: Option<String>,

    /// Header the API key handler reads
    pub api_key_header: String,

    // Session store configuration
    pub session_ttl_secs: u64,
    pub session_capacity: u64,

    /// Optional YAML credential directory
    pub directory_path: Option<PathBuf>,

    // Logging configuration
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Supports `.env` file loading in development (via dotenv crate).
    /// All fields have defaults; validation happens after load.
    pub fn from_env() -> Result<Self, IdentityError> {
        // Skip in test environment to avoid interfering with test
        // environment variables
        #[cfg(not(test))]
        {
            dotenv::dotenv().ok(); // Ignore errors (file may not exist)
        }

        let config = Self {
            default_scheme: Self::get_optional_env("WARDEN_DEFAULT_SCHEME"),
            login_url: Self::get_optional_env("WARDEN_LOGIN_URL"),
            api_key_header: Self::get_env_or_default("WARDEN_API_KEY_HEADER", "x-api-key"),
            session_ttl_secs: Self::parse_u64_or_default("WARDEN_SESSION_TTL_SECS", 3600)?,
            session_capacity: Self::parse_u64_or_default("WARDEN_SESSION_CAPACITY", 10_000)?,
            directory_path: Self::get_optional_env("WARDEN_DIRECTORY_PATH").map(PathBuf::from),
            log_level: Self::get_env_or_default("WARDEN_LOG_LEVEL", "info"),
            log_format: Self::get_env_or_default("WARDEN_LOG_FORMAT", "text"),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate field values and referenced paths
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.session_ttl_secs == 0 {
            return Err(IdentityError::Configuration(
                "WARDEN_SESSION_TTL_SECS must be greater than 0".to_string(),
            ));
        }
        if self.log_format != "json" && self.log_format != "text" {
            return Err(IdentityError::Configuration(format!(
                "WARDEN_LOG_FORMAT must be 'json' or 'text', got '{}'",
                self.log_format
            )));
        }
        if let Some(path) = &self.directory_path {
            if !path.exists() {
                return Err(IdentityError::Configuration(format!(
                    "WARDEN_DIRECTORY_PATH points to a missing file: {:?}",
                    path
                )));
            }
        }
        Ok(())
    }

    fn get_env_or_default(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    fn get_optional_env(key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn parse_u64_or_default(key: &str, default: u64) -> Result<u64, IdentityError> {
        match env::var(key) {
            Ok(value) => value.parse::<u64>().map_err(|_| {
                IdentityError::Configuration(format!("{} must be a positive integer", key))
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_scheme: None,
            login_url: None,
            api_key_header: "x-api-key".to_string(),
            session_ttl_secs: 3600,
            session_capacity: 10_000,
            directory_path: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Initialize the tracing subscriber from the configured level and format.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt().with_target(false).with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
