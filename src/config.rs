//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

const SERVICE_URL_VAR: &str = "TRADE_DESK_SERVICE_URL";
const TIMEOUT_VAR: &str = "TRADE_DESK_TIMEOUT_SECS";
const LOG_FILE_VAR: &str = "TRADE_DESK_LOG_FILE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("service URL must start with http:// or https://, got {0:?}")]
    InvalidServiceUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis service; `/analyze-trade` is appended
    pub service_url: String,
    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    /// Where the interactive form writes its logs
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = var(SERVICE_URL_VAR) {
            config.service_url = url;
        }
        if let Some(raw) = var(TIMEOUT_VAR) {
            config.request_timeout = Some(parse_timeout(TIMEOUT_VAR, &raw)?);
        }
        config.log_file = var(LOG_FILE_VAR).map(PathBuf::from);
        config.validate()
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        service_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = service_url {
            self.service_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.request_timeout = Some(parse_timeout("--timeout-secs", &secs.to_string())?);
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.service_url.starts_with("http://") || self.service_url.starts_with("https://") {
            Ok(self)
        } else {
            Err(ConfigError::InvalidServiceUrl(self.service_url))
        }
    }
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}
