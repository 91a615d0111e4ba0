//! Runtime configuration for the console client.

use crate::core::domain::{
    error::{ConsoleResult, ValidationError},
    value_object::{ApiBaseUrl, DEFAULT_API_BASE, validate_session_cookie},
};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Default file stem looked up by [`ConsoleConfig::load`].
pub const DEFAULT_CONFIG_FILE: &str = "goosed-console";

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Settings of a [`crate::GoosedClient`].
///
/// Every field has a default, so partial files and environments load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Origin the console is served from, e.g. `https://goosed.example.com`.
    pub origin: Option<String>,
    /// API base path (joined to `origin`) or absolute API URL.
    pub api_base: String,
    /// Background refresh period of the machine inventory.
    pub poll_interval_secs: u64,
    /// Age after which cached listings are fetched again.
    pub stale_time_secs: u64,
    pub request_timeout_secs: u64,
    /// `Cookie` header value sent with every request.
    pub session_cookie: Option<String>,
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            origin: None,
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_secs: 60,
            stale_time_secs: 30,
            request_timeout_secs: 30,
            session_cookie: None,
            rate_limit: None,
        }
    }
}

impl ConsoleConfig {
    /// Loads `goosed-console.{toml,yaml,json,...}` if present, then `GOOSED_*` variables.
    ///
    /// # Errors
    /// Returns `ConsoleError::Config` if a source cannot be parsed and
    /// `ConsoleError::Validation` if the merged settings are invalid.
    pub fn load() -> ConsoleResult<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Same as [`ConsoleConfig::load`] with an explicit file stem or path.
    ///
    /// Nested keys use a double underscore in the environment,
    /// e.g. `GOOSED_RATE_LIMIT__BURST_SIZE`.
    pub fn load_from(file: &str) -> ConsoleResult<Self> {
        let loaded: Self = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("GOOSED")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the API base URL from `origin` and `api_base`.
    pub fn base_url(&self) -> Result<ApiBaseUrl, ValidationError> {
        ApiBaseUrl::resolve(self.origin.as_deref(), &self.api_base)
    }

    /// Checks the settings without touching the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.base_url()?;

        if self.poll_interval_secs == 0 {
            return Err(ValidationError::Field {
                field: "poll_interval_secs".to_string(),
                message: "Poll interval must be at least one second".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::Field {
                field: "request_timeout_secs".to_string(),
                message: "Request timeout must be at least one second".to_string(),
            });
        }
        if let Some(cookie) = &self.session_cookie {
            validate_session_cookie(cookie.trim())?;
        }
        if let Some(limit) = self.rate_limit {
            if limit.requests_per_second == 0 || limit.burst_size == 0 {
                return Err(ValidationError::ConstraintViolation(
                    "Rate limit and burst size must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }
}
