//! Configuration types for the console client
//!
//! This module defines the configuration structure used by front ends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the console service (e.g. "https://dns.example.org")
    pub api_url: String,

    /// Path of the durable token file
    pub token_path: PathBuf,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ConsoleConfig {
    /// Create a configuration with defaults for everything but the endpoint
    pub fn new(api_url: impl Into<String>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            token_path: token_path.into(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_url.is_empty() {
            return Err(crate::Error::config("API URL cannot be empty"));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "API URL must use http or https: {}",
                self.api_url
            )));
        }
        if self.token_path.as_os_str().is_empty() {
            return Err(crate::Error::config("token path cannot be empty"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(crate::Error::config(format!(
                "timeout must be between 1 and 300 seconds, got {}",
                self.timeout_secs
            )));
        }
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(crate::Error::config(format!(
                    "invalid log level '{}'",
                    other
                )));
            }
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
