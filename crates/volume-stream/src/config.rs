//! Configuration for the HTTP side of the pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Transport and strategy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Issue range requests even when the server does not advertise
    /// `Accept-Ranges: bytes`.
    pub force_range_requests: bool,

    /// Whole-request timeout in seconds (covers streaming the body).
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            force_range_requests: false,
            request_timeout_secs: 600,
            connect_timeout_secs: 30,
            user_agent: concat!("volume-stream/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("VOLUME_FORCE_RANGE_REQUESTS") {
            config.force_range_requests = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("VOLUME_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("VOLUME_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("VOLUME_USER_AGENT") {
            if !val.is_empty() {
                config.user_agent = val;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }

        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be > 0".to_string());
        }

        if self.connect_timeout_secs > self.request_timeout_secs {
            return Err("connect_timeout_secs must not exceed request_timeout_secs".to_string());
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
