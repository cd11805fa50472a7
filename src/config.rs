//! Client configuration.
//!
//! The connection target is a fixed port and path on a configurable host;
//! the display name chosen at login travels as the `username` query
//! parameter. The binary fills this in from flags and `PRESENCE_*` env vars.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::render::{DEFAULT_PROXIMITY_RADIUS, DisplayConfig};
use crate::sample::Viewport;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9000;
pub const WS_PATH: &str = "/ws";
pub const DEFAULT_THROTTLE_MS: u64 = 100;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("host must not be empty")]
    EmptyHost,
    #[error("throttle interval must be greater than zero")]
    ZeroThrottleInterval,
    #[error("proximity radius must be a finite, non-negative number (got {0})")]
    InvalidRadius(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
    pub display_name: String,
    pub throttle_interval: Duration,
    pub proximity_radius: f64,
    pub viewport: Viewport,
}

impl ClientConfig {
    /// Config with defaults for everything except the display name.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            secure: false,
            display_name: display_name.into(),
            throttle_interval: Duration::from_millis(DEFAULT_THROTTLE_MS),
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            viewport: Viewport::default(),
        }
    }

    /// Check the values the session relies on.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_name.trim().is_empty() {
            return Err(ConfigError::EmptyDisplayName);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.throttle_interval.is_zero() {
            return Err(ConfigError::ZeroThrottleInterval);
        }
        if !self.proximity_radius.is_finite() || self.proximity_radius < 0.0 {
            return Err(ConfigError::InvalidRadius(self.proximity_radius));
        }
        Ok(())
    }

    /// Websocket URL with the display name as the `username` query parameter.
    #[must_use]
    pub fn ws_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        let username = utf8_percent_encode(&self.display_name, NON_ALPHANUMERIC);
        format!("{scheme}://{}:{}{WS_PATH}?username={username}", self.host, self.port)
    }

    /// Throttle interval in whole milliseconds, sent as the outbound `delta`.
    #[must_use]
    pub fn throttle_ms(&self) -> u64 {
        u64::try_from(self.throttle_interval.as_millis()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn display(&self) -> DisplayConfig {
        DisplayConfig::new(self.viewport, self.proximity_radius)
    }
}
