use crate::error::{Result, TetherError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration read from `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetherConfig {
    /// Relay this installation reports as
    #[serde(default)]
    pub relay_id: Option<String>,

    /// Base URL of the status service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token sent with heartbeats
    #[serde(default)]
    pub api_token: Option<String>,

    /// Heartbeat timing
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Platform name to status reported in each heartbeat
    #[serde(default)]
    pub platforms: BTreeMap<String, String>,

    /// How long `daemon stop` waits for the process to exit (in seconds)
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,
}

/// Heartbeat loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Delay between heartbeats (in seconds)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Per-request timeout for the HTTP client (in seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Default value functions for serde
fn default_endpoint() -> String {
    "https://api.tether.dev".to_string()
}

fn default_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

fn default_stop_timeout() -> u64 {
    10
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl HeartbeatConfig {
    /// Get heartbeat interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            relay_id: None,
            endpoint: default_endpoint(),
            api_token: None,
            heartbeat: HeartbeatConfig::default(),
            platforms: BTreeMap::new(),
            stop_timeout_secs: default_stop_timeout(),
        }
    }
}

impl TetherConfig {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| TetherError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::parse(&contents)?;
        config.expand_env_vars();
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML configuration
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| TetherError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(TetherError::InvalidConfig(
                "endpoint must not be empty".to_string(),
            ));
        }

        if self.heartbeat.interval_secs == 0 {
            return Err(TetherError::InvalidConfig(
                "heartbeat.interval_secs must be at least 1".to_string(),
            ));
        }

        if self.heartbeat.request_timeout_secs == 0 {
            return Err(TetherError::InvalidConfig(
                "heartbeat.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        if let Some(ref relay_id) = self.relay_id {
            if relay_id.trim().is_empty() {
                return Err(TetherError::InvalidConfig(
                    "relay_id must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The configured relay id, required to run the daemon
    pub fn require_relay_id(&self) -> Result<&str> {
        self.relay_id.as_deref().ok_or_else(|| {
            TetherError::ConfigError("relay_id is not set in config.toml".to_string())
        })
    }

    /// Get stop timeout as Duration
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Expand `${VAR}` references in the endpoint and token
    fn expand_env_vars(&mut self) {
        self.endpoint = expand_env_in_string(&self.endpoint);
        self.api_token = self.api_token.as_deref().map(expand_env_in_string);
    }
}

/// Expand `${VAR}` references in a string
fn expand_env_in_string(s: &str) -> String {
    let mut result = s.to_string();
    for (key, value) in std::env::vars() {
        result = result.replace(&format!("${{{}}}", key), &value);
    }
    result
}
