//! Configuration management for the CSQL client.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The engine endpoint is always an explicit value handed to the transport,
//! so tests can point it at an in-process fake engine.

use crate::error::{CsqlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// URL scheme accepted by [`EngineConfig::from_endpoint`].
pub const ENDPOINT_SCHEME: &str = "csql";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Engine endpoint and exchange limits.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Where the engine listens and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Engine host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Engine port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for one whole exchange (connect, write, receive), in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on the accumulated response size.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl EngineConfig {
    /// Creates a config for the given host and port with default limits.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Sets the exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the response size limit.
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Parses an endpoint URL.
    ///
    /// Format: `csql://host:port`. The port defaults to 9000.
    pub fn from_endpoint(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| CsqlError::config(format!("Invalid endpoint: {e}")))?;

        if url.scheme() != ENDPOINT_SCHEME {
            return Err(CsqlError::config(format!(
                "Invalid scheme '{}'. Expected '{ENDPOINT_SCHEME}'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CsqlError::config("Endpoint is missing a host"))?;
        let port = url.port().unwrap_or_else(default_port);

        Ok(Self::new(host, port))
    }

    /// The exchange deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `host:port` as passed to the socket layer.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Applies environment variables to fields still at their defaults.
    ///
    /// `CSQL_HOST` and `CSQL_PORT` take precedence over the host and port of
    /// `CSQL_ENDPOINT`; `CSQL_TIMEOUT_MS` sets the deadline.
    pub fn apply_env_defaults(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let endpoint = var("CSQL_ENDPOINT")
            .map(|e| Self::from_endpoint(&e))
            .transpose()?;

        if self.host == default_host() {
            if let Some(host) = var("CSQL_HOST").or_else(|| endpoint.as_ref().map(|e| e.host.clone())) {
                self.host = host;
            }
        }
        if self.port == default_port() {
            let port = var("CSQL_PORT")
                .and_then(|p| p.parse().ok())
                .or_else(|| endpoint.as_ref().map(|e| e.port));
            if let Some(port) = port {
                self.port = port;
            }
        }
        if self.timeout_ms == default_timeout_ms() {
            if let Some(ms) = var("CSQL_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
                self.timeout_ms = ms;
            }
        }
        Ok(())
    }

    /// Rejects values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CsqlError::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(CsqlError::config("port must not be zero"));
        }
        if self.timeout_ms == 0 {
            return Err(CsqlError::config("timeout_ms must be greater than zero"));
        }
        if self.max_response_bytes == 0 {
            return Err(CsqlError::config(
                "max_response_bytes must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns a display string for log and UI purposes.
    pub fn display_string(&self) -> String {
        format!("{ENDPOINT_SCHEME}://{} (timeout {}ms)", self.address(), self.timeout_ms)
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("csql")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CsqlError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CsqlError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
