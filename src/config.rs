//! Configuration for ssdbkv
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SsdbError};

/// Main configuration for a client (single connection or pool)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Address
    // -------------------------------------------------------------------------
    /// Server hostname or IP
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeouts (milliseconds, 0 = wait forever)
    // -------------------------------------------------------------------------
    pub connect_timeout_ms: u64,

    /// Read timeout applied to every blocking socket read
    pub read_timeout_ms: u64,

    /// Write timeout applied to every blocking socket write
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Number of connections held by a `Connector`
    #[serde(alias = "maxconn")]
    pub max_connections: usize,

    /// Size of the scratch area used for each socket read (in bytes)
    pub read_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 10_000,
            write_timeout_ms: 10_000,
            max_connections: 1,
            read_buffer_size: 8 * 1024, // 8 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a config from JSON; missing fields take their defaults
    ///
    /// Also accepts the short keys `maxconn` and `timeout`. `timeout` is in
    /// whole seconds and replaces all three `*_timeout_ms` values.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;

        let mut config = file.config;
        if let Some(secs) = file.timeout {
            let ms = secs.checked_mul(1000).ok_or_else(|| {
                SsdbError::Config(format!("timeout of {} seconds is too large", secs))
            })?;
            config.connect_timeout_ms = ms;
            config.read_timeout_ms = ms;
            config.write_timeout_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }

    /// `host:port` form used for resolution and logging
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SsdbError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(SsdbError::Config("port must not be 0".to_string()));
        }
        if self.max_connections == 0 {
            return Err(SsdbError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(SsdbError::Config(
                "read_buffer_size must not be 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

/// On-disk form of `Config`
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    config: Config,

    /// Shared timeout in seconds
    timeout: Option<u64>,
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set all three timeouts at once (in milliseconds)
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.connect_timeout_ms(ms)
            .read_timeout_ms(ms)
            .write_timeout_ms(ms)
    }

    /// Set the number of pooled connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the scratch read size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
