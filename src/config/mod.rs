//! Configuration management for the Luxtronik client

use crate::error::{LuxtronikError, Result};
use serde::{Deserialize, Serialize};
use std::{env, fmt, path::Path, time::Duration};
use url::Url;

/// Default WebSocket port of the Luxtronik web interface
pub const DEFAULT_PORT: &str = "8214";

/// WebSocket subprotocol spoken by the controller
pub const SUBPROTOCOL: &str = "Lux_WS";

/// Login parameters for one heat pump
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Hostname or IP address of the controller
    pub host: String,

    /// WebSocket port, kept as text the way users enter it
    #[serde(default = "default_port")]
    pub port: String,

    /// Web interface password
    #[serde(default)]
    pub password: String,
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

impl ConnectionParams {
    pub fn new<H, P, W>(host: H, port: P, password: W) -> Self
    where
        H: Into<String>,
        P: Into<String>,
        W: Into<String>,
    {
        Self {
            host: host.into(),
            port: port.into(),
            password: password.into(),
        }
    }

    /// `ws://{host}:{port}`
    pub fn ws_url(&self) -> Result<Url> {
        let url = format!("ws://{}:{}", self.host, self.port);
        Url::parse(&url).map_err(|e| LuxtronikError::config(format!("Invalid address {url}: {e}")))
    }

    /// Validate host and port
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(LuxtronikError::config("Host cannot be empty"));
        }

        match self.port.parse::<u16>() {
            Ok(0) | Err(_) => {
                return Err(LuxtronikError::config(format!(
                    "Invalid port '{}': expected 1-65535",
                    self.port
                )))
            }
            Ok(_) => {}
        }

        self.ws_url().map(|_| ())
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            password: String::new(),
        }
    }
}

// The password never shows up in logs.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"***")
            .finish()
    }
}

/// Transport timeouts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// TCP connect plus WebSocket handshake
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Each request/reply round trip
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Polling coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Minimum time between two snapshot fetches
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable structured JSON logging
    pub json_format: bool,

    /// Log to file (path)
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LuxtronikConfig {
    pub connection: ConnectionParams,
    pub client: ClientConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

impl LuxtronikConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LuxtronikError::config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LuxtronikError::config(format!("Invalid TOML: {e}")))
    }

    /// Override fields from `LUXTRONIK_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("LUXTRONIK_HOST") {
            self.connection.host = host;
        }

        if let Ok(port) = env::var("LUXTRONIK_PORT") {
            self.connection.port = port;
        }

        if let Ok(password) = env::var("LUXTRONIK_PASSWORD") {
            self.connection.password = password;
        }

        if let Ok(timeout) = env::var("LUXTRONIK_TIMEOUT") {
            let secs = parse_seconds("LUXTRONIK_TIMEOUT", &timeout)?;
            self.client.connect_timeout = secs;
            self.client.request_timeout = secs;
        }

        if let Ok(interval) = env::var("LUXTRONIK_POLL_INTERVAL") {
            self.polling.interval = parse_seconds("LUXTRONIK_POLL_INTERVAL", &interval)?;
        }

        if let Ok(level) = env::var("RUST_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;

        if self.client.connect_timeout.is_zero() || self.client.request_timeout.is_zero() {
            return Err(LuxtronikError::config("Timeouts must be greater than zero"));
        }

        if self.polling.interval.is_zero() {
            return Err(LuxtronikError::config("Polling interval must be greater than zero"));
        }

        Ok(())
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| LuxtronikError::config(format!("Invalid {name}: {e}")))
}
