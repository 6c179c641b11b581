//! Logging setup with optional file rotation
//!
//! Events go to stderr and, when a file path is configured, to a daily
//! rotated log file. `RUST_LOG` overrides the configured level.

use crate::config::LoggingConfig;
use crate::error::{LuxtronikError, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,

    /// Log to file
    pub file_path: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
            stderr: true,
            json: false,
        }
    }
}

impl LogConfig {
    /// Build from the `[logging]` section of the configuration
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: parse_level(&settings.level).unwrap_or(Level::INFO),
            file_path: settings.file.as_ref().map(PathBuf::from),
            stderr: true,
            json: settings.json_format,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// Parse a plain level name; directive strings like `luxtronik_ws=debug`
/// return `None` and are left to `EnvFilter`.
pub fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stderr {
        let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
        layers.push(if config.json {
            layer.json().boxed()
        } else {
            layer.with_ansi(true).boxed()
        });
    }

    if let Some(file_path) = &config.file_path {
        let (directory, file_name) = split_log_path(file_path);
        std::fs::create_dir_all(&directory)?;

        let file_appender = tracing_appender::rolling::daily(directory, file_name);
        let layer = fmt::layer().with_writer(file_appender).with_ansi(false);
        layers.push(if config.json {
            layer.json().boxed()
        } else {
            layer.boxed()
        });
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(env_filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LuxtronikError::config(format!("Logging already initialised: {e}")))
}

fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("luxtronik-ws.log"));
    (directory, file_name)
}
