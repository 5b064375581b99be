//! Configuration management for docquery
//!
//! Configuration is read from a TOML file and then adjusted by environment
//! variables. Command-line arguments are applied on top by the CLI.
//!
//! Precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables (`DOCQUERY_*`)
//! 3. Configuration file
//! 4. Default values
//!
//! ```toml
//! [defaults]
//! database = "shop"
//! collection = "orders"
//!
//! [display]
//! format = "json"
//! color_output = false
//!
//! [logging]
//! level = "debug"
//! timestamps = false
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::query::Namespace;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Namespace used when a script does not name one
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Output configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,
}

/// Display and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (json, json-pretty)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Single-line JSON, e.g. `{"type":"find","query":{}}`
    Json,

    /// Indented multi-line JSON
    JsonPretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_database() -> String {
    "test".to_string()
}

fn default_collection() -> String {
    "test".to_string()
}

fn default_format() -> OutputFormat {
    OutputFormat::JsonPretty
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            collection: default_collection(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from the explicit path, else from the default
    /// path if that file exists, else defaults. Environment overrides are
    /// applied and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No configuration file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse one TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// `~/.docquery/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docquery")
            .join("config.toml")
    }

    /// Apply `DOCQUERY_DATABASE`, `DOCQUERY_COLLECTION`, `DOCQUERY_FORMAT`
    /// and `DOCQUERY_LOG_LEVEL`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(database) = lookup("DOCQUERY_DATABASE") {
            self.defaults.database = database;
        }
        if let Some(collection) = lookup("DOCQUERY_COLLECTION") {
            self.defaults.collection = collection;
        }
        if let Some(format) = lookup("DOCQUERY_FORMAT") {
            self.display.format = format.parse()?;
        }
        if let Some(level) = lookup("DOCQUERY_LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_database_name("defaults.database", &self.defaults.database)?;
        validate_collection_name("defaults.collection", &self.defaults.collection)?;
        Ok(())
    }

    pub fn default_namespace(&self) -> Namespace {
        Namespace::new(&self.defaults.database, &self.defaults.collection)
    }
}

/// Database names must be non-empty and free of `.`.
pub fn validate_database_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('.') {
        return Err(invalid_value(field, name).into());
    }
    Ok(())
}

/// Collection names must be non-empty and free of `$`.
pub fn validate_collection_name(field: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('$') {
        return Err(invalid_value(field, name).into());
    }
    Ok(())
}

fn invalid_value(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl OutputFormat {
    pub fn is_pretty(&self) -> bool {
        matches!(self, OutputFormat::JsonPretty)
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "compact" => Ok(OutputFormat::Json),
            "json-pretty" | "pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(ConfigError::InvalidValue {
                field: "display.format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonPretty => write!(f, "json-pretty"),
        }
    }
}
