use crate::domain::{DestinationForm, Region};
use crate::sender::ClientConfig;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Output format of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Send the rows of a CSV or Excel file to New Relic as custom events",
    long_about = None
)]
pub struct Config {
    /// CSV (.csv) or Excel (.xlsx, .xls) file to upload
    pub file: PathBuf,

    /// Declared media type of the file; detected from the extension when omitted
    #[arg(long)]
    pub media_type: Option<String>,

    /// New Relic region (US or EU)
    #[arg(long, env = "NEW_RELIC_REGION", value_enum, ignore_case = true)]
    pub region: Option<Region>,

    /// New Relic account ID
    #[arg(long, env = "NEW_RELIC_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Insights insert API key
    #[arg(long, env = "NEW_RELIC_INSERT_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Event type name the rows are recorded under
    #[arg(long, env = "NEW_RELIC_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Show the preview and stop without sending
    #[arg(long)]
    pub preview_only: bool,

    /// Print only the row and column counts instead of the preview table
    #[arg(long)]
    pub hide_preview: bool,

    /// Whole-request timeout in seconds (transport default when omitted)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, env = "CONNECTION_TIMEOUT_SECS", default_value = "10")]
    pub connection_timeout_secs: u64,

    /// Gzip request bodies
    #[arg(long, env = "ENABLE_COMPRESSION")]
    pub enable_compression: bool,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    /// TOML file with destination settings
    #[arg(long, env = "FEEDRELIC_CONFIG")]
    pub config_file: Option<PathBuf>,
}

/// Settings accepted from `--config-file`. Command line and environment
/// values take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub region: Option<Region>,
    pub account_id: Option<String>,
    pub api_key: Option<String>,
    pub event_name: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connection_timeout_secs: Option<u64>,
    pub enable_compression: Option<bool>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::try_parse_from(args)?;
        if let Some(path) = config.config_file.clone() {
            config.merge_file(FileConfig::from_file(path)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Fill settings not given on the command line from a config file.
    pub fn merge_file(&mut self, file: FileConfig) {
        fill(&mut self.region, file.region);
        fill(&mut self.account_id, file.account_id);
        fill(&mut self.api_key, file.api_key);
        fill(&mut self.event_name, file.event_name);
        fill(&mut self.request_timeout_secs, file.request_timeout_secs);
        fill(&mut self.user_agent, file.user_agent);

        if let Some(secs) = file.connection_timeout_secs
            && self.connection_timeout_secs == default_connection_timeout_secs()
        {
            self.connection_timeout_secs = secs;
        }
        if !self.enable_compression {
            self.enable_compression = file.enable_compression.unwrap_or(false);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Connection timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The destination form as filled from the command line, environment and
    /// config file. Blank required fields are left for the form to reject.
    pub fn destination_form(&self) -> DestinationForm {
        let mut form = DestinationForm::new();
        form.set_region(self.region.unwrap_or_default())
            .set_account_id(self.account_id.clone().unwrap_or_default())
            .set_api_key(self.api_key.clone().unwrap_or_default())
            .set_event_name(self.event_name.clone().unwrap_or_default());
        form
    }

    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            enable_compression: self.enable_compression,
        }
    }
}

fn default_connection_timeout_secs() -> u64 {
    10
}

fn fill<T>(target: &mut Option<T>, fallback: Option<T>) {
    if target.is_none() {
        *target = fallback;
    }
}
