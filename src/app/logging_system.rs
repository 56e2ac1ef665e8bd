use super::config::{LogFormat, LogLevel};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },
    #[error("Failed to create log filter from '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("Failed to set global tracing subscriber: {0}")]
    AlreadyInitialized(String),
}

/// Builds the tracing filter and installs the global subscriber.
pub struct LoggingSystem {
    directives: Arc<RwLock<Vec<String>>>,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a `target=level` directive. Malformed directives are rejected.
    pub fn add_directive(&self, directive: &str) -> Result<(), LoggingError> {
        let parsed = directive
            .parse::<Directive>()
            .map_err(|e| LoggingError::InvalidDirective {
                directive: directive.to_string(),
                reason: e.to_string(),
            })?;
        self.directives.write().push(parsed.to_string());
        Ok(())
    }

    /// Quiet the HTTP stack below `warn`.
    pub fn add_default_directives(&self) -> Result<(), LoggingError> {
        for target in ["hyper", "hyper_util", "reqwest", "h2", "rustls"] {
            self.add_directive(&format!("{target}=warn"))?;
        }
        Ok(())
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();

        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        filter_parts.push(default_level.as_str().to_string());
        filter_parts.extend(directives.iter().cloned());
        filter_parts.join(",")
    }

    /// `RUST_LOG`, when set, replaces the built filter entirely.
    fn env_filter(&self, default_level: LogLevel) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = std::env::var(EnvFilter::DEFAULT_ENV)
            && !filter.trim().is_empty()
        {
            return EnvFilter::try_new(&filter).map_err(|e| LoggingError::InvalidFilter {
                filter,
                reason: e.to_string(),
            });
        }

        let filter = self.build_filter_string(default_level);
        EnvFilter::try_new(&filter).map_err(|e| LoggingError::InvalidFilter {
            filter,
            reason: e.to_string(),
        })
    }

    pub fn initialize_tracing(
        &self,
        default_level: LogLevel,
        format: LogFormat,
    ) -> Result<(), LoggingError> {
        let env_filter = self.env_filter(default_level)?;
        let registry = tracing_subscriber::registry().with(env_filter);

        let result = match format {
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .compact(),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().with_writer(std::io::stderr).json())
                .try_init(),
        };

        result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Install logging with the default HTTP-stack directives.
pub fn setup_logging(level: LogLevel, format: LogFormat) -> Result<(), LoggingError> {
    let logging_system = LoggingSystem::new();
    logging_system.add_default_directives()?;
    logging_system.initialize_tracing(level, format)
}
