pub mod config;
pub mod logging_system;
pub mod notify;
pub mod preview;
pub mod session;

pub use config::{Config, ConfigError, FileConfig, LogFormat, LogLevel};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};
pub use notify::{ConsoleNotifier, MemoryNotifier, Notification, NotificationLevel, Notifier};
pub use preview::{PREVIEW_ROWS, Preview, PreviewPanel};
pub use session::{Session, SessionError};

use crate::sender::{BatchTransmitter, ClientError, EventSender, SendOutcome, SkipReason};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One run of the command line tool: save the destination, upload the file,
/// show the preview, then send.
pub struct App {
    config: Config,
    session: Session<BatchTransmitter>,
}

impl App {
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        Self::with_notifier(config, Arc::new(ConsoleNotifier))
    }

    pub fn with_notifier(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self, ClientError> {
        let sender = EventSender::from_client_config(config.client_config())?;
        let session = Session::new(sender, notifier);
        if config.hide_preview {
            session.toggle_preview();
        }
        Ok(Self { config, session })
    }

    pub fn session(&self) -> &Session<BatchTransmitter> {
        &self.session
    }

    pub async fn run(&self) -> ExitCode {
        if self
            .session
            .save_configuration(&self.config.destination_form())
            .is_err()
        {
            return ExitCode::from(2);
        }

        if self
            .session
            .upload_path(&self.config.file, self.config.media_type.clone())
            .await
            .is_err()
        {
            return ExitCode::FAILURE;
        }

        if let Some(preview) = self.session.render_preview() {
            if let Err(e) = write!(std::io::stdout().lock(), "{preview}") {
                debug!("Failed to write preview to stdout: {}", e);
            }
        }

        if self.config.preview_only {
            info!("Preview only; nothing sent");
            return ExitCode::SUCCESS;
        }

        let outcome = self
            .session
            .send(|progress| {
                debug!(
                    completed = progress.completed_batches,
                    total = progress.total_batches,
                    "Batch finished"
                );
                eprintln!("Sending Data ({}%)", progress.percent);
            })
            .await;

        let stats = self.session.sequencer().connection_stats();
        info!(
            requests = stats.total_requests,
            failed = stats.failed_requests,
            average_ms = stats.average_response_time.as_millis() as u64,
            "Transmission finished"
        );

        // An empty file has nothing to deliver and is not a failure.
        if outcome.is_success() || outcome == SendOutcome::Skipped(SkipReason::NothingToSend) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<ExitCode> {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    setup_logging(config.log_level, config.log_format)?;
    info!("Starting feedrelic v{}", get_version());

    let app = match App::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    Ok(app.run().await)
}
