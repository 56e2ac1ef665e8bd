use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub connection_timeout: Duration,
    pub user_agent: String,
    /// Gzip request bodies.
    pub enable_compression: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("feedrelic/{}", env!("CARGO_PKG_VERSION")),
            enable_compression: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: Client,
    pub config: ClientConfig,
    pub stats: Arc<ClientStats>,
}

#[derive(Debug, Default)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ClientError::InvalidConfiguration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        let mut client_builder = ClientBuilder::new()
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().map_err(|e| {
            ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(ClientStats::default()),
        })
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        let total_requests = self.stats.total_requests.load(Ordering::Relaxed);
        let successful_requests = self.stats.successful_requests.load(Ordering::Relaxed);
        let failed_requests = self.stats.failed_requests.load(Ordering::Relaxed);
        let total_response_time = self.stats.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests,
            failed_requests,
            average_response_time,
        }
    }
}
