use super::serialization::{EventSerializer, SerializationError};
use super::{ClientError, HttpClient};
use crate::buffer::Batch;
use crate::domain::Destination;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Credential header understood by the Insights insert API.
pub const INSERT_KEY_HEADER: &str = "x-insert-key";

/// Longest response body kept for logging a rejected batch.
const MAX_ERROR_BODY: usize = 1024;

#[derive(Error, Debug)]
pub enum TransmissionError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] SerializationError),
    #[error("Client error: {0}")]
    ClientError(#[from] ClientError),
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
}

/// Outcome of one request that got an HTTP response.
#[derive(Debug, Clone)]
pub struct TransmissionResult {
    pub success: bool,
    pub status_code: u16,
    pub latency: Duration,
    pub batch_index: usize,
    pub bytes_sent: usize,
    pub compressed: bool,
    /// Body of a rejected request, truncated.
    pub error_body: Option<String>,
}

/// Everything a request needs from the destination, validated once before the
/// first batch.
#[derive(Debug, Clone)]
pub struct RequestTarget {
    pub url: Url,
    pub headers: HeaderMap,
    pub event_type: String,
}

impl RequestTarget {
    pub fn new(destination: &Destination) -> Result<Self, TransmissionError> {
        let url = Url::parse(destination.endpoint_url()).map_err(|source| {
            TransmissionError::InvalidEndpoint {
                url: destination.endpoint_url().to_string(),
                source,
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut api_key = HeaderValue::from_str(destination.api_key()).map_err(|e| {
            TransmissionError::InvalidHeaderValue(format!("Invalid API key: {e}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static(INSERT_KEY_HEADER), api_key);

        Ok(Self {
            url,
            headers,
            event_type: destination.event_name().to_string(),
        })
    }
}

/// Delivers one batch. `Ok` means an HTTP response came back (accepted or
/// not); `Err` is a request-level failure.
pub trait BatchTransport: Send + Sync {
    fn send_batch(
        &self,
        target: &RequestTarget,
        batch: &Batch<'_>,
    ) -> impl Future<Output = Result<TransmissionResult, TransmissionError>> + Send;
}

#[derive(Debug, Clone)]
pub struct BatchTransmitter {
    pub client: HttpClient,
    serializer: EventSerializer,
}

impl BatchTransmitter {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            serializer: EventSerializer::new(),
        }
    }

    pub fn prepare_payload(
        &self,
        target: &RequestTarget,
        batch: &Batch<'_>,
    ) -> Result<Vec<u8>, SerializationError> {
        let events = batch.events(&target.event_type);
        if self.client.config.enable_compression {
            self.serializer.serialize_compressed(&events)
        } else {
            self.serializer.serialize_json_array(&events)
        }
    }

    pub fn build_headers(&self, target: &RequestTarget) -> HeaderMap {
        let mut headers = target.headers.clone();
        if self.client.config.enable_compression {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }
        headers
    }
}

impl BatchTransport for BatchTransmitter {
    async fn send_batch(
        &self,
        target: &RequestTarget,
        batch: &Batch<'_>,
    ) -> Result<TransmissionResult, TransmissionError> {
        let start = Instant::now();
        debug!(
            "Sending batch {} with {} events to {}",
            batch.index(),
            batch.size(),
            target.url
        );

        let payload = self.prepare_payload(target, batch)?;
        let bytes_sent = payload.len();

        let sent = self
            .client
            .client
            .post(target.url.clone())
            .headers(self.build_headers(target))
            .body(payload)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                self.client.stats.record_request(false, start.elapsed());
                return Err(e.into());
            }
        };

        let latency = start.elapsed();
        let status = response.status();
        let success = status.is_success();
        self.client.stats.record_request(success, latency);

        let error_body = if success {
            info!(
                "Sent batch {} ({} events, {} bytes) in {:?}",
                batch.index(),
                batch.size(),
                bytes_sent,
                latency
            );
            None
        } else {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            warn!(
                "Collector rejected batch {}: HTTP {} {}",
                batch.index(),
                status.as_u16(),
                body
            );
            Some(body)
        };

        Ok(TransmissionResult {
            success,
            status_code: status.as_u16(),
            latency,
            batch_index: batch.index(),
            bytes_sent,
            compressed: self.client.config.enable_compression,
            error_body,
        })
    }
}
