pub mod client;
pub mod sequencer;
pub mod serialization;
pub mod transmission;

pub use client::{ClientConfig, ClientError, ConnectionStats, HttpClient};
pub use sequencer::{
    BatchSequencer, Classification, Progress, SendOutcome, SequencerState, SkipReason,
    TransmissionSummary,
};
pub use serialization::{EventSerializer, SerializationError};
pub use transmission::{
    BatchTransmitter, BatchTransport, INSERT_KEY_HEADER, RequestTarget, TransmissionError,
    TransmissionResult,
};

/// Sequencer wired to the HTTP transmitter.
pub type EventSender = BatchSequencer<BatchTransmitter>;

impl EventSender {
    pub fn from_client_config(config: ClientConfig) -> Result<Self, ClientError> {
        let client = HttpClient::new(config)?;
        Ok(BatchSequencer::new(BatchTransmitter::new(client)))
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.transport().client.connection_stats()
    }
}
