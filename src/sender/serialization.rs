use crate::domain::Event;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error during serialization: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Batch is empty")]
    EmptyBatch,
}

/// Serializes a batch of events as the collector's JSON array body.
#[derive(Debug, Clone, Default)]
pub struct EventSerializer;

impl EventSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize_json_array(&self, events: &[Event<'_>]) -> Result<Vec<u8>, SerializationError> {
        if events.is_empty() {
            return Err(SerializationError::EmptyBatch);
        }

        Ok(serde_json::to_vec(events)?)
    }

    pub fn serialize_compressed(&self, events: &[Event<'_>]) -> Result<Vec<u8>, SerializationError> {
        use flate2::{Compression, write::GzEncoder};

        let data = self.serialize_json_array(events)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&data)?;
        Ok(encoder.finish()?)
    }
}
