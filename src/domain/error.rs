use thiserror::Error;

/// Rejection raised when a destination form is confirmed with blank fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),
}
