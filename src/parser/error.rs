use super::media::MediaType;
use thiserror::Error;

/// Failure to turn an upload into rows. Messages are shown to the user as-is.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(
        "Please upload a CSV or Excel file (accepted: {accepted}); got {found}",
        accepted = MediaType::accepted_extensions()
    )]
    UnsupportedMediaType { found: String },
    #[error("Please upload exactly one file ({0} were provided)")]
    TooManyFiles(usize),
    #[error("Error reading file")]
    ReadFailed(#[source] std::io::Error),
    #[error("Error parsing CSV: {0}")]
    Delimited(String),
    #[error("Error parsing Excel file: {0}")]
    Spreadsheet(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Delimited(err.to_string())
    }
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Spreadsheet(err.to_string())
    }
}
