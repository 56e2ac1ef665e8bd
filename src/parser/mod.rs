//! Tabular file parsing.
//!
//! An [`UploadedFile`] carries the raw bytes of one file plus its declared
//! media type. [`ParserRegistry`] resolves the media type, rejects anything
//! outside the accepted set before parsing, and dispatches to the parser
//! registered for the file's [`FileFormat`].

pub mod delimited;
pub mod error;
pub mod headers;
pub mod media;
pub mod spreadsheet;

pub use delimited::DelimitedParser;
pub use error::ParseError;
pub use media::{FileFormat, MediaType};
pub use spreadsheet::SpreadsheetParser;

use crate::domain::RowSet;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A parser for one tabular format.
pub trait TabularParser: Send + Sync {
    fn format(&self) -> FileFormat;

    fn parse(&self, contents: &[u8]) -> Result<RowSet, ParseError>;
}

/// One file handed over by the upload surface.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub declared_type: Option<String>,
    pub contents: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        declared_type: Option<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type,
            contents: contents.into(),
        }
    }

    /// Read a file from disk. The read is the suspension point of an upload.
    pub async fn read(path: &Path, declared_type: Option<String>) -> Result<Self, ParseError> {
        let contents = tokio::fs::read(path).await.map_err(ParseError::ReadFailed)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, declared_type, contents))
    }

    pub fn media_type(&self) -> Result<MediaType, ParseError> {
        MediaType::resolve(self.declared_type.as_deref(), &self.name)
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub file_name: String,
    pub format: FileFormat,
    pub rows: RowSet,
}

/// Format to parser mapping.
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: HashMap<FileFormat, Arc<dyn TabularParser>>,
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registry with the CSV and Excel parsers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(DelimitedParser::new());
        registry.register(SpreadsheetParser::new());
        registry
    }

    pub fn register<P: TabularParser + 'static>(&mut self, parser: P) {
        let format = parser.format();
        debug!(format = %format, "Registered tabular parser");
        self.parsers.insert(format, Arc::new(parser));
    }

    pub fn supports(&self, format: FileFormat) -> bool {
        self.parsers.contains_key(&format)
    }

    pub fn parse(&self, upload: &UploadedFile) -> Result<ParsedFile, ParseError> {
        let media_type = upload.media_type()?;
        let format = media_type.format();
        let parser = self
            .parsers
            .get(&format)
            .ok_or_else(|| ParseError::UnsupportedMediaType {
                found: media_type.to_string(),
            })?;

        let rows = parser.parse(&upload.contents)?;
        info!(
            file = %upload.name,
            format = %format,
            rows = rows.len(),
            columns = rows.columns().len(),
            "Parsed upload"
        );

        Ok(ParsedFile {
            file_name: upload.name.clone(),
            format,
            rows,
        })
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("formats", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}
