//! Accepted upload media types.

use super::ParseError;
use std::fmt;
use std::path::Path;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

/// Media types the upload surface accepts, with their file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Csv,
    Xlsx,
    Xls,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Csv, MediaType::Xlsx, MediaType::Xls];

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Csv => CSV_MIME,
            MediaType::Xlsx => XLSX_MIME,
            MediaType::Xls => XLS_MIME,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Csv => "csv",
            MediaType::Xlsx => "xlsx",
            MediaType::Xls => "xls",
        }
    }

    pub fn format(&self) -> FileFormat {
        match self {
            MediaType::Csv => FileFormat::Delimited,
            MediaType::Xlsx | MediaType::Xls => FileFormat::Spreadsheet,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        // Drop parameters such as "; charset=utf-8".
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|media| media.mime().eq_ignore_ascii_case(essence))
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|media| media.extension().eq_ignore_ascii_case(extension))
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Resolve the media type of an upload. A declared type wins over the
    /// file extension; anything outside the accepted set is rejected.
    pub fn resolve(declared: Option<&str>, file_name: &str) -> Result<Self, ParseError> {
        let resolved = match declared {
            Some(mime) if !mime.trim().is_empty() => Self::from_mime(mime),
            _ => Self::from_file_name(file_name),
        };

        resolved.ok_or_else(|| ParseError::UnsupportedMediaType {
            found: declared
                .filter(|mime| !mime.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| file_name.to_string()),
        })
    }

    /// "`.csv, .xlsx, .xls`" as shown in rejection messages.
    pub fn accepted_extensions() -> String {
        Self::ALL
            .iter()
            .map(|media| format!(".{}", media.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Format tag reported alongside a parsed row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Delimited,
    Spreadsheet,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Delimited => "delimited",
            FileFormat::Spreadsheet => "spreadsheet",
        }
    }

    /// Label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            FileFormat::Delimited => "CSV",
            FileFormat::Spreadsheet => "Excel",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
