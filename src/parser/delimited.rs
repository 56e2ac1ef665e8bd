//! Comma-separated text: first line is the header, blank lines are skipped.

use super::headers::unique_headers;
use super::{FileFormat, ParseError, TabularParser};
use crate::domain::{CellValue, Row, RowSet};
use csv::ReaderBuilder;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DelimitedParser {
    delimiter: Option<u8>,
}

impl DelimitedParser {
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }
}

impl TabularParser for DelimitedParser {
    fn format(&self) -> FileFormat {
        FileFormat::Delimited
    }

    fn parse(&self, contents: &[u8]) -> Result<RowSet, ParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter.unwrap_or(b','))
            .from_reader(contents);

        let headers = unique_headers(reader.headers()?.iter());
        let mut rows = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                debug!(
                    "Ignoring {} extra field(s) on data line {}",
                    record.len() - headers.len(),
                    index + 1
                );
            }

            // Short records keep only the columns they actually have.
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.as_str(), CellValue::from(value)))
                .collect();
            rows.push(row);
        }

        Ok(RowSet::new(rows))
    }
}
