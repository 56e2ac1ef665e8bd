//! Excel workbooks (.xlsx / .xls). Only the first sheet is read and its first
//! row is the header.

use super::headers::unique_headers;
use super::{FileFormat, ParseError, TabularParser};
use crate::domain::{CellValue, Row, RowSet};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

/// Largest float that still maps to a unique integer (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Default)]
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    pub fn new() -> Self {
        Self
    }
}

impl TabularParser for SpreadsheetParser {
    fn format(&self) -> FileFormat {
        FileFormat::Spreadsheet
    }

    fn parse(&self, contents: &[u8]) -> Result<RowSet, ParseError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(contents.to_vec()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ParseError::Spreadsheet("Workbook contains no sheets".to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ParseError::Spreadsheet("Workbook contains no sheets".to_string()))??;

        let mut lines = range.rows();
        let Some(header_cells) = lines.next() else {
            debug!("Sheet '{}' is empty", sheet_name);
            return Ok(RowSet::default());
        };

        let headers = unique_headers(header_cells.iter().map(header_text));
        let mut rows = Vec::new();

        for cells in lines {
            let row: Row = headers
                .iter()
                .zip(cells.iter())
                .filter_map(|(column, cell)| cell_value(cell).map(|value| (column.as_str(), value)))
                .collect();

            // Fully blank lines are not records.
            if !row.is_empty() {
                rows.push(row);
            }
        }

        debug!("Read {} rows from sheet '{}'", rows.len(), sheet_name);
        Ok(RowSet::new(rows))
    }
}

fn header_text(cell: &Data) -> String {
    cell_value(cell).map(|value| value.to_string()).unwrap_or_default()
}

/// Workbooks store every number as a float; whole ones go out as integers.
fn is_whole(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER
}

/// Cell to row value. Empty and error cells yield `None` and are left out of
/// the row; dates become their serial number.
fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => Some(CellValue::Text(text.clone())),
        Data::Int(value) => Some(CellValue::Integer(*value)),
        Data::Float(value) if is_whole(*value) => Some(CellValue::Integer(*value as i64)),
        Data::Float(value) => Some(CellValue::Number(*value)),
        Data::Bool(value) => Some(CellValue::Bool(*value)),
        Data::DateTime(value) => Some(CellValue::Number(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(CellValue::Text(text.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_map_to_values() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(
            cell_value(&Data::String("x".to_string())),
            Some(CellValue::from("x"))
        );
        assert_eq!(cell_value(&Data::Float(2.5)), Some(CellValue::Number(2.5)));
        assert_eq!(cell_value(&Data::Int(3)), Some(CellValue::Integer(3)));
        assert_eq!(cell_value(&Data::Bool(false)), Some(CellValue::Bool(false)));
    }

    #[test]
    fn whole_floats_become_integers() {
        assert_eq!(cell_value(&Data::Float(12.0)), Some(CellValue::Integer(12)));
        assert_eq!(cell_value(&Data::Float(-3.0)), Some(CellValue::Integer(-3)));
        assert_eq!(cell_value(&Data::Float(1e20)), Some(CellValue::Number(1e20)));

        let json = serde_json::to_string(&cell_value(&Data::Float(12.0))).unwrap();
        assert_eq!(json, "12");
    }

    #[test]
    fn numeric_header_is_rendered_as_text() {
        assert_eq!(header_text(&Data::Float(2024.0)), "2024");
        assert_eq!(header_text(&Data::Empty), "");
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = SpreadsheetParser::new()
            .parse(b"definitely not a workbook")
            .unwrap_err();
        assert!(err.to_string().starts_with("Error parsing Excel file:"));
    }
}
