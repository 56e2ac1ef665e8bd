use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar cell value as produced by the tabular parsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Integer(value) => write!(f, "{value}"),
            // Whole floats print without a trailing ".0", like spreadsheet output.
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One record: column name to value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Full parsed content of one uploaded file. Immutable once built.
///
/// Rows nominally share the column set of row 0. Rows with missing keys are
/// kept as they are; consumers treat absent keys as empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers taken from the first row's keys.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_come_from_first_row_in_order() {
        let rows = RowSet::new(vec![
            Row::from_iter([("name", "a"), ("city", "b"), ("age", "1")]),
            Row::from_iter([("other", "x")]),
        ]);
        assert_eq!(rows.columns(), vec!["name", "city", "age"]);
    }

    #[test]
    fn empty_rowset_has_no_columns() {
        assert!(RowSet::default().columns().is_empty());
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn row_serializes_as_flat_object() {
        let mut row = Row::new();
        row.insert("name", "Ada");
        row.insert("score", 9.5);
        row.insert("active", true);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"name":"Ada","score":9.5,"active":true}"#);
    }
}
