use super::row::Row;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Wire key carrying the configured event type.
pub const EVENT_TYPE_KEY: &str = "eventType";

/// A row tagged with its event type; the unit the collector records.
///
/// Serializes as a flat object with `eventType` first. A row column that is
/// itself named `eventType` is dropped so the configured name always wins.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    event_type: &'a str,
    row: &'a Row,
}

impl<'a> Event<'a> {
    pub fn new(event_type: &'a str, row: &'a Row) -> Self {
        Self { event_type, row }
    }

    pub fn event_type(&self) -> &str {
        self.event_type
    }

    pub fn row(&self) -> &Row {
        self.row
    }
}

// Unlike a plain object spread, the row cannot override the configured event type.
impl Serialize for Event<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = self
            .row
            .iter()
            .filter(|(column, _)| *column != EVENT_TYPE_KEY);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(EVENT_TYPE_KEY, self.event_type)?;
        for (column, value) in fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;

    #[test]
    fn event_type_comes_first() {
        let row = Row::from_iter([("name", CellValue::from("Ada")), ("age", CellValue::from(36_i64))]);
        let json = serde_json::to_string(&Event::new("Person", &row)).unwrap();
        assert_eq!(json, r#"{"eventType":"Person","name":"Ada","age":36}"#);
    }

    #[test]
    fn configured_event_type_overrides_row_column() {
        let row = Row::from_iter([("eventType", "FromFile"), ("id", "7")]);
        let value = serde_json::to_value(Event::new("Configured", &row)).unwrap();
        assert_eq!(value["eventType"], "Configured");
        assert_eq!(value["id"], "7");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
