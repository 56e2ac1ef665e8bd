use crate::domain::{Event, Row, RowSet};

/// Rows per request sent to the collector.
pub const BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub max_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: BATCH_SIZE,
        }
    }
}

/// A contiguous slice of a row set, transmitted in one request.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    index: usize,
    offset: usize,
    rows: &'a [Row],
}

impl<'a> Batch<'a> {
    /// Zero-based position of this batch in the sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position of the first row of this batch in the row set.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wire events for this batch, built fresh on every call.
    pub fn events(&self, event_type: &'a str) -> Vec<Event<'a>> {
        self.rows
            .iter()
            .map(|row| Event::new(event_type, row))
            .collect()
    }
}

/// `ceil(total_rows / batch_size)`; zero for an empty row set.
pub fn batch_count(total_rows: usize, batch_size: usize) -> usize {
    total_rows.div_ceil(batch_size.max(1))
}

/// Split a row set into batches of `config.max_size` rows, in order. Only the
/// final batch may be shorter.
pub fn partition(rows: &RowSet, config: BatchConfig) -> Vec<Batch<'_>> {
    let size = config.max_size.max(1);
    rows.rows()
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * size,
            rows: chunk,
        })
        .collect()
}
