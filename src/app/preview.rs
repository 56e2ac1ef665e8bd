//! Read-only projection of the first rows of an upload.

use crate::domain::RowSet;
use std::fmt::Write;

/// Rows shown in a preview.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    file_name: String,
    headers: Vec<String>,
    cells: Vec<Vec<String>>,
    total_rows: usize,
}

impl Preview {
    /// Build the projection. `None` for an empty row set, which has nothing to
    /// show.
    pub fn new(file_name: &str, rows: &RowSet) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let headers: Vec<String> = rows.columns().into_iter().map(str::to_string).collect();
        let cells = rows
            .rows()
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                headers
                    .iter()
                    .map(|column| row.get(column).map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();

        Some(Self {
            file_name: file_name.to_string(),
            headers,
            cells,
            total_rows: rows.len(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rendered cells, at most [`PREVIEW_ROWS`] rows. Missing keys are empty.
    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// "7 rows • 3 columns"
    pub fn counts(&self) -> String {
        format!(
            "{} • {}",
            plural(self.total_rows, "row"),
            plural(self.column_count(), "column")
        )
    }

    /// "data.csv • 7 rows • 3 columns"
    pub fn summary(&self) -> String {
        format!("{} • {}", self.file_name, self.counts())
    }

    /// "Showing 5 of 7 rows" when rows were left out.
    pub fn footer(&self) -> Option<String> {
        (self.total_rows > self.cells.len())
            .then(|| format!("Showing {} of {} rows", self.cells.len(), self.total_rows))
    }

    pub fn render_table(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &self.cells {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Show/hide state of the preview. Toggling never touches the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewPanel {
    visible: bool,
}

impl PreviewPanel {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, preview: &Preview) -> String {
        let mut out = format!("{}\n", preview.summary());
        if self.visible {
            out.push_str(&preview.render_table());
            if let Some(footer) = preview.footer() {
                out.push_str(&footer);
                out.push('\n');
            }
        }
        out
    }
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self::new(true)
    }
}
