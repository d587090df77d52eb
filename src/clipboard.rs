//! Row clipboard for row-level copy/paste, plus system clipboard access for
//! cell text and tab-separated ranges.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::rc::Rc;

use crate::row::{insert_after, CellRect, Row, Rows};

/// What the row clipboard holds. Copying one kind replaces the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPayload {
    Single(Row),
    Many(Vec<Row>),
}

/// Result of pasting copied rows into a grid
#[derive(Debug, Clone)]
pub struct RowPaste {
    pub rows: Rows,
    /// Index of the first inserted row
    pub inserted_at: usize,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct RowClipboard {
    payload: Option<RowPayload>,
}

impl RowClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_row(&mut self, row: &Row) {
        self.payload = Some(RowPayload::Single(row.clone()));
    }

    /// Copy several rows. Returns false (and keeps the old payload) when `rows` is empty.
    pub fn copy_rows(&mut self, rows: &[Rc<Row>]) -> bool {
        if rows.is_empty() {
            return false;
        }
        self.payload = Some(RowPayload::Many(
            rows.iter().map(|r| r.as_ref().clone()).collect(),
        ));
        true
    }

    pub fn payload(&self) -> Option<&RowPayload> {
        self.payload.as_ref()
    }

    /// Insert fresh copies of the clipboard rows right after `index`.
    pub fn paste_after(&self, rows: &[Rc<Row>], index: usize) -> Option<RowPaste> {
        let copies: Vec<Row> = match self.payload.as_ref()? {
            RowPayload::Single(row) => vec![Row::from_copied(row)],
            RowPayload::Many(many) => many.iter().map(Row::from_copied).collect(),
        };
        let count = copies.len();
        let inserted_at = (index + 1).min(rows.len());
        Some(RowPaste {
            rows: insert_after(rows, index, copies),
            inserted_at,
            count,
        })
    }
}

/// Text clipboard provided by the host environment
pub trait SystemClipboard {
    fn read_text(&mut self) -> Result<String>;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard backed by `arboard`. Opening the clipboard can fail in
/// headless sessions; every call then reports the clipboard as unavailable.
pub struct ArboardClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(cb) => Some(cb),
            Err(e) => {
                tracing::warn!("system clipboard unavailable: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Default for ArboardClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard for ArboardClipboard {
    fn read_text(&mut self) -> Result<String> {
        let cb = self
            .inner
            .as_mut()
            .ok_or_else(|| eyre!("Clipboard unavailable"))?;
        cb.get_text()
            .map_err(|e| eyre!("Failed to read clipboard: {}", e))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let cb = self
            .inner
            .as_mut()
            .ok_or_else(|| eyre!("Clipboard unavailable"))?;
        cb.set_text(text.to_string())
            .map_err(|e| eyre!("Failed to write clipboard: {}", e))
    }
}

/// In-process clipboard, used in tests and when no system clipboard is wanted
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

impl SystemClipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.text.clone().ok_or_else(|| eyre!("Clipboard is empty"))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

/// Serialize the cells of `rect` as tab-separated values, one line per row
pub fn encode_tsv(rows: &[Rc<Row>], rect: CellRect) -> String {
    rect.rows()
        .filter_map(|index| rows.get(index))
        .map(|row| {
            rect.fields()
                .map(|field| row.get(field))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse clipboard text into rows of cell values. Blank lines are dropped.
pub fn decode_tsv(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
