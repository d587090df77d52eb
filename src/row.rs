//! Grid rows and the pure reducers that produce new row vectors.
//!
//! Rows are shared between history snapshots through `Rc`, so every reducer
//! clones the outer vector and only deep-copies the rows it touches
//! (`Rc::make_mut`).

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::rc::Rc;
use uuid::Uuid;

/// Row vector shared by the grid and its history snapshots
pub type Rows = Vec<Rc<Row>>;

/// Editable grid columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    BaseUrl,
    Source,
    Medium,
    Campaign,
    Term,
    Content,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::BaseUrl,
        Field::Source,
        Field::Medium,
        Field::Campaign,
        Field::Term,
        Field::Content,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Field> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::BaseUrl => "Base URL",
            Field::Source => "Source",
            Field::Medium => "Medium",
            Field::Campaign => "Campaign",
            Field::Term => "Term",
            Field::Content => "Content",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::BaseUrl => "https://example.com",
            Field::Source => "google",
            Field::Medium => "cpc",
            Field::Campaign => "spring_sale",
            Field::Term => "running shoes",
            Field::Content => "banner_ad",
        }
    }

    /// Column to the left, `None` at the first column
    pub fn left(self) -> Option<Field> {
        self.index().checked_sub(1).and_then(Field::from_index)
    }

    /// Column to the right, `None` at the last column
    pub fn right(self) -> Option<Field> {
        Field::from_index(self.index() + 1)
    }
}

/// One candidate tagged URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub selected: bool,
}

impl Row {
    /// Fresh row with a new id and every field empty
    pub fn new_empty() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            base_url: String::new(),
            source: String::new(),
            medium: String::new(),
            campaign: String::new(),
            term: String::new(),
            content: String::new(),
            selected: false,
        }
    }

    /// Copy of a clipboard row with its own identity; the checkbox is not carried over.
    pub fn from_copied(row: &Row) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            selected: false,
            ..row.clone()
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::BaseUrl => &self.base_url,
            Field::Source => &self.source,
            Field::Medium => &self.medium,
            Field::Campaign => &self.campaign,
            Field::Term => &self.term,
            Field::Content => &self.content,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::BaseUrl => &mut self.base_url,
            Field::Source => &mut self.source,
            Field::Medium => &mut self.medium,
            Field::Campaign => &mut self.campaign,
            Field::Term => &mut self.term,
            Field::Content => &mut self.content,
        };
        *slot = value;
    }
}

/// Grid coordinate of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "rowIndex")]
    pub row: usize,
    pub field: Field,
}

impl CellCoord {
    pub fn new(row: usize, field: Field) -> Self {
        Self { row, field }
    }
}

/// Normalised rectangle spanned by two cells (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub top: usize,
    pub bottom: usize,
    pub left: Field,
    pub right: Field,
}

impl CellRect {
    pub fn spanning(a: CellCoord, b: CellCoord) -> Self {
        let (left, right) = if a.field.index() <= b.field.index() {
            (a.field, b.field)
        } else {
            (b.field, a.field)
        };
        Self {
            top: a.row.min(b.row),
            bottom: a.row.max(b.row),
            left,
            right,
        }
    }

    pub fn single(cell: CellCoord) -> Self {
        Self::spanning(cell, cell)
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.top..=self.bottom
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> {
        Field::ALL[self.left.index()..=self.right.index()].iter().copied()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        self.rows().contains(&cell.row)
            && (self.left.index()..=self.right.index()).contains(&cell.field.index())
    }
}

/// `count` fresh empty rows (at least one)
pub fn default_rows(count: usize) -> Rows {
    (0..count.max(1)).map(|_| Rc::new(Row::new_empty())).collect()
}

/// Write `value` into one cell
pub fn set_field(rows: &[Rc<Row>], index: usize, field: Field, value: String) -> Rows {
    let mut next = rows.to_vec();
    if let Some(row) = next.get_mut(index) {
        if row.get(field) != value {
            Rc::make_mut(row).set(field, value);
        }
    }
    next
}

/// Append one empty row
pub fn with_row_added(rows: &[Rc<Row>]) -> Rows {
    let mut next = rows.to_vec();
    next.push(Rc::new(Row::new_empty()));
    next
}

/// Insert `new_rows` immediately after `index`, shifting later rows down
pub fn insert_after(rows: &[Rc<Row>], index: usize, new_rows: Vec<Row>) -> Rows {
    let at = (index + 1).min(rows.len());
    let mut next = Vec::with_capacity(rows.len() + new_rows.len());
    next.extend_from_slice(&rows[..at]);
    next.extend(new_rows.into_iter().map(Rc::new));
    next.extend_from_slice(&rows[at..]);
    next
}

/// Remove the row with `id`. Returns `None` when it is the only row left.
pub fn remove_by_id(rows: &[Rc<Row>], id: &str) -> Option<Rows> {
    if rows.len() <= 1 {
        return None;
    }
    Some(rows.iter().filter(|r| r.id != id).cloned().collect())
}

/// Remove rows `lo..=hi`. Returns `None` when that would leave the grid empty.
pub fn remove_range(rows: &[Rc<Row>], lo: usize, hi: usize) -> Option<Rows> {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let hi = hi.min(rows.len().saturating_sub(1));
    let removed = hi.saturating_sub(lo) + 1;
    if lo >= rows.len() || rows.len() <= removed {
        return None;
    }
    Some(
        rows.iter()
            .enumerate()
            .filter(|(i, _)| *i < lo || *i > hi)
            .map(|(_, r)| r.clone())
            .collect(),
    )
}

pub fn toggle_selected(rows: &[Rc<Row>], index: usize) -> Rows {
    let mut next = rows.to_vec();
    if let Some(row) = next.get_mut(index) {
        let row = Rc::make_mut(row);
        row.selected = !row.selected;
    }
    next
}

/// Uniform checkbox toggle over `lo..=hi`: all checked → uncheck all, otherwise
/// check the unchecked ones. The decision is taken from the range before any row changes.
pub fn toggle_range_uniform(rows: &[Rc<Row>], lo: usize, hi: usize) -> Rows {
    let (lo, hi) = (lo.min(hi), lo.max(hi).min(rows.len().saturating_sub(1)));
    let all_selected = rows
        .get(lo..=hi)
        .map(|range| range.iter().all(|r| r.selected))
        .unwrap_or(false);
    let target = !all_selected;

    let mut next = rows.to_vec();
    for row in next.iter_mut().take(hi + 1).skip(lo) {
        if row.selected != target {
            Rc::make_mut(row).selected = target;
        }
    }
    next
}

/// Select-all button: uncheck everything when all rows are checked, else check everything
pub fn toggle_all(rows: &[Rc<Row>]) -> Rows {
    if rows.is_empty() {
        return Vec::new();
    }
    toggle_range_uniform(rows, 0, rows.len() - 1)
}

pub fn clear_selection(rows: &[Rc<Row>]) -> Rows {
    let mut next = rows.to_vec();
    for row in next.iter_mut().filter(|r| r.selected) {
        Rc::make_mut(row).selected = false;
    }
    next
}

/// Empty every cell inside `rect`
pub fn clear_cells(rows: &[Rc<Row>], rect: CellRect) -> Rows {
    let mut next = rows.to_vec();
    for index in rect.rows() {
        let Some(row) = next.get_mut(index) else {
            break;
        };
        for field in rect.fields() {
            if !row.get(field).is_empty() {
                Rc::make_mut(row).set(field, String::new());
            }
        }
    }
    next
}

/// Write a block of values with its top-left at `anchor`. Values falling past the
/// last row or the last column are dropped; no rows are created.
pub fn paste_block(rows: &[Rc<Row>], anchor: CellCoord, block: &[Vec<String>]) -> Rows {
    let mut next = rows.to_vec();
    for (offset, values) in block.iter().enumerate() {
        let Some(row) = next.get_mut(anchor.row + offset) else {
            break;
        };
        for (col, value) in values.iter().enumerate() {
            let Some(field) = Field::from_index(anchor.field.index() + col) else {
                break;
            };
            let value = value.trim();
            if row.get(field) != value {
                Rc::make_mut(row).set(field, value.to_string());
            }
        }
    }
    next
}
