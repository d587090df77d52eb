//! Keyboard focus of the builder grid.
//!
//! Exactly one mode owns the keyboard at a time, so focus is a single enum
//! rather than a set of independent "selected" flags.

use crate::row::{CellCoord, CellRect, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Nothing focused yet (start-up, or the grid is not on screen)
    #[default]
    Idle,
    /// The cell has a live text caret
    Editing(CellCoord),
    CellSelected(CellCoord),
    /// Rectangular cell selection; `anchor` stays fixed while `head` follows Shift+Arrow
    CellRange { anchor: CellCoord, head: CellCoord },
    RowSelected(usize),
    RowRange { anchor: usize, head: usize },
}

/// Coarse mode name, used for key table dispatch and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Idle,
    Editing,
    CellSelection,
    RowSelection,
}

impl Focus {
    pub fn mode(&self) -> FocusMode {
        match self {
            Focus::Idle => FocusMode::Idle,
            Focus::Editing(_) => FocusMode::Editing,
            Focus::CellSelected(_) | Focus::CellRange { .. } => FocusMode::CellSelection,
            Focus::RowSelected(_) | Focus::RowRange { .. } => FocusMode::RowSelection,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Focus::Idle => "IDLE",
            Focus::Editing(_) => "EDIT",
            Focus::CellSelected(_) => "CELL",
            Focus::CellRange { .. } => "CELLS",
            Focus::RowSelected(_) => "ROW",
            Focus::RowRange { .. } => "ROWS",
        }
    }

    /// The cell holding the text caret, if editing
    pub fn editing_cell(&self) -> Option<CellCoord> {
        match self {
            Focus::Editing(cell) => Some(*cell),
            _ => None,
        }
    }

    /// Row the focus indicator is on
    pub fn active_row(&self) -> Option<usize> {
        match self {
            Focus::Idle => None,
            Focus::Editing(c) | Focus::CellSelected(c) => Some(c.row),
            Focus::CellRange { head, .. } => Some(head.row),
            Focus::RowSelected(r) => Some(*r),
            Focus::RowRange { head, .. } => Some(*head),
        }
    }

    /// Cell the focus indicator is on (the range head for ranges)
    pub fn active_cell(&self) -> Option<CellCoord> {
        match self {
            Focus::Editing(c) | Focus::CellSelected(c) => Some(*c),
            Focus::CellRange { head, .. } => Some(*head),
            _ => None,
        }
    }

    /// Selected cells (single cell or range) as a rectangle
    pub fn cell_rect(&self) -> Option<CellRect> {
        match self {
            Focus::CellSelected(c) => Some(CellRect::single(*c)),
            Focus::CellRange { anchor, head } => Some(CellRect::spanning(*anchor, *head)),
            _ => None,
        }
    }

    /// Selected rows as an inclusive `(lo, hi)` pair
    pub fn row_span(&self) -> Option<(usize, usize)> {
        match self {
            Focus::RowSelected(r) => Some((*r, *r)),
            Focus::RowRange { anchor, head } => Some((*anchor.min(head), *anchor.max(head))),
            _ => None,
        }
    }

    pub fn is_cell_selected(&self, cell: CellCoord) -> bool {
        self.cell_rect().is_some_and(|rect| rect.contains(cell))
    }

    pub fn is_row_selected(&self, row: usize) -> bool {
        self.row_span()
            .is_some_and(|(lo, hi)| (lo..=hi).contains(&row))
    }

    /// Keep every coordinate inside a grid of `len` rows
    pub fn clamped(self, len: usize) -> Focus {
        if len == 0 {
            return Focus::Idle;
        }
        let last = len - 1;
        let cell = |c: CellCoord| CellCoord::new(c.row.min(last), c.field);
        match self {
            Focus::Idle => Focus::Idle,
            Focus::Editing(c) => Focus::Editing(cell(c)),
            Focus::CellSelected(c) => Focus::CellSelected(cell(c)),
            Focus::CellRange { anchor, head } => {
                let (anchor, head) = (cell(anchor), cell(head));
                if anchor == head {
                    Focus::CellSelected(head)
                } else {
                    Focus::CellRange { anchor, head }
                }
            }
            Focus::RowSelected(r) => Focus::RowSelected(r.min(last)),
            Focus::RowRange { anchor, head } => {
                let (anchor, head) = (anchor.min(last), head.min(last));
                if anchor == head {
                    Focus::RowSelected(head)
                } else {
                    Focus::RowRange { anchor, head }
                }
            }
        }
    }
}

/// Arrow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Adjacent cell in `dir`, or `None` at the grid edge (no wraparound)
pub fn step_cell(cell: CellCoord, dir: Direction, len: usize) -> Option<CellCoord> {
    match dir {
        Direction::Up => cell.row.checked_sub(1).map(|r| CellCoord::new(r, cell.field)),
        Direction::Down => (cell.row + 1 < len).then(|| CellCoord::new(cell.row + 1, cell.field)),
        Direction::Left => cell.field.left().map(|f| CellCoord::new(cell.row, f)),
        Direction::Right => cell.field.right().map(|f| CellCoord::new(cell.row, f)),
    }
}

/// Adjacent row in `dir` (Up/Down only), or `None` at the grid edge
pub fn step_row(row: usize, dir: Direction, len: usize) -> Option<usize> {
    match dir {
        Direction::Up => row.checked_sub(1),
        Direction::Down => (row + 1 < len).then_some(row + 1),
        Direction::Left | Direction::Right => None,
    }
}

/// Default column when nothing has been edited yet
pub const DEFAULT_FIELD: Field = Field::BaseUrl;
