//! Undo/redo history over whole-grid snapshots.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::row::{CellCoord, Rows};

/// Default number of undo steps kept
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// What one undo step restores: the rows and the cell that was being edited.
///
/// This is also the persisted `{rows, editingCell}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: Rows,
    #[serde(rename = "editingCell", default)]
    pub cursor: Option<CellCoord>,
}

impl GridSnapshot {
    pub fn new(rows: Rows) -> Self {
        Self { rows, cursor: None }
    }
}

/// Linear undo/redo stack with a bounded past.
///
/// `undo`/`redo` raise a guard that suppresses `commit` until `settle` is
/// called, so applying a restored snapshot is never recorded as a new edit.
#[derive(Debug, Clone)]
pub struct History<S> {
    past: VecDeque<S>,
    present: S,
    future: VecDeque<S>,
    max_entries: usize,
    restoring: bool,
}

impl<S: Clone + PartialEq> History<S> {
    pub fn new(initial: S, max_entries: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            max_entries,
            restoring: false,
        }
    }

    pub fn present(&self) -> &S {
        &self.present
    }

    /// Record `next` as a new state. Returns false when nothing was recorded
    /// (state unchanged, or an undo/redo is still being applied).
    pub fn commit(&mut self, next: S) -> bool {
        if self.restoring || next == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        while self.past.len() > self.max_entries {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Change the present state in place without creating an undo step
    pub fn amend_present(&mut self, f: impl FnOnce(&mut S)) {
        f(&mut self.present);
    }

    pub fn undo(&mut self) -> Option<&S> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        self.restoring = true;
        Some(&self.present)
    }

    pub fn redo(&mut self) -> Option<&S> {
        let next = self.future.pop_front()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.restoring = true;
        Some(&self.present)
    }

    /// Lower the undo/redo guard once the restored state has been applied
    pub fn settle(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

}

impl History<GridSnapshot> {
    /// Remember where the user is typing without recording an undo step
    pub fn set_present_cursor(&mut self, cursor: Option<CellCoord>) {
        self.amend_present(|snapshot| snapshot.cursor = cursor);
    }
}
