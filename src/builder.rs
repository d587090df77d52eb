//! The builder grid: rows under undo/redo, keyboard focus, clipboards and the
//! cell editor, plus the user-visible commands that act on them.
//!
//! Key dispatch lives in [`crate::keyboard`]; this module owns the state and
//! the operations the key tables call.

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clipboard::{decode_tsv, encode_tsv, RowClipboard, SystemClipboard};
use crate::focus::{Focus, DEFAULT_FIELD};
use crate::history::{GridSnapshot, History};
use crate::row::{self, CellCoord, CellRect, Field, Row, Rows};
use crate::saved::SavedItem;
use crate::toast::Toasts;
use crate::utm::{build_utm_url, normalize_base_url};
use crate::widgets::cell_editor::{CellEditor, CellEditorEvent};

/// Settings the builder takes from configuration
#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    pub max_history: usize,
    pub toast_duration: Duration,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            max_history: crate::history::DEFAULT_MAX_HISTORY,
            toast_duration: Duration::from_millis(crate::toast::DEFAULT_TOAST_DURATION_MS),
        }
    }
}

pub struct Builder {
    history: History<GridSnapshot>,
    focus: Focus,
    last_field: Field,
    row_clipboard: RowClipboard,
    clipboard: Box<dyn SystemClipboard>,
    editor: CellEditor,
    toasts: Toasts,
    rows_changed: bool,
}

impl Builder {
    pub fn new(
        initial: GridSnapshot,
        clipboard: Box<dyn SystemClipboard>,
        options: BuilderOptions,
    ) -> Self {
        let last_field = initial.cursor.map(|c| c.field).unwrap_or(DEFAULT_FIELD);
        Self {
            history: History::new(initial, options.max_history),
            focus: Focus::Idle,
            last_field,
            row_clipboard: RowClipboard::new(),
            clipboard,
            editor: CellEditor::new(),
            toasts: Toasts::new(options.toast_duration),
            rows_changed: false,
        }
    }

    /// Apply theme colours to the cell editor
    pub fn set_editor_colors(&mut self, text: Color, cursor: Color) {
        self.editor = std::mem::take(&mut self.editor).with_colors(text, cursor);
    }

    pub fn rows(&self) -> &Rows {
        &self.history.present().rows
    }

    pub fn snapshot(&self) -> &GridSnapshot {
        self.history.present()
    }

    pub fn history(&self) -> &History<GridSnapshot> {
        &self.history
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_editing(&self) -> bool {
        self.focus.editing_cell().is_some()
    }

    pub fn last_focused_field(&self) -> Field {
        self.last_field
    }

    pub fn editor(&self) -> &CellEditor {
        &self.editor
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    /// Report (and reset) whether the rows changed since the last call
    pub fn take_rows_changed(&mut self) -> bool {
        std::mem::take(&mut self.rows_changed)
    }

    /// Lower the undo/redo guard; called once per handled event
    pub fn settle(&mut self) {
        self.history.settle();
    }

    /// Record a new row vector. The snapshot remembers the cell being edited.
    pub(crate) fn commit_rows(&mut self, rows: Rows) -> bool {
        let cursor = self.focus.editing_cell().filter(|c| c.row < rows.len());
        let committed = self.history.commit(GridSnapshot { rows, cursor });
        if committed {
            self.rows_changed = true;
            self.focus = self.focus.clamped(self.rows().len());
        }
        committed
    }

    /// Replace the focus. Leaving a cell finishes its edit; entering one loads the editor.
    pub(crate) fn set_focus(&mut self, next: Focus) {
        let next = next.clamped(self.rows().len());
        let previous = self.focus;
        if let Some(cell) = previous.editing_cell() {
            if next.editing_cell() != Some(cell) {
                self.finish_edit(cell);
            }
        }
        if let Some(cell) = next.editing_cell() {
            self.last_field = cell.field;
            if previous.editing_cell() != Some(cell) {
                self.load_editor(cell);
            }
        }
        if previous != next {
            debug!(from = previous.label(), to = next.label(), "focus");
        }
        self.focus = next;
        self.history.set_present_cursor(next.editing_cell());
    }

    fn load_editor(&mut self, cell: CellCoord) {
        let value = self
            .rows()
            .get(cell.row)
            .map(|r| r.get(cell.field).to_string())
            .unwrap_or_default();
        self.editor.set_value(&value);
    }

    /// Base URLs get a scheme once the user is done typing them
    fn finish_edit(&mut self, cell: CellCoord) {
        if let Some(next) = finished_rows(self.rows(), cell) {
            self.commit_rows(next);
        }
    }

    /// Current rows with the edited cell finished, for commands that leave the
    /// cell and change the grid in one undo step
    fn rows_with_edit_finished(&self) -> Rows {
        self.focus
            .editing_cell()
            .and_then(|cell| finished_rows(self.rows(), cell))
            .unwrap_or_else(|| self.rows().clone())
    }

    /// Pointer seam: put the caret into a cell
    pub fn focus_cell(&mut self, row: usize, field: Field) {
        if row < self.rows().len() {
            self.set_focus(Focus::Editing(CellCoord::new(row, field)));
        }
    }

    /// Cell the grid resumes at when it gains focus from `Idle`
    pub(crate) fn resume_cell(&self) -> CellCoord {
        self.snapshot()
            .cursor
            .filter(|c| c.row < self.rows().len())
            .unwrap_or(CellCoord::new(0, self.last_field))
    }

    /// Feed a key to the cell editor and record the new text
    pub(crate) fn edit_text(&mut self, cell: CellCoord, event: &crossterm::event::KeyEvent) -> bool {
        match self.editor.handle_key(event) {
            CellEditorEvent::Changed => {
                self.commit_editor(cell);
                true
            }
            CellEditorEvent::Moved => true,
            CellEditorEvent::None => false,
        }
    }

    fn commit_editor(&mut self, cell: CellCoord) {
        let value = self.editor.value().to_string();
        let next = row::set_field(self.rows(), cell.row, cell.field, value);
        self.commit_rows(next);
    }

    /// Start editing `cell` with `c` as its whole value
    pub(crate) fn seed_cell(&mut self, cell: CellCoord, c: char) {
        self.set_focus(Focus::Editing(cell));
        self.editor.set_value(&c.to_string());
        self.commit_editor(cell);
    }

    /// Native copy inside the editor: the text selection if any, otherwise the whole row
    pub(crate) fn copy_in_editor(&mut self, cell: CellCoord) {
        if let Some(text) = self.editor.selected_text() {
            if let Err(e) = self.clipboard.write_text(&text) {
                self.toasts.error(e.to_string());
            }
            return;
        }
        if let Some(r) = self.rows().get(cell.row).cloned() {
            self.row_clipboard.copy_row(&r);
            self.toasts.success("Row copied");
        }
    }

    /// Native paste inside the editor: first line of the clipboard at the caret
    pub(crate) fn paste_in_editor(&mut self, cell: CellCoord) {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                self.toasts.error(format!("Could not read clipboard: {}", e));
                return;
            }
        };
        let line = text.lines().next().unwrap_or("");
        if line.is_empty() {
            return;
        }
        if self.editor.insert_str(line) {
            self.commit_editor(cell);
        }
    }

    pub(crate) fn copy_cells(&mut self, rect: CellRect) {
        let text = encode_tsv(self.rows(), rect);
        let single = rect.top == rect.bottom && rect.left == rect.right;
        if single && text.is_empty() {
            self.toasts.info("Cell is empty");
            return;
        }
        match self.clipboard.write_text(&text) {
            Ok(()) if single => self.toasts.success("Cell copied"),
            Ok(()) => self.toasts.success("Cell range copied"),
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    /// Write clipboard TSV into the grid with its top-left at `anchor`
    pub(crate) fn paste_cells(&mut self, anchor: CellCoord) {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                self.toasts.error(format!("Could not read clipboard: {}", e));
                return;
            }
        };
        let block = decode_tsv(&text);
        if block.is_empty() {
            self.toasts.warning("Clipboard is empty");
            return;
        }
        let next = row::paste_block(self.rows(), anchor, &block);
        self.commit_rows(next);
        self.toasts.success("Pasted into cells");
    }

    pub(crate) fn clear_cells(&mut self, rect: CellRect) {
        let next = row::clear_cells(self.rows(), rect);
        self.commit_rows(next);
    }

    /// Copy rows `lo..=hi` to the row clipboard
    pub(crate) fn copy_rows(&mut self, lo: usize, hi: usize) {
        let Some(range) = self.rows().get(lo..=hi).map(<[_]>::to_vec) else {
            return;
        };
        if let [single] = range.as_slice() {
            self.row_clipboard.copy_row(single);
            self.toasts.success("Row copied");
        } else if self.row_clipboard.copy_rows(&range) {
            self.toasts.success(format!("{} rows copied", range.len()));
        }
    }

    /// Insert the copied rows after `index` and select the first of them
    pub(crate) fn paste_rows(&mut self, index: usize) {
        let Some(paste) = self.row_clipboard.paste_after(self.rows(), index) else {
            self.toasts.warning("No copied rows to paste");
            return;
        };
        self.commit_rows(paste.rows);
        self.set_focus(Focus::RowSelected(paste.inserted_at));
        if paste.count == 1 {
            self.toasts.success("Row pasted");
        } else {
            self.toasts.success(format!("{} rows pasted", paste.count));
        }
    }

    pub fn toggle_row(&mut self, index: usize) {
        let next = row::toggle_selected(self.rows(), index);
        self.commit_rows(next);
    }

    pub(crate) fn toggle_rows(&mut self, lo: usize, hi: usize) {
        let next = row::toggle_range_uniform(self.rows(), lo, hi);
        self.commit_rows(next);
    }

    /// Remove rows `lo..=hi` and select the row above the first removed one
    pub(crate) fn delete_rows(&mut self, lo: usize, hi: usize) {
        let Some(next) = row::remove_range(self.rows(), lo, hi) else {
            self.toasts.warning("At least one row is required");
            return;
        };
        let count = self.rows().len() - next.len();
        self.commit_rows(next);
        self.set_focus(Focus::RowSelected(lo.saturating_sub(1)));
        if count == 1 {
            self.toasts.success("Row deleted");
        } else {
            self.toasts.success(format!("{} rows deleted", count));
        }
    }

    pub fn add_row(&mut self) {
        let next = row::with_row_added(self.rows());
        self.commit_rows(next);
        info!(rows = self.rows().len(), "row added");
    }

    /// Enter on the last row: append a row and move the caret down into it
    pub(crate) fn append_row_below(&mut self, cell: CellCoord) {
        let next = row::with_row_added(&self.rows_with_edit_finished());
        self.commit_rows(next);
        info!(rows = self.rows().len(), "row added");
        self.set_focus(Focus::Editing(CellCoord::new(cell.row + 1, cell.field)));
    }

    /// Back to a single empty row
    pub fn reset(&mut self) {
        self.set_focus(Focus::Idle);
        self.commit_rows(row::default_rows(1));
        self.toasts.success("Grid reset");
        info!("grid reset");
    }

    /// Check every row, or uncheck every row when all are already checked
    pub fn toggle_select_all(&mut self) {
        let next = row::toggle_all(self.rows());
        self.commit_rows(next);
    }

    /// Delete one row by index, keeping at least one row
    pub fn delete_row(&mut self, index: usize) {
        let Some(id) = self.rows().get(index).map(|r| r.id.clone()) else {
            return;
        };
        let Some(next) = row::remove_by_id(&self.rows_with_edit_finished(), &id) else {
            self.toasts.warning("At least one row is required");
            return;
        };
        let target = index.saturating_sub(1);
        let relocated = match self.focus {
            Focus::Idle => Focus::Idle,
            Focus::Editing(c) => Focus::Editing(CellCoord::new(target, c.field)),
            Focus::CellSelected(c) | Focus::CellRange { head: c, .. } => {
                Focus::CellSelected(CellCoord::new(target, c.field))
            }
            Focus::RowSelected(_) | Focus::RowRange { .. } => Focus::RowSelected(target),
        };
        self.commit_rows(next);
        // The old cell may now hold another row; reload the editor from scratch
        self.focus = Focus::Idle;
        self.set_focus(relocated);
        self.toasts.success("Row deleted");
    }

    pub fn delete_focused_row(&mut self) {
        match self.focus.active_row() {
            Some(index) => self.delete_row(index),
            None => self.toasts.warning("No row focused"),
        }
    }

    pub fn copy_url(&mut self, index: usize) {
        let url = self.rows().get(index).map(|r| build_utm_url(r)).unwrap_or_default();
        if url.is_empty() {
            self.toasts.warning("No URL to copy");
            return;
        }
        self.copy_text(&url, "URL copied");
    }

    /// Put `text` on the system clipboard and confirm with `message`
    pub fn copy_text(&mut self, text: &str, message: &str) {
        match self.clipboard.write_text(text) {
            Ok(()) => self.toasts.success(message),
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    pub fn copy_focused_url(&mut self) {
        match self.focus.active_row() {
            Some(index) => self.copy_url(index),
            None => self.toasts.warning("No row focused"),
        }
    }

    pub fn open_url(&mut self, index: usize) {
        let url = self.rows().get(index).map(|r| build_utm_url(r)).unwrap_or_default();
        if url.is_empty() {
            self.toasts.warning("No URL to open");
            return;
        }
        self.open_link(&url);
    }

    /// Hand a URL to the desktop's default browser
    pub fn open_link(&mut self, url: &str) {
        info!(%url, "opening url");
        if let Err(e) = open::that(url) {
            self.toasts.error(format!("Could not open browser: {}", e));
        }
    }

    pub fn open_focused_url(&mut self) {
        match self.focus.active_row() {
            Some(index) => self.open_url(index),
            None => self.toasts.warning("No row focused"),
        }
    }

    /// Turn checked rows into saved items and clear the checkboxes.
    /// Rows without a usable URL are skipped.
    pub fn save_selected(&mut self, now: DateTime<Utc>) -> Vec<SavedItem> {
        let checked: Vec<_> = self.rows().iter().filter(|r| r.selected).cloned().collect();
        if checked.is_empty() {
            self.toasts.warning("Select rows to save");
            return Vec::new();
        }
        let items: Vec<SavedItem> = checked
            .iter()
            .filter_map(|r| SavedItem::from_row(r, now))
            .collect();
        if items.is_empty() {
            self.toasts.warning("Selected rows have no valid URL");
            return items;
        }
        let next = row::clear_selection(self.rows());
        self.commit_rows(next);
        self.toasts.success(format!("Saved {} item(s)", items.len()));
        info!(count = items.len(), "saved selected rows");
        items
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            debug!("nothing to undo");
            return false;
        };
        self.apply_restored(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            debug!("nothing to redo");
            return false;
        };
        self.apply_restored(snapshot);
        true
    }

    /// Put focus back where the restored snapshot was being edited
    fn apply_restored(&mut self, snapshot: GridSnapshot) {
        let next = match (snapshot.cursor, self.focus) {
            (Some(cell), _) => Focus::Editing(cell),
            (None, Focus::Editing(cell)) => Focus::CellSelected(cell),
            (None, focus) => focus,
        };
        self.focus = next.clamped(snapshot.rows.len());
        if let Some(cell) = self.focus.editing_cell() {
            self.last_field = cell.field;
            self.load_editor(cell);
        }
        self.rows_changed = true;
        debug!(
            past = self.history.past_len(),
            future = self.history.future_len(),
            "history restored"
        );
    }
}

/// `rows` with the base URL in `cell` normalised, or `None` when nothing changes
fn finished_rows(rows: &[Rc<Row>], cell: CellCoord) -> Option<Rows> {
    if cell.field != Field::BaseUrl {
        return None;
    }
    let current = &rows.get(cell.row)?.base_url;
    let normalized = normalize_base_url(current);
    (normalized != *current).then(|| row::set_field(rows, cell.row, Field::BaseUrl, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::row::default_rows;

    fn builder(rows: usize) -> Builder {
        Builder::new(
            GridSnapshot::new(default_rows(rows)),
            Box::new(MemoryClipboard::new()),
            BuilderOptions::default(),
        )
    }

    #[test]
    fn test_delete_last_row_is_refused() {
        let mut b = builder(1);
        b.delete_row(0);
        assert_eq!(b.rows().len(), 1);
        assert_eq!(
            b.toasts().current().map(|t| t.kind),
            Some(crate::toast::ToastKind::Warning)
        );
        assert!(!b.history().can_undo());
    }

    #[test]
    fn test_base_url_normalised_when_leaving_cell() {
        let mut b = builder(2);
        b.focus_cell(0, Field::BaseUrl);
        b.seed_cell(CellCoord::new(0, Field::BaseUrl), 'x');
        assert_eq!(b.rows()[0].base_url, "x");
        b.focus_cell(1, Field::BaseUrl);
        assert_eq!(b.rows()[0].base_url, "https://x");
    }

    #[test]
    fn test_save_selected_skips_rows_without_url() {
        let mut b = builder(2);
        b.toggle_row(0);
        assert!(b.save_selected(Utc::now()).is_empty());
        assert!(b.rows()[0].selected);

        b.focus_cell(1, Field::BaseUrl);
        b.seed_cell(CellCoord::new(1, Field::BaseUrl), 'a');
        b.toggle_row(1);
        let b_url = build_utm_url(&b.rows()[1]);
        assert_eq!(b_url, "https://a/");
        let items = b.save_selected(Utc::now());
        assert_eq!(items.len(), 1);
        assert!(b.rows().iter().all(|r| !r.selected));
    }

    #[test]
    fn test_undo_restores_editing_cell() {
        let mut b = builder(2);
        let cell = CellCoord::new(1, Field::Source);
        b.focus_cell(1, Field::Source);
        b.seed_cell(cell, 'g');
        b.set_focus(Focus::RowSelected(0));
        assert!(b.undo());
        assert_eq!(b.focus(), Focus::Editing(cell));
        assert_eq!(b.rows()[1].source, "");
        assert_eq!(b.editor().value(), "");
        b.settle();
        assert!(b.redo());
        assert_eq!(b.rows()[1].source, "g");
        assert_eq!(b.focus(), Focus::CellSelected(cell));
        assert_eq!(b.snapshot().cursor, None);
    }

    #[test]
    fn test_reset_keeps_one_row() {
        let mut b = builder(3);
        b.reset();
        assert_eq!(b.rows().len(), 1);
        assert!(b.take_rows_changed());
        assert!(!b.take_rows_changed());
    }
}
