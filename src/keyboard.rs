//! Keyboard routing for the builder grid.
//!
//! Application-wide shortcuts are matched first ([`global_shortcut`]); keys
//! that are not shortcuts go to the table of the current focus mode.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::builder::Builder;
use crate::focus::{step_cell, step_row, Direction, Focus};
use crate::row::{CellCoord, CellRect};

/// Shortcuts intercepted before any focus mode sees the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    SaveSelected,
    ToggleSelectAll,
    AddRow,
    Reset,
    CopyUrl,
    OpenUrl,
    DeleteRow,
    SwitchTab,
    Quit,
}

/// Match a key against the global shortcut table. Ctrl+A is left to the cell
/// editor while a cell is being edited.
pub fn global_shortcut(event: &KeyEvent, editing: bool) -> Option<Shortcut> {
    if !event.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let KeyCode::Char(c) = event.code else {
        return None;
    };
    let shift = event.modifiers.contains(KeyModifiers::SHIFT) || c.is_ascii_uppercase();
    match c.to_ascii_lowercase() {
        'z' if shift => Some(Shortcut::Redo),
        'z' => Some(Shortcut::Undo),
        'y' => Some(Shortcut::Redo),
        's' => Some(Shortcut::SaveSelected),
        'a' if !editing => Some(Shortcut::ToggleSelectAll),
        'n' => Some(Shortcut::AddRow),
        'r' => Some(Shortcut::Reset),
        'u' => Some(Shortcut::CopyUrl),
        'o' => Some(Shortcut::OpenUrl),
        'd' => Some(Shortcut::DeleteRow),
        't' => Some(Shortcut::SwitchTab),
        'q' => Some(Shortcut::Quit),
        _ => None,
    }
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

fn ctrl_char(event: &KeyEvent, c: char) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(event.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
}

/// Character a key would type, if it is a plain printable key
fn printable(event: &KeyEvent) -> Option<char> {
    if event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    match event.code {
        KeyCode::Char(c) if !c.is_control() => Some(c),
        _ => None,
    }
}

impl Builder {
    /// Route a key through the table of the current focus mode.
    /// Returns false when the key meant nothing in this mode.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match self.focus() {
            Focus::Idle => self.idle_key(event),
            Focus::Editing(cell) => self.editing_key(event, cell),
            Focus::CellSelected(cell) => self.cell_selection_key(event, cell, cell, false),
            Focus::CellRange { anchor, head } => {
                self.cell_selection_key(event, anchor, head, true)
            }
            Focus::RowSelected(row) => self.row_selection_key(event, row, row, false),
            Focus::RowRange { anchor, head } => self.row_selection_key(event, anchor, head, true),
        }
    }

    fn idle_key(&mut self, event: &KeyEvent) -> bool {
        let enters = matches!(event.code, KeyCode::Enter)
            || arrow(event.code).is_some()
            || printable(event).is_some();
        if !enters {
            return false;
        }
        let cell = self.resume_cell();
        self.set_focus(Focus::Editing(cell));
        if printable(event).is_some() {
            self.edit_text(cell, event);
        }
        true
    }

    fn editing_key(&mut self, event: &KeyEvent, cell: CellCoord) -> bool {
        if ctrl_char(event, 'c') {
            self.copy_in_editor(cell);
            return true;
        }
        if ctrl_char(event, 'v') {
            self.paste_in_editor(cell);
            return true;
        }

        let len = self.rows().len();
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let plain_caret = !self.editor().has_selection();
        let at_start = self.editor().at_start() && plain_caret;
        let at_end = self.editor().at_end() && plain_caret;

        match (event.code, arrow(event.code)) {
            (KeyCode::Esc, _) => {
                self.set_focus(Focus::CellSelected(cell));
                true
            }
            (KeyCode::Enter, _) => {
                if cell.row + 1 >= len {
                    self.append_row_below(cell);
                } else {
                    self.set_focus(Focus::Editing(CellCoord::new(cell.row + 1, cell.field)));
                }
                true
            }
            (KeyCode::Tab, _) => {
                if let Some(next) = step_cell(cell, Direction::Right, len) {
                    self.set_focus(Focus::Editing(next));
                }
                true
            }
            (KeyCode::BackTab, _) => {
                if let Some(next) = step_cell(cell, Direction::Left, len) {
                    self.set_focus(Focus::Editing(next));
                }
                true
            }
            (_, Some(dir @ (Direction::Up | Direction::Down))) if shift => {
                self.start_cell_range(cell, dir);
                true
            }
            (_, Some(Direction::Left)) if shift && at_start => {
                self.start_cell_range(cell, Direction::Left);
                true
            }
            (_, Some(Direction::Right)) if shift && at_end => {
                self.start_cell_range(cell, Direction::Right);
                true
            }
            (_, Some(dir @ (Direction::Up | Direction::Down))) => {
                if let Some(next) = step_cell(cell, dir, len) {
                    self.set_focus(Focus::Editing(next));
                }
                true
            }
            (_, Some(Direction::Left)) if !shift && at_start => {
                if let Some(next) = step_cell(cell, Direction::Left, len) {
                    self.set_focus(Focus::Editing(next));
                }
                true
            }
            (_, Some(Direction::Right)) if !shift && at_end => {
                if let Some(next) = step_cell(cell, Direction::Right, len) {
                    self.set_focus(Focus::Editing(next));
                }
                true
            }
            _ => self.edit_text(cell, event),
        }
    }

    /// Leave editing for a range anchored at `cell`
    fn start_cell_range(&mut self, cell: CellCoord, dir: Direction) {
        let next = match step_cell(cell, dir, self.rows().len()) {
            Some(head) => Focus::CellRange { anchor: cell, head },
            None => Focus::CellSelected(cell),
        };
        self.set_focus(next);
    }

    fn cell_selection_key(
        &mut self,
        event: &KeyEvent,
        anchor: CellCoord,
        head: CellCoord,
        ranged: bool,
    ) -> bool {
        let rect = CellRect::spanning(anchor, head);
        if ctrl_char(event, 'c') {
            self.copy_cells(rect);
            return true;
        }
        if ctrl_char(event, 'v') {
            self.paste_cells(anchor);
            return true;
        }

        let len = self.rows().len();
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        if let Some(dir) = arrow(event.code) {
            let Some(target) = step_cell(head, dir, len) else {
                return true;
            };
            let next = if !shift {
                Focus::CellSelected(target)
            } else if target == anchor {
                Focus::CellSelected(anchor)
            } else {
                Focus::CellRange {
                    anchor,
                    head: target,
                }
            };
            self.set_focus(next);
            return true;
        }

        match event.code {
            KeyCode::Esc if ranged => self.set_focus(Focus::CellSelected(head)),
            KeyCode::Esc => self.set_focus(Focus::RowSelected(head.row)),
            KeyCode::Enter => self.set_focus(Focus::Editing(head)),
            KeyCode::Delete | KeyCode::Backspace => self.clear_cells(rect),
            _ => match printable(event) {
                Some(c) => self.seed_cell(head, c),
                None => return false,
            },
        }
        true
    }

    fn row_selection_key(
        &mut self,
        event: &KeyEvent,
        anchor: usize,
        head: usize,
        ranged: bool,
    ) -> bool {
        let (lo, hi) = (anchor.min(head), anchor.max(head));
        if ctrl_char(event, 'c') {
            self.copy_rows(lo, hi);
            return true;
        }
        if ctrl_char(event, 'v') {
            self.paste_rows(head);
            return true;
        }

        let len = self.rows().len();
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let field = self.last_focused_field();
        match (event.code, arrow(event.code)) {
            (_, Some(dir @ (Direction::Up | Direction::Down))) if shift => {
                if let Some(target) = step_row(head, dir, len) {
                    self.set_focus(if target == anchor {
                        Focus::RowSelected(anchor)
                    } else {
                        Focus::RowRange {
                            anchor,
                            head: target,
                        }
                    });
                }
            }
            (_, Some(dir @ (Direction::Up | Direction::Down))) => {
                // A range moves from its anchor, not from where Shift left off
                let from = if ranged { anchor } else { head };
                if let Some(target) = step_row(from, dir, len) {
                    self.set_focus(Focus::RowSelected(target));
                }
            }
            (_, Some(_)) => {}
            (KeyCode::Char(' '), _) if printable(event).is_some() => {
                if ranged {
                    self.toggle_rows(lo, hi);
                } else {
                    self.toggle_row(head);
                }
            }
            (KeyCode::Delete | KeyCode::Backspace, _) => self.delete_rows(lo, hi),
            (KeyCode::Esc | KeyCode::Enter, _) => {
                self.set_focus(Focus::Editing(CellCoord::new(head, field)));
            }
            _ if printable(event).is_some() => {
                self.set_focus(Focus::Editing(CellCoord::new(head, field)));
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_global_shortcuts() {
        assert_eq!(global_shortcut(&ctrl('z'), false), Some(Shortcut::Undo));
        assert_eq!(
            global_shortcut(
                &KeyEvent::new(
                    KeyCode::Char('Z'),
                    KeyModifiers::CONTROL | KeyModifiers::SHIFT
                ),
                false
            ),
            Some(Shortcut::Redo)
        );
        assert_eq!(global_shortcut(&ctrl('y'), true), Some(Shortcut::Redo));
        assert_eq!(global_shortcut(&ctrl('s'), true), Some(Shortcut::SaveSelected));
        assert_eq!(global_shortcut(&ctrl('a'), false), Some(Shortcut::ToggleSelectAll));
        assert_eq!(global_shortcut(&ctrl('a'), true), None);
        assert_eq!(global_shortcut(&ctrl('c'), false), None);
        assert_eq!(
            global_shortcut(&KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE), false),
            None
        );
    }

    #[test]
    fn test_printable() {
        assert_eq!(
            printable(&KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some('A')
        );
        assert_eq!(printable(&ctrl('a')), None);
        assert_eq!(printable(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), None);
    }
}
