use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Event emitted by the cell editor after handling a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEditorEvent {
    None,
    /// The text changed
    Changed,
    /// Caret moved or selection changed, text untouched
    Moved,
}

/// Single-line editor for the grid cell that holds the caret, wrapping tui-textarea
pub struct CellEditor {
    textarea: TextArea<'static>,
    text_color: Option<Color>,
    cursor_color: Option<Color>,
}

impl CellEditor {
    pub fn new() -> Self {
        let mut editor = Self {
            textarea: TextArea::default(),
            text_color: None,
            cursor_color: None,
        };
        editor.apply_style();
        editor
    }

    pub fn with_colors(mut self, text: Color, cursor: Color) -> Self {
        self.text_color = Some(text);
        self.cursor_color = Some(cursor);
        self.apply_style();
        self
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(fg) = self.text_color {
            style = style.fg(fg);
        }
        self.textarea.set_style(style);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor_style = match self.cursor_color {
            Some(Color::Reset) | None => Style::default().add_modifier(Modifier::REVERSED),
            Some(color) => Style::default().bg(color).fg(Color::Black),
        };
        self.textarea.set_cursor_style(cursor_style);
        self.textarea
            .set_selection_style(Style::default().bg(Color::DarkGray));
    }

    pub fn value(&self) -> &str {
        self.textarea
            .lines()
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Replace the text and put the caret at the end
    pub fn set_value(&mut self, value: &str) {
        let single_line = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line]);
        self.apply_style();
        self.textarea.move_cursor(CursorMove::End);
    }

    /// Caret position in characters
    pub fn cursor(&self) -> usize {
        self.textarea.cursor().1
    }

    pub fn char_count(&self) -> usize {
        self.value().chars().count()
    }

    pub fn at_start(&self) -> bool {
        self.cursor() == 0
    }

    pub fn at_end(&self) -> bool {
        self.cursor() >= self.char_count()
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some_and(|(start, end)| start != end)
    }

    /// Selected text, if a non-empty selection exists
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection()?;
        if start == end {
            return None;
        }
        Some(
            self.value()
                .chars()
                .skip(start)
                .take(end - start)
                .collect(),
        )
    }

    fn selection(&self) -> Option<(usize, usize)> {
        let ((_, start), (_, end)) = self.textarea.selection_range()?;
        Some((start.min(end), start.max(end)))
    }

    /// Insert text at the caret, replacing any selection
    pub fn insert_str(&mut self, text: &str) -> bool {
        let single_line = text.replace(['\n', '\r'], " ");
        if self.has_selection() {
            self.textarea.cut();
        }
        self.textarea.insert_str(single_line)
    }

    /// Apply a key to the text. Enter and Escape never reach the textarea.
    pub fn handle_key(&mut self, event: &KeyEvent) -> CellEditorEvent {
        if matches!(event.code, KeyCode::Enter | KeyCode::Esc) {
            return CellEditorEvent::None;
        }
        let input = key_event_to_input(event);
        if matches!(input.key, Key::Null | Key::Char('\n') | Key::Char('\r')) {
            return CellEditorEvent::None;
        }
        let before = self.value().to_string();
        self.textarea.input(input);
        if self.value() != before {
            CellEditorEvent::Changed
        } else {
            CellEditorEvent::Moved
        }
    }
}

impl Default for CellEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a crossterm KeyEvent to a tui_textarea::Input
pub fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &CellEditor {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_set_value_puts_caret_at_end() {
        let mut editor = CellEditor::new();
        editor.set_value("google");
        assert_eq!(editor.value(), "google");
        assert_eq!(editor.cursor(), 6);
        assert!(editor.at_end());
        assert!(!editor.at_start());
    }

    #[test]
    fn test_typing_and_boundaries() {
        let mut editor = CellEditor::new();
        assert_eq!(
            editor.handle_key(&key(KeyCode::Char('a'))),
            CellEditorEvent::Changed
        );
        assert_eq!(editor.handle_key(&key(KeyCode::Left)), CellEditorEvent::Moved);
        assert!(editor.at_start());
        assert_eq!(editor.handle_key(&key(KeyCode::Enter)), CellEditorEvent::None);
        assert_eq!(editor.value(), "a");
    }

    #[test]
    fn test_shift_selection() {
        let mut editor = CellEditor::new();
        editor.set_value("abc");
        let shift_left = KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT);
        editor.handle_key(&shift_left);
        editor.handle_key(&shift_left);
        assert!(editor.has_selection());
        assert_eq!(editor.selected_text().as_deref(), Some("bc"));
        editor.insert_str("X");
        assert_eq!(editor.value(), "aX");
    }

    #[test]
    fn test_insert_str_flattens_newlines() {
        let mut editor = CellEditor::new();
        editor.insert_str("a\nb");
        assert_eq!(editor.value(), "a b");
    }
}
