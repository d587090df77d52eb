use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::config::Theme;
use crate::saved::SavedItems;
use crate::widgets::cell_editor::CellEditor;

/// Selection in the saved list and the comment being edited, if any
#[derive(Default)]
pub struct SavedListState {
    pub table: TableState,
    /// Id of the item whose comment is open in `editor`
    pub editing: Option<String>,
    pub editor: CellEditor,
}

impl SavedListState {
    pub fn selected(&self) -> Option<usize> {
        self.table.selected()
    }

    /// Keep the selection inside `len` items
    pub fn clamp(&mut self, len: usize) {
        match (self.table.selected(), len) {
            (_, 0) => self.table.select(None),
            (None, _) => self.table.select(Some(0)),
            (Some(i), _) if i >= len => self.table.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.table.select(None);
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }

    pub fn start_comment(&mut self, id: &str, comment: &str) {
        self.editing = Some(id.to_string());
        self.editor.set_value(comment);
    }

    pub fn is_editing_comment(&self) -> bool {
        self.editing.is_some()
    }
}

pub struct SavedListView<'a> {
    items: &'a SavedItems,
    theme: &'a Theme,
}

impl<'a> SavedListView<'a> {
    pub fn new(items: &'a SavedItems, theme: &'a Theme) -> Self {
        Self { items, theme }
    }
}

impl StatefulWidget for SavedListView<'_> {
    type State = SavedListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut SavedListState) {
        state.clamp(self.items.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("table_border")))
            .title(format!(" Saved ({}) ", self.items.len()));

        if self.items.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new("No saved links yet. Check rows in the builder and press Ctrl+S.")
                .style(Style::default().fg(self.theme.get("dimmed")))
                .render(inner, buf);
            return;
        }

        let (table_area, comment_area) = if state.is_editing_comment() {
            let [table, comment] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);
            (table, Some(comment))
        } else {
            (area, None)
        };

        let header = Row::new(["Saved", "Campaign", "Comment", "URL"]).style(
            Style::default()
                .fg(self.theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        );
        let rows = self.items.items().iter().map(|item| {
            Row::new([
                Cell::from(item.saved_at_display())
                    .style(Style::default().fg(self.theme.get("text_secondary"))),
                Cell::from(item.campaign_name.as_str()),
                Cell::from(item.comment.as_str()),
                Cell::from(item.full_url.as_str())
                    .style(Style::default().fg(self.theme.get("url_valid"))),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(16),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(3),
            ],
        )
        .header(header)
        .column_spacing(1)
        .block(block)
        .row_highlight_style(Style::default().bg(self.theme.get("row_selected")));
        StatefulWidget::render(table, table_area, buf, &mut state.table);

        if let Some(comment_area) = comment_area {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.get("modal_border")))
                .title(Line::from(" Comment (Enter saves, Esc cancels) "));
            let inner = block.inner(comment_area);
            block.render(comment_area, buf);
            state.editor.render(inner, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_by_stays_in_bounds() {
        let mut state = SavedListState::default();
        state.clamp(3);
        assert_eq!(state.selected(), Some(0));
        state.move_by(-1, 3);
        assert_eq!(state.selected(), Some(0));
        state.move_by(5, 3);
        assert_eq!(state.selected(), Some(2));
        state.clamp(1);
        assert_eq!(state.selected(), Some(0));
        state.clamp(0);
        assert_eq!(state.selected(), None);
    }
}
