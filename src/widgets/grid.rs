use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget},
};

use crate::builder::Builder;
use crate::config::Theme;
use crate::row::{CellCoord, Field, Row};
use crate::utm::{build_utm_url, has_required_fields, validate_url};

/// What a mouse click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridHit {
    Checkbox(usize),
    Cell(CellCoord),
}

/// Scroll position plus the clickable areas of the last frame, for mouse hit tests
#[derive(Debug, Default)]
pub struct GridState {
    pub offset: usize,
    hits: Vec<(Rect, GridHit)>,
}

impl GridState {
    /// Keep `row` inside a window of `visible` rows
    pub fn scroll_to(&mut self, row: usize, visible: usize) {
        if visible == 0 {
            return;
        }
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + visible {
            self.offset = row + 1 - visible;
        }
    }

    /// Checkbox or cell drawn at a terminal position in the last frame
    pub fn hit_at(&self, column: u16, row: u16) -> Option<GridHit> {
        let position = Position::new(column, row);
        self.hits
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, hit)| *hit)
    }
}

pub struct GridView<'a> {
    builder: &'a Builder,
    theme: &'a Theme,
    show_row_numbers: bool,
    url_min_width: u16,
}

impl<'a> GridView<'a> {
    pub fn new(builder: &'a Builder, theme: &'a Theme) -> Self {
        Self {
            builder,
            theme,
            show_row_numbers: true,
            url_min_width: 40,
        }
    }

    pub fn with_row_numbers(mut self, show: bool) -> Self {
        self.show_row_numbers = show;
        self
    }

    pub fn with_url_min_width(mut self, width: u16) -> Self {
        self.url_min_width = width;
        self
    }

    fn constraints(&self) -> Vec<Constraint> {
        let mut constraints = vec![Constraint::Length(3)];
        if self.show_row_numbers {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Fill(2));
        constraints.extend(std::iter::repeat(Constraint::Fill(1)).take(Field::ALL.len() - 1));
        constraints.push(Constraint::Min(self.url_min_width));
        constraints
    }

    fn split(&self, line: Rect) -> Vec<Rect> {
        Layout::horizontal(self.constraints())
            .spacing(1)
            .split(line)
            .to_vec()
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.theme.get("table_header"))
            .add_modifier(Modifier::BOLD);
        let rows = self.builder.rows();
        let all_checked = !rows.is_empty() && rows.iter().all(|r| r.selected);
        let mut labels = vec![if all_checked { "[x]" } else { "[ ]" }];
        if self.show_row_numbers {
            labels.push("#");
        }
        labels.extend(Field::ALL.iter().map(|f| f.label()));
        labels.push("UTM URL");
        for (rect, label) in self.split(area).into_iter().zip(labels) {
            Paragraph::new(label).style(style).render(rect, buf);
        }
    }

    fn render_row(&self, index: usize, row: &Row, area: Rect, buf: &mut Buffer, state: &mut GridState) {
        let focus = self.builder.focus();
        let row_style = if focus.is_row_selected(index) {
            Style::default().bg(self.theme.get("row_selected"))
        } else {
            Style::default()
        };
        buf.set_style(area, row_style);

        let columns = self.split(area);
        let mut columns = columns.into_iter();

        if let Some(rect) = columns.next() {
            state.hits.push((rect, GridHit::Checkbox(index)));
            let mark = if row.selected { "[x]" } else { "[ ]" };
            Paragraph::new(mark)
                .style(row_style.fg(self.theme.get("checkbox")))
                .render(rect, buf);
        }
        if self.show_row_numbers {
            if let Some(rect) = columns.next() {
                Paragraph::new(format!("{:>3}", index + 1))
                    .style(row_style.fg(self.theme.get("dimmed")))
                    .render(rect, buf);
            }
        }

        for (field, rect) in Field::ALL.into_iter().zip(columns.by_ref()) {
            let cell = CellCoord::new(index, field);
            state.hits.push((rect, GridHit::Cell(cell)));
            if focus.editing_cell() == Some(cell) {
                buf.set_style(rect, Style::default().bg(self.theme.get("cell_editing")));
                self.builder.editor().render(rect, buf);
                continue;
            }
            let value = row.get(field);
            let mut style = row_style;
            if focus.is_cell_selected(cell) {
                style = style.bg(self.theme.get("cell_selected"));
            }
            let span = if value.is_empty() {
                Span::styled(
                    field.placeholder(),
                    style
                        .fg(self.theme.get("dimmed"))
                        .add_modifier(Modifier::ITALIC),
                )
            } else if field == Field::BaseUrl && validate_url(value).is_err() {
                Span::styled(value, style.fg(self.theme.get("url_invalid")))
            } else {
                Span::styled(value, style.fg(self.theme.get("text_primary")))
            };
            buf.set_style(rect, style);
            Paragraph::new(Line::from(span)).render(rect, buf);
        }

        if let Some(rect) = columns.next() {
            let url = build_utm_url(row);
            let color = if has_required_fields(row) {
                self.theme.get("url_valid")
            } else {
                self.theme.get("text_secondary")
            };
            Paragraph::new(url).style(row_style.fg(color)).render(rect, buf);
        }
    }
}

impl StatefulWidget for GridView<'_> {
    type State = GridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GridState) {
        state.hits.clear();
        let focus = self.builder.focus();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("table_border")))
            .title(format!(" Builder [{}] ", focus.label()));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let [header, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
        self.render_header(header, buf);

        let rows = self.builder.rows();
        let visible = body.height as usize;
        state.offset = state.offset.min(rows.len().saturating_sub(visible));
        if let Some(active) = focus.active_row() {
            state.scroll_to(active, visible);
        }

        for (i, row) in rows.iter().enumerate().skip(state.offset).take(visible) {
            let line = Rect::new(body.x, body.y + (i - state.offset) as u16, body.width, 1);
            self.render_row(i, row, line, buf, state);
        }
    }
}

/// Validation message for the base URL of the focused row, if it is rejected
pub fn active_problem(builder: &Builder) -> Option<String> {
    let index = builder.focus().active_row()?;
    let row = builder.rows().get(index)?;
    validate_url(&row.base_url)
        .err()
        .map(|problem| format!("Row {}: {}", index + 1, problem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_to_keeps_row_visible() {
        let mut state = GridState::default();
        state.scroll_to(12, 5);
        assert_eq!(state.offset, 8);
        state.scroll_to(3, 5);
        assert_eq!(state.offset, 3);
        state.scroll_to(5, 5);
        assert_eq!(state.offset, 3);
    }

    #[test]
    fn test_hit_at_tells_checkbox_from_cell() {
        let mut state = GridState::default();
        state.hits.push((Rect::new(1, 2, 3, 1), GridHit::Checkbox(0)));
        let cell = CellCoord::new(0, Field::BaseUrl);
        state.hits.push((Rect::new(5, 2, 20, 1), GridHit::Cell(cell)));
        assert_eq!(state.hit_at(2, 2), Some(GridHit::Checkbox(0)));
        assert_eq!(state.hit_at(10, 2), Some(GridHit::Cell(cell)));
        assert_eq!(state.hit_at(4, 2), None);
        assert_eq!(state.hit_at(2, 3), None);
    }
}
