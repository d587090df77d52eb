use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::focus::FocusMode;

type Hints = &'static [(&'static str, &'static str)];

const IDLE: Hints = &[
    ("Enter", "Edit"),
    ("^N", "Add row"),
    ("^A", "Check all"),
    ("^S", "Save"),
    ("^T", "Saved"),
    ("^Q", "Quit"),
];

const EDITING: Hints = &[
    ("Esc", "Select"),
    ("Tab", "Next"),
    ("Enter", "Down"),
    ("^Z", "Undo"),
    ("^U", "Copy URL"),
    ("^O", "Open"),
    ("^S", "Save"),
];

const CELLS: Hints = &[
    ("Enter", "Edit"),
    ("S-Arrows", "Extend"),
    ("^C", "Copy"),
    ("^V", "Paste"),
    ("Del", "Clear"),
    ("Esc", "Row"),
];

const ROWS: Hints = &[
    ("Space", "Check"),
    ("S-Up/Down", "Extend"),
    ("^C", "Copy"),
    ("^V", "Paste"),
    ("Del", "Delete"),
    ("Esc", "Edit"),
];

const SAVED: Hints = &[
    ("Enter", "Copy URL"),
    ("o", "Open"),
    ("e", "Comment"),
    ("d", "Delete"),
    ("D", "Delete all"),
    ("^T", "Builder"),
    ("^Q", "Quit"),
];

const COMMENT: Hints = &[("Enter", "Save comment"), ("Esc", "Cancel")];

const CONFIRM: Hints = &[("y", "Confirm"), ("n", "Cancel")];

/// Bottom bar of key hints for whatever currently owns the keyboard
pub struct Controls {
    hints: Hints,
    pub row_count: Option<usize>,
    pub bg: Color,
}

impl Controls {
    fn with_hints(hints: Hints) -> Self {
        Self {
            hints,
            row_count: None,
            bg: Color::DarkGray,
        }
    }

    pub fn for_focus(mode: FocusMode) -> Self {
        Self::with_hints(match mode {
            FocusMode::Idle => IDLE,
            FocusMode::Editing => EDITING,
            FocusMode::CellSelection => CELLS,
            FocusMode::RowSelection => ROWS,
        })
    }

    pub fn saved() -> Self {
        Self::with_hints(SAVED)
    }

    pub fn comment() -> Self {
        Self::with_hints(COMMENT)
    }

    pub fn confirm() -> Self {
        Self::with_hints(CONFIRM)
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    pub fn hints(&self) -> Hints {
        self.hints
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        if self.row_count.is_some() {
            constraints.push(Constraint::Length(12)); // "Rows: 1234"
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = Style::default();

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = self.hints.len() * 2;
        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(base_style.bg(self.bg))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}
