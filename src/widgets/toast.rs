use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::config::Theme;
use crate::toast::{Toast, ToastKind};

/// Newest toast, drawn in the top-right corner over whatever is below
pub struct ToastView<'a> {
    toast: &'a Toast,
    theme: &'a Theme,
}

impl<'a> ToastView<'a> {
    pub fn new(toast: &'a Toast, theme: &'a Theme) -> Self {
        Self { toast, theme }
    }

    /// Where the toast goes inside `area`
    pub fn area(&self, area: Rect) -> Rect {
        let width = (self.toast.message.chars().count() as u16 + 4)
            .min(area.width)
            .max(12.min(area.width));
        let height = 3.min(area.height);
        Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y + 1.min(area.height.saturating_sub(height)),
            width,
            height,
        )
    }
}

impl Widget for ToastView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = match self.toast.kind {
            ToastKind::Success => self.theme.get("success"),
            ToastKind::Info => self.theme.get("info"),
            ToastKind::Warning => self.theme.get("warning"),
            ToastKind::Error => self.theme.get("error"),
        };
        let rect = self.area(area);
        Clear.render(rect, buf);
        Paragraph::new(self.toast.message.as_str())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            )
            .render(rect, buf);
    }
}
