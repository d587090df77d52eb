use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub enabled: bool,
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key_event_name: String,
    /// Last shortcut or key table that handled a key
    pub last_action: String,
    /// Focus mode label at render time
    pub focus: String,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub autosave_pending: bool,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}+{:?}", event.modifiers, event.code);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} last_key={} action={} focus={} undo={} redo={} autosave={} frames={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.last_action,
            self.focus,
            self.undo_depth,
            self.redo_depth,
            if self.autosave_pending { "pending" } else { "idle" },
            self.num_frames,
        ))
        .render(area, buf);
    }
}
