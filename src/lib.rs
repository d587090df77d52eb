use chrono::Utc;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, Tabs, Wrap};

pub mod builder;
pub mod clipboard;
pub mod config;
pub mod focus;
pub mod history;
pub mod keyboard;
pub mod logging;
pub mod row;
pub mod saved;
pub mod storage;
pub mod toast;
pub mod utm;
pub mod widgets;

pub use builder::{Builder, BuilderOptions};
pub use clipboard::{ArboardClipboard, MemoryClipboard, SystemClipboard};
pub use config::{AppConfig, ConfigManager, Theme};
pub use focus::Focus;
pub use saved::{SavedItem, SavedItems};
pub use storage::Storage;
pub use utmgrid_cli::Args;

use keyboard::{global_shortcut, Shortcut};
use storage::Debouncer;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::grid::{active_problem, GridHit, GridState, GridView};
use widgets::saved_list::{SavedListState, SavedListView};
use widgets::toast::ToastView;

/// Application name used for config and data directories
pub const APP_NAME: &str = "utmgrid";

pub enum AppEvent {
    Key(KeyEvent),
    /// Left click at a terminal position (column, row)
    Click(u16, u16),
    /// Nothing arrived within the poll interval
    Tick,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Builder,
    Saved,
}

/// Destructive action waiting for a yes/no answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    Reset,
    DeleteSaved(String),
    DeleteAllSaved,
}

pub struct App {
    builder: Builder,
    saved: SavedItems,
    saved_state: SavedListState,
    storage: Storage,
    autosave: Debouncer,
    tab: Tab,
    confirm: Option<Confirm>,
    grid_state: GridState,
    theme: Theme,
    show_row_numbers: bool,
    url_min_width: u16,
    debug: DebugState,
}

impl App {
    /// Build the application from configuration, loading rows and saved links from `storage`
    pub fn new(
        config: &AppConfig,
        storage: Storage,
        clipboard: Box<dyn SystemClipboard>,
    ) -> Result<App> {
        let theme = Theme::from_config(&config.theme)?;
        let snapshot = storage::load_rows(&storage, config.display.default_rows);
        let saved = SavedItems::new(storage::load_saved(&storage));
        info!(
            rows = snapshot.rows.len(),
            saved = saved.len(),
            dir = %storage.dir().display(),
            "loaded state"
        );

        let options = BuilderOptions {
            max_history: config.history.max_entries,
            toast_duration: Duration::from_millis(config.notifications.toast_duration_ms),
        };
        let mut builder = Builder::new(snapshot, clipboard, options);
        builder.set_editor_colors(theme.get("text_primary"), theme.get("cursor_focused"));

        let mut app = App {
            builder,
            saved,
            saved_state: SavedListState::default(),
            storage,
            autosave: Debouncer::new(Duration::from_millis(config.autosave.debounce_ms)),
            tab: Tab::Builder,
            confirm: None,
            grid_state: GridState::default(),
            theme,
            show_row_numbers: config.display.show_row_numbers,
            url_min_width: config.display.url_column_min_width,
            debug: DebugState::default(),
        };
        if config.debug.enabled {
            app.enable_debug();
        }
        Ok(app)
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn saved(&self) -> &SavedItems {
        &self.saved
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn confirm(&self) -> Option<&Confirm> {
        self.confirm.as_ref()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn saved_selection(&self) -> Option<usize> {
        self.saved_state.selected()
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Click(column, row) => {
                self.click(*column, *row);
                None
            }
            AppEvent::Tick => {
                self.tick(Instant::now());
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        // Terminals that report releases would otherwise apply every key twice
        if key.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(key);

        let mut next = None;
        if self.confirm.is_some() {
            self.confirm_key(key);
        } else if let Some(shortcut) = global_shortcut(key, self.typing()) {
            self.debug.last_action = format!("{:?}", shortcut);
            next = self.shortcut(shortcut);
        } else {
            match self.tab {
                Tab::Builder => {
                    let handled = self.builder.handle_key(key);
                    self.debug.last_action =
                        format!("{} key handled={}", self.builder.focus().label(), handled);
                }
                Tab::Saved => {
                    self.saved_key(key);
                    self.debug.last_action = "saved key".to_string();
                }
            }
        }

        self.builder.settle();
        self.after_change(Instant::now());
        next
    }

    /// True while a text field owns the keyboard
    fn typing(&self) -> bool {
        match self.tab {
            Tab::Builder => self.builder.is_editing(),
            Tab::Saved => self.saved_state.is_editing_comment(),
        }
    }

    fn shortcut(&mut self, shortcut: Shortcut) -> Option<AppEvent> {
        match shortcut {
            Shortcut::Quit => return Some(AppEvent::Exit),
            Shortcut::SwitchTab => self.switch_tab(),
            Shortcut::SaveSelected => self.save_selected(),
            // The rest act on the grid and only make sense while it is on screen
            _ if self.tab != Tab::Builder => {}
            Shortcut::Undo => {
                self.builder.undo();
            }
            Shortcut::Redo => {
                self.builder.redo();
            }
            Shortcut::ToggleSelectAll => self.builder.toggle_select_all(),
            Shortcut::AddRow => self.builder.add_row(),
            Shortcut::Reset => self.confirm = Some(Confirm::Reset),
            Shortcut::CopyUrl => self.builder.copy_focused_url(),
            Shortcut::OpenUrl => self.builder.open_focused_url(),
            Shortcut::DeleteRow => self.builder.delete_focused_row(),
        }
        None
    }

    fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Builder => {
                self.builder.set_focus(Focus::Idle);
                Tab::Saved
            }
            Tab::Saved => {
                self.saved_state.editing = None;
                Tab::Builder
            }
        };
    }

    fn save_selected(&mut self) {
        let items = self.builder.save_selected(Utc::now());
        if items.is_empty() {
            return;
        }
        self.saved.extend(items);
        self.persist_saved();
    }

    fn confirm_key(&mut self, key: &KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        if !answer {
            return;
        }
        match confirm {
            Confirm::Reset => self.builder.reset(),
            Confirm::DeleteSaved(id) => {
                if self.saved.delete(&id) {
                    self.persist_saved();
                    self.saved_state.clamp(self.saved.len());
                    self.builder.toasts_mut().success("Saved link deleted");
                }
            }
            Confirm::DeleteAllSaved => {
                self.saved.delete_all();
                self.persist_saved();
                self.saved_state.clamp(0);
                self.builder.toasts_mut().success("All saved links deleted");
            }
        }
    }

    fn saved_key(&mut self, key: &KeyEvent) {
        if self.saved_state.is_editing_comment() {
            self.comment_key(key);
            return;
        }
        let len = self.saved.len();
        self.saved_state.clamp(len);
        let selected = self
            .saved_state
            .selected()
            .and_then(|i| self.saved.get(i))
            .cloned();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.saved_state.move_by(-1, len),
            KeyCode::Down | KeyCode::Char('j') => self.saved_state.move_by(1, len),
            KeyCode::Home => self.saved_state.move_by(-(len as isize), len),
            KeyCode::End => self.saved_state.move_by(len as isize, len),
            KeyCode::Char('D') => {
                if len > 0 {
                    self.confirm = Some(Confirm::DeleteAllSaved);
                }
            }
            _ => {
                let Some(item) = selected else {
                    return;
                };
                match key.code {
                    KeyCode::Enter | KeyCode::Char('c') => {
                        self.builder.copy_text(&item.full_url, "URL copied")
                    }
                    KeyCode::Char('o') => self.builder.open_link(&item.full_url),
                    KeyCode::Char('e') => self.saved_state.start_comment(&item.id, &item.comment),
                    KeyCode::Char('d') | KeyCode::Delete => {
                        self.confirm = Some(Confirm::DeleteSaved(item.id))
                    }
                    _ => {}
                }
            }
        }
    }

    fn comment_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Esc => self.saved_state.editing = None,
            KeyCode::Enter => {
                let Some(id) = self.saved_state.editing.take() else {
                    return;
                };
                let comment = self.saved_state.editor.value().to_string();
                if self.saved.update_comment(&id, &comment) {
                    self.persist_saved();
                    self.builder.toasts_mut().success("Comment saved");
                }
            }
            _ => {
                self.saved_state.editor.handle_key(key);
            }
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        if self.tab != Tab::Builder || self.confirm.is_some() {
            return;
        }
        match self.grid_state.hit_at(column, row) {
            Some(GridHit::Checkbox(index)) => self.builder.toggle_row(index),
            Some(GridHit::Cell(cell)) => self.builder.focus_cell(cell.row, cell.field),
            None => return,
        }
        self.builder.settle();
        self.after_change(Instant::now());
    }

    fn after_change(&mut self, now: Instant) {
        if self.builder.take_rows_changed() {
            self.autosave.schedule(now);
        }
    }

    /// Expire toasts and write the rows once the autosave quiet period is over
    pub fn tick(&mut self, now: Instant) {
        self.builder.toasts_mut().expire(now);
        if self.autosave.due(now) {
            self.persist_rows();
        }
    }

    /// Write any pending autosave immediately; called on exit
    pub fn flush(&mut self) {
        if self.autosave.flush() {
            self.persist_rows();
        }
    }

    fn persist_rows(&mut self) {
        if let Err(e) = storage::save_rows(&self.storage, self.builder.snapshot()) {
            warn!("could not save rows: {}", e);
            self.builder
                .toasts_mut()
                .error(format!("Could not save rows: {}", e));
        }
    }

    fn persist_saved(&mut self) {
        if let Err(e) = storage::save_saved(&self.storage, self.saved.items()) {
            warn!("could not save links: {}", e);
            self.builder
                .toasts_mut()
                .error(format!("Could not save links: {}", e));
        }
    }

    fn confirm_message(&self, confirm: &Confirm) -> String {
        match confirm {
            Confirm::Reset => {
                "Reset the grid to a single empty row?\n\nCtrl+Z brings the rows back.".to_string()
            }
            Confirm::DeleteSaved(id) => {
                let name = self
                    .saved
                    .items()
                    .iter()
                    .find(|item| &item.id == id)
                    .map(|item| item.campaign_name.as_str())
                    .unwrap_or("");
                format!(
                    "Delete the saved link \"{}\"?\n\nThis action cannot be undone.",
                    name
                )
            }
            Confirm::DeleteAllSaved => format!(
                "Delete all {} saved links?\n\nThis action cannot be undone.",
                self.saved.len()
            ),
        }
    }

    fn render_confirm(&self, confirm: &Confirm, area: Rect, buf: &mut Buffer) {
        let confirm_area = centered_rect(area, 50, 7);
        Clear.render(confirm_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border")))
            .title(" Confirm ");
        let inner = block.inner(confirm_area);
        block.render(confirm_area, buf);

        let message = format!("{}\n[y] Yes   [n] No", self.confirm_message(confirm));
        Paragraph::new(message)
            .wrap(Wrap { trim: false })
            .centered()
            .render(inner, buf);
    }

    fn status_line(&self) -> Line<'static> {
        if self.tab == Tab::Builder {
            if let Some(problem) = active_problem(&self.builder) {
                return Line::styled(problem, Style::default().fg(self.theme.get("error")));
            }
        }
        let rows = self.builder.rows();
        let checked = rows.iter().filter(|r| r.selected).count();
        Line::styled(
            format!(
                " {} rows, {} checked, {} saved{}",
                rows.len(),
                checked,
                self.saved.len(),
                if self.autosave.is_pending() { " (saving...)" } else { "" }
            ),
            Style::default().fg(self.theme.get("text_secondary")),
        )
    }
}

/// Rect of `percent_x` width and `height` rows, centered in `area`
fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let width = width.max(30).min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Length(1), // Tabs
            Constraint::Fill(1),
            Constraint::Length(1), // Status
            Constraint::Length(1), // Controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let selected_tab = match self.tab {
            Tab::Builder => 0,
            Tab::Saved => 1,
        };
        Tabs::new(vec![
            Line::from(" Builder "),
            Line::from(format!(" Saved ({}) ", self.saved.len())),
        ])
        .select(selected_tab)
        .style(Style::default().fg(self.theme.get("text_secondary")))
        .highlight_style(
            Style::default()
                .fg(self.theme.get("primary"))
                .add_modifier(Modifier::BOLD),
        )
        .render(layout[0], buf);

        match self.tab {
            Tab::Builder => GridView::new(&self.builder, &self.theme)
                .with_row_numbers(self.show_row_numbers)
                .with_url_min_width(self.url_min_width)
                .render(layout[1], buf, &mut self.grid_state),
            Tab::Saved => SavedListView::new(&self.saved, &self.theme).render(
                layout[1],
                buf,
                &mut self.saved_state,
            ),
        }

        Paragraph::new(self.status_line()).render(layout[2], buf);

        let controls = if self.confirm.is_some() {
            Controls::confirm()
        } else {
            match self.tab {
                Tab::Builder => Controls::for_focus(self.builder.focus().mode())
                    .with_row_count(self.builder.rows().len()),
                Tab::Saved if self.saved_state.is_editing_comment() => Controls::comment(),
                Tab::Saved => Controls::saved(),
            }
        };
        controls
            .with_bg(self.theme.get("controls_bg"))
            .render(layout[3], buf);

        if self.debug.enabled {
            self.debug.focus = self.builder.focus().label().to_string();
            self.debug.undo_depth = self.builder.history().past_len();
            self.debug.redo_depth = self.builder.history().future_len();
            self.debug.autosave_pending = self.autosave.is_pending();
            (&self.debug).render(layout[4], buf);
        }

        if let Some(toast) = self.builder.toasts().current() {
            ToastView::new(toast, &self.theme).render(layout[1], buf);
        }

        if let Some(confirm) = &self.confirm {
            self.render_confirm(confirm, layout[1], buf);
        }
    }
}
