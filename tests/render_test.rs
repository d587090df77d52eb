use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tempfile::TempDir;
use utmgrid::{App, AppConfig, AppEvent, MemoryClipboard, Storage};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) {
    terminal
        .draw(|frame| frame.render_widget(&mut *app, frame.area()))
        .unwrap();
}

#[test]
fn test_builder_tab_renders_headers_and_placeholders() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = App::new(
        &AppConfig::default(),
        Storage::new(temp_dir.path()),
        Box::new(MemoryClipboard::new()),
    )
    .unwrap();
    let mut terminal = Terminal::new(TestBackend::new(200, 20)).unwrap();
    draw(&mut terminal, &mut app);

    let text = buffer_text(&terminal);
    assert!(text.contains("Builder [IDLE]"));
    assert!(text.contains("Base URL"));
    assert!(text.contains("UTM URL"));
    assert!(text.contains("https://example.com"));
    assert!(text.contains("Rows: 3"));
}

#[test]
fn test_saved_tab_and_confirm_dialog_render() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = App::new(
        &AppConfig::default(),
        Storage::new(temp_dir.path()),
        Box::new(MemoryClipboard::new()),
    )
    .unwrap();
    let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();

    app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('t'),
        KeyModifiers::CONTROL,
    )));
    draw(&mut terminal, &mut app);
    assert!(buffer_text(&terminal).contains("No saved links yet"));

    app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('t'),
        KeyModifiers::CONTROL,
    )));
    app.event(&AppEvent::Key(KeyEvent::new(
        KeyCode::Char('r'),
        KeyModifiers::CONTROL,
    )));
    draw(&mut terminal, &mut app);
    assert!(buffer_text(&terminal).contains("Reset the grid"));
}

/// Terminal position of the first occurrence of `needle` on the first line containing `line_marker`
fn find_on_line(terminal: &Terminal<TestBackend>, line_marker: &str, needle: &str) -> (u16, u16) {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    let wanted: Vec<String> = needle.chars().map(String::from).collect();
    for y in area.top()..area.bottom() {
        let symbols: Vec<&str> = (area.left()..area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        if !symbols.concat().contains(line_marker) {
            continue;
        }
        if let Some(x) = symbols.windows(wanted.len()).position(|w| w == wanted.as_slice()) {
            return (area.left() + x as u16, y);
        }
    }
    panic!("{needle:?} not found on a line containing {line_marker:?}");
}

#[test]
fn test_clicks_toggle_checkbox_and_focus_cells() {
    let temp_dir = TempDir::new().unwrap();
    let mut app = App::new(
        &AppConfig::default(),
        Storage::new(temp_dir.path()),
        Box::new(MemoryClipboard::new()),
    )
    .unwrap();
    let mut terminal = Terminal::new(TestBackend::new(200, 20)).unwrap();
    draw(&mut terminal, &mut app);

    let (x, y) = find_on_line(&terminal, "https://example.com", "[ ]");
    app.event(&AppEvent::Click(x + 1, y));
    assert!(app.builder().rows()[0].selected);
    assert_eq!(app.builder().focus(), utmgrid::Focus::Idle);
    assert!(app.builder().history().can_undo());

    draw(&mut terminal, &mut app);
    let (x, y) = find_on_line(&terminal, "[x]", "google");
    app.event(&AppEvent::Click(x, y));
    assert_eq!(
        app.builder().focus(),
        utmgrid::Focus::Editing(utmgrid::row::CellCoord::new(0, utmgrid::row::Field::Source))
    );
}
