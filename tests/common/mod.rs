use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::rc::Rc;
use utmgrid::clipboard::SystemClipboard;
use utmgrid::history::GridSnapshot;
use utmgrid::row::Row;
use utmgrid::{Builder, BuilderOptions};

/// Clipboard whose contents stay readable after it is boxed into a builder
#[derive(Clone, Default)]
pub struct SharedClipboard(pub Rc<RefCell<Option<String>>>);

impl SharedClipboard {
    pub fn text(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

impl SystemClipboard for SharedClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.0
            .borrow()
            .clone()
            .ok_or_else(|| color_eyre::eyre::eyre!("Clipboard is empty"))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        *self.0.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

/// Row with `s{i}`/`m{i}`/`c{i}` in source, medium and campaign
#[allow(dead_code)]
pub fn sample_row(i: usize) -> Row {
    let mut row = Row::new_empty();
    row.base_url = format!("https://site{}.com", i);
    row.source = format!("s{}", i);
    row.medium = format!("m{}", i);
    row.campaign = format!("c{}", i);
    row
}

#[allow(dead_code)]
pub fn builder_with(rows: Vec<Row>) -> (Builder, SharedClipboard) {
    let clipboard = SharedClipboard::default();
    let builder = Builder::new(
        GridSnapshot::new(rows.into_iter().map(Rc::new).collect()),
        Box::new(clipboard.clone()),
        BuilderOptions::default(),
    );
    (builder, clipboard)
}

/// Send one key and settle history, like the app does per event
#[allow(dead_code)]
pub fn press(builder: &mut Builder, code: KeyCode, modifiers: KeyModifiers) -> bool {
    let handled = builder.handle_key(&KeyEvent::new(code, modifiers));
    builder.settle();
    handled
}

#[allow(dead_code)]
pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}
