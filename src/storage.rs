use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::history::GridSnapshot;
use crate::row::{default_rows, Rows};
use crate::saved::SavedItem;

/// Key holding the builder grid
pub const ROWS_KEY: &str = "utmBuilderRows";
/// Key holding the saved-items collection
pub const SAVED_KEY: &str = "utmSavedItems";

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// JSON key-value store: key `k` lives in `<dir>/k.json`
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn for_app(app_name: &str) -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| eyre!("Could not determine data directory"))?
            .join(app_name);
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Raw stored text, `None` when the key was never written
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(eyre!("Could not read {}: {}", key, e)),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.get_raw(key)? else {
            return Ok(None);
        };
        let value =
            serde_json::from_str(&text).map_err(|e| eyre!("Corrupt data in {}: {}", key, e))?;
        Ok(Some(value))
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string(value)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path_for(key))?;
        if let Err(e) = fs2::FileExt::try_lock_exclusive(&file) {
            tracing::warn!("could not lock {}: {}", key, e);
        }
        file.write_all(json.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedRows {
    Envelope(GridSnapshot),
    Bare(Rows),
}

/// Load the grid. Missing, corrupt or empty data gives `default_count` empty rows.
pub fn load_rows(storage: &Storage, default_count: usize) -> GridSnapshot {
    let loaded = match storage.get::<PersistedRows>(ROWS_KEY) {
        Ok(Some(PersistedRows::Envelope(snapshot))) => snapshot,
        Ok(Some(PersistedRows::Bare(rows))) => GridSnapshot::new(rows),
        Ok(None) => GridSnapshot::new(Vec::new()),
        Err(e) => {
            tracing::warn!("discarding stored rows: {}", e);
            GridSnapshot::new(Vec::new())
        }
    };
    if loaded.rows.is_empty() {
        return GridSnapshot::new(default_rows(default_count));
    }
    let len = loaded.rows.len();
    GridSnapshot {
        cursor: loaded.cursor.filter(|c| c.row < len),
        rows: loaded.rows,
    }
}

pub fn save_rows(storage: &Storage, snapshot: &GridSnapshot) -> Result<()> {
    storage.set(ROWS_KEY, snapshot)
}

/// Load saved items. Corrupt data is logged and treated as empty.
pub fn load_saved(storage: &Storage) -> Vec<SavedItem> {
    match storage.get::<Vec<SavedItem>>(SAVED_KEY) {
        Ok(items) => items.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("discarding saved items: {}", e);
            Vec::new()
        }
    }
}

pub fn save_saved(storage: &Storage, items: &[SavedItem]) -> Result<()> {
    storage.set(SAVED_KEY, items)
}

/// Trailing-edge timer: fires once, `delay` after the most recent `schedule`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the timer
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the quiet period has elapsed; clears the pending write
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clear and report any pending write, regardless of the deadline
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer_restarts_on_schedule() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        assert!(!debouncer.due(t0));
        debouncer.schedule(t0);
        debouncer.schedule(t0 + Duration::from_millis(300));
        assert!(!debouncer.due(t0 + Duration::from_millis(600)));
        assert!(debouncer.due(t0 + Duration::from_millis(800)));
        assert!(!debouncer.due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_debouncer_flush() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.flush());
        debouncer.schedule(Instant::now());
        assert!(debouncer.flush());
        assert!(!debouncer.is_pending());
    }
}
