//! Transient, non-blocking notifications.

use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_DURATION_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub until: Instant,
}

/// Queue of visible notifications; the newest one is displayed
#[derive(Debug)]
pub struct Toasts {
    items: Vec<Toast>,
    duration: Duration,
}

impl Toasts {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            duration,
        }
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.show_at(kind, message, Instant::now());
    }

    pub fn show_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        let message = message.into();
        match kind {
            ToastKind::Warning | ToastKind::Error => tracing::warn!("toast: {}", message),
            ToastKind::Success | ToastKind::Info => tracing::info!("toast: {}", message),
        }
        self.items.push(Toast {
            message,
            kind,
            until: now + self.duration,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    /// Drop expired toasts. Returns true when something disappeared.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.until > now);
        self.items.len() != before
    }

    pub fn current(&self) -> Option<&Toast> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TOAST_DURATION_MS))
    }
}
