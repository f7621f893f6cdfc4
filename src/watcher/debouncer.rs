//! Burst debouncing for directory change events.
//!
//! Editors save via temp-file/rename sequences and bulk edits touch many
//! files at once. Since the store reloads the whole directory anyway, the
//! debouncer tracks one burst, not individual paths: every qualifying
//! event resets the window, and the burst is ready once it has been quiet
//! for the configured duration.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    /// Timestamp of the most recent event in the current burst.
    last_event: Option<Instant>,
    /// How long the directory must stay quiet before reloading.
    duration: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given window in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            last_event: None,
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Record a qualifying event, resetting the quiet window.
    pub fn record(&mut self) {
        self.last_event = Some(Instant::now());
    }

    /// Whether a burst is waiting to quiesce.
    pub fn has_pending(&self) -> bool {
        self.last_event.is_some()
    }

    /// True once the pending burst has been quiet for the full window.
    /// Clears the burst, so each one fires exactly once.
    pub fn take_ready(&mut self) -> bool {
        match self.last_event {
            Some(last) if last.elapsed() >= self.duration => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}
