//! Query debounce control
//!
//! Collapses a rapid burst of query edits into a single search trigger:
//! only the last value within the quiet window survives. Deadline-based so
//! the owning event loop can wait on it with `tokio::time::sleep_until`.

use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge debouncer for typed query text.
#[derive(Debug)]
pub struct QueryDebouncer {
    /// Quiet period before a pending query fires
    delay: Duration,
    /// Most recent (trimmed) input, waiting for the window to elapse
    pending: Option<String>,
    /// When the pending query becomes eligible to fire
    deadline: Option<Instant>,
    /// Last value that actually fired, for consecutive-duplicate suppression
    last_fired: Option<String>,
}

impl QueryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
            last_fired: None,
        }
    }

    /// Record a query edit and restart the quiet window.
    pub fn note_input(&mut self, text: &str) {
        self.pending = Some(text.trim().to_string());
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Deadline the event loop should sleep until, if anything is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the pending query once its deadline has been reached.
    ///
    /// Returns `None` when nothing is pending or when the pending value
    /// equals the immediately previous fired value (identical consecutive
    /// queries must not restart a fetch).
    pub fn fire(&mut self) -> Option<String> {
        self.deadline = None;
        let query = self.pending.take()?;
        if self.last_fired.as_deref() == Some(query.as_str()) {
            log::debug!("suppressing duplicate debounced query: {:?}", query);
            return None;
        }
        self.last_fired = Some(query.clone());
        Some(query)
    }

    /// Mark a query as fired outside the debounce path (explicit search),
    /// so a later identical debounced value is still suppressed.
    pub fn record_fired(&mut self, query: &str) {
        self.last_fired = Some(query.trim().to_string());
    }
}
