//! User-visible debug log stream.
//!
//! [`LogCaptureLayer`] turns `oneclick*` tracing events into [`LogEntry`]s
//! held by a [`LogBuffer`]. The buffer only keeps non-error entries while
//! the logging toggle is on, is capped, and is swept of entries older than
//! the retention window.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use oneclick_protocols::{LogEntry, LogLevel, StoreError};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::layer::{Context, Layer};

use crate::persist::{read_json, write_json};

pub const MAX_LOG_ENTRIES: usize = 500;
pub const RETENTION_HOURS: i64 = 24;

const TARGET_PREFIX: &str = "oneclick";

struct LogState {
    entries: VecDeque<LogEntry>,
    enabled: bool,
}

/// Capped in-memory log with a logging toggle.
pub struct LogBuffer {
    state: Mutex<LogState>,
    capacity: usize,
    retention: chrono::Duration,
}

impl LogBuffer {
    pub fn new(enabled: bool) -> Self {
        Self::with_limits(enabled, MAX_LOG_ENTRIES, chrono::Duration::hours(RETENTION_HOURS))
    }

    pub fn with_limits(enabled: bool, capacity: usize, retention: chrono::Duration) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: VecDeque::new(),
                enabled,
            }),
            capacity: capacity.max(1),
            retention,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    /// Add an entry. Non-error entries are dropped while logging is off.
    ///
    /// Returns whether the entry was kept.
    pub fn record(&self, entry: LogEntry) -> bool {
        let mut state = self.state.lock();
        if !state.enabled && entry.level != LogLevel::Error {
            return false;
        }
        state.entries.push_back(entry);
        while state.entries.len() > self.capacity {
            state.entries.pop_front();
        }
        true
    }

    pub fn info(&self, message: impl Into<String>) -> bool {
        self.record(LogEntry::new(LogLevel::Info, message))
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
        self.info("Logs cleared");
    }

    /// Drop entries older than the retention window. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let removed = {
            let mut state = self.state.lock();
            let before = state.entries.len();
            state.entries.retain(|entry| entry.timestamp > cutoff);
            before - state.entries.len()
        };
        if removed > 0 {
            self.info(format!(
                "Flushed {} old log entries (keeping last {} hours)",
                removed,
                self.retention.num_hours()
            ));
        }
        removed
    }

    /// Replace the contents with a snapshot from `path`. A missing file leaves the buffer empty.
    pub async fn load(&self, path: &Path) -> Result<usize, StoreError> {
        let entries: Vec<LogEntry> = read_json(path).await?.unwrap_or_default();
        let mut state = self.state.lock();
        state.entries = entries.into();
        while state.entries.len() > self.capacity {
            state.entries.pop_front();
        }
        Ok(state.entries.len())
    }

    pub async fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let entries = self.entries();
        write_json(path, &entries).await
    }
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LogBuffer")
            .field("entries", &state.entries.len())
            .field("enabled", &state.enabled)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Run [`LogBuffer::sweep`] now and then every `interval`, persisting to `path` after each sweep.
pub fn spawn_retention_sweep(
    buffer: Arc<LogBuffer>,
    interval: Duration,
    path: Option<PathBuf>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            buffer.sweep(Utc::now());
            if let Some(path) = &path {
                if let Err(e) = buffer.persist(path).await {
                    warn!("Failed to persist logs to {:?}: {}", path, e);
                }
            }
        }
    })
}

/// `tracing` layer feeding a [`LogBuffer`].
pub struct LogCaptureLayer {
    buffer: Arc<LogBuffer>,
}

impl LogCaptureLayer {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(TARGET_PREFIX) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = match *metadata.level() {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warning,
            _ if visitor.success => LogLevel::Success,
            _ => LogLevel::Info,
        };

        let mut entry = LogEntry::new(level, visitor.message);
        if !visitor.fields.is_empty() {
            entry = entry.with_details(visitor.fields.join(" "));
        }
        self.buffer.record(entry);
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    success: bool,
    fields: Vec<String>,
}

impl Visit for EventVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "success" {
            self.success = value;
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
