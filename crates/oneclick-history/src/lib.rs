//! # OneClick History
//!
//! The history collaborator (capped call log with editable notes) and the
//! user-visible debug log stream fed from `tracing`.

mod history;
mod logs;
mod persist;

pub use history::{FileHistoryStore, MemoryHistoryStore};
pub use logs::{
    LogBuffer, LogCaptureLayer, MAX_LOG_ENTRIES, RETENTION_HOURS, spawn_retention_sweep,
};
