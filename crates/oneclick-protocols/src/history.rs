//! Call history collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum number of history entries kept; the oldest are evicted first.
pub const MAX_HISTORY_ENTRIES: usize = 500;

/// One successfully placed call.
///
/// `(phone_number, timestamp)` is the natural key of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallHistoryEntry {
    pub phone_number: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

impl CallHistoryEntry {
    /// New entry stamped with the current time and an empty note.
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self::at(phone_number, Utc::now())
    }

    pub fn at(phone_number: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            phone_number: phone_number.into(),
            timestamp,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn is_keyed(&self, phone_number: &str, timestamp: &DateTime<Utc>) -> bool {
        self.phone_number == phone_number && self.timestamp == *timestamp
    }
}

/// Append-only call history, capped at [`MAX_HISTORY_ENTRIES`].
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append an entry, returning it as stored.
    ///
    /// Implementations keep timestamps unique, so the returned timestamp
    /// may be later than the one supplied.
    async fn append(&self, entry: CallHistoryEntry) -> Result<CallHistoryEntry, StoreError>;

    /// All entries, oldest first.
    async fn list(&self) -> Result<Vec<CallHistoryEntry>, StoreError>;

    /// Replace the note of the entry keyed by `(phone_number, timestamp)`.
    ///
    /// Returns `false` when no entry matches.
    async fn update_note(
        &self,
        phone_number: &str,
        timestamp: &DateTime<Utc>,
        note: &str,
    ) -> Result<bool, StoreError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), StoreError>;
}
