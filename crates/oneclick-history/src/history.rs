//! Call history stores.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use oneclick_protocols::{CallHistoryEntry, HistoryStore, MAX_HISTORY_ENTRIES, StoreError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::persist::{read_json, write_json};

/// Capped, ordered entry log shared by both stores.
#[derive(Debug, Clone, Default)]
struct HistoryLog {
    entries: VecDeque<CallHistoryEntry>,
}

impl HistoryLog {
    fn from_entries(mut entries: Vec<CallHistoryEntry>) -> Self {
        entries.sort_by_key(|e| e.timestamp);
        let mut log = Self {
            entries: entries.into(),
        };
        log.evict();
        log
    }

    fn push(&mut self, mut entry: CallHistoryEntry) -> CallHistoryEntry {
        // Timestamps are half of the entry key, so they must not repeat.
        if let Some(last) = self.entries.back() {
            if entry.timestamp <= last.timestamp {
                entry.timestamp = last.timestamp + Duration::milliseconds(1);
            }
        }
        self.entries.push_back(entry.clone());
        self.evict();
        entry
    }

    fn evict(&mut self) {
        while self.entries.len() > MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
        }
    }

    fn update_note(&mut self, phone_number: &str, timestamp: &DateTime<Utc>, note: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.is_keyed(phone_number, timestamp))
        {
            Some(entry) => {
                entry.note = note.to_string();
                true
            }
            None => false,
        }
    }

    fn to_vec(&self) -> Vec<CallHistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

/// In-memory history store.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    log: RwLock<HistoryLog>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: CallHistoryEntry) -> Result<CallHistoryEntry, StoreError> {
        Ok(self.log.write().await.push(entry))
    }

    async fn list(&self) -> Result<Vec<CallHistoryEntry>, StoreError> {
        Ok(self.log.read().await.to_vec())
    }

    async fn update_note(
        &self,
        phone_number: &str,
        timestamp: &DateTime<Utc>,
        note: &str,
    ) -> Result<bool, StoreError> {
        let updated = self.log.write().await.update_note(phone_number, timestamp, note);
        if !updated {
            warn!(phone_number, %timestamp, "No call history entry to update");
        }
        Ok(updated)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.log.write().await.entries.clear();
        Ok(())
    }
}

/// History store persisted as a JSON array, oldest entry first.
pub struct FileHistoryStore {
    path: PathBuf,
    log: Mutex<HistoryLog>,
}

impl FileHistoryStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: Vec<CallHistoryEntry> = read_json(&path).await?.unwrap_or_default();
        debug!(entries = entries.len(), "FileHistoryStore opened at {:?}", path);

        Ok(Self {
            path,
            log: Mutex::new(HistoryLog::from_entries(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, log: &HistoryLog) -> Result<(), StoreError> {
        write_json(&self.path, &log.to_vec()).await
    }
}

// Mutations are applied to a copy and only become visible once saved, so
// memory never runs ahead of the file.
#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn append(&self, entry: CallHistoryEntry) -> Result<CallHistoryEntry, StoreError> {
        let mut log = self.log.lock().await;
        let mut next = log.clone();
        let stored = next.push(entry);
        self.save(&next).await?;
        *log = next;
        info!("Added {} to call history", stored.phone_number);
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<CallHistoryEntry>, StoreError> {
        Ok(self.log.lock().await.to_vec())
    }

    async fn update_note(
        &self,
        phone_number: &str,
        timestamp: &DateTime<Utc>,
        note: &str,
    ) -> Result<bool, StoreError> {
        let mut log = self.log.lock().await;
        let mut next = log.clone();
        if !next.update_note(phone_number, timestamp, note) {
            warn!(phone_number, %timestamp, "No call history entry to update");
            return Ok(false);
        }
        self.save(&next).await?;
        *log = next;
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut log = self.log.lock().await;
        let next = HistoryLog::default();
        self.save(&next).await?;
        *log = next;
        info!("Call history cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
