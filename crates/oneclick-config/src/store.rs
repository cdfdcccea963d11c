//! Settings store implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use oneclick_protocols::{Settings, SettingsChange, SettingsPatch, SettingsStore, StoreError};
use tokio::fs;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-memory settings store for testing.
pub struct MemorySettingsStore {
    settings: RwLock<Settings>,
    changes: broadcast::Sender<SettingsChange>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            settings: RwLock::new(settings),
            changes,
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::install_defaults())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.settings.read().await.clone())
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let mut settings = self.settings.write().await;
        let keys = patch.apply(&mut settings);
        if !keys.is_empty() {
            // No receivers is fine.
            let _ = self.changes.send(SettingsChange { keys });
        }
        Ok(settings.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }
}

/// JSON file backed settings store.
///
/// The file is re-read on every `load`, so edits made by another process
/// are picked up on the next operation. Writes go through a temporary file
/// and a rename.
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<SettingsChange>,
}

impl FileSettingsStore {
    /// Open the store at `path`, writing install defaults if the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if !path.exists() {
            write_settings(&path, &Settings::install_defaults()).await?;
            info!("Installed default settings at {:?}", path);
        }

        debug!("FileSettingsStore initialized at {:?}", path);

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Settings, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Settings::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_settings(path: &Path, settings: &Settings) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        self.read().await
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut settings = self.read().await?;
        let keys = patch.apply(&mut settings);
        if keys.is_empty() {
            return Ok(settings);
        }

        write_settings(&self.path, &settings).await?;
        debug!("Settings updated: {:?}", keys);
        let _ = self.changes.send(SettingsChange { keys });
        Ok(settings)
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
