//! Host configuration schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub vendor: VendorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub detect: DetectConfig,
}

/// Vendor PBX endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_call_path")]
    pub call_path: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            call_path: default_call_path(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://xtone.buf.vaspian.net".to_string()
}

fn default_login_path() -> String {
    "/webadmin/en/user/jsp/ProcessLogin.jsp".to_string()
}

fn default_call_path() -> String {
    "/webadmin/en/user/jsp/ProcessClickToCall.jsp".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("OneClick/{}", env!("CARGO_PKG_VERSION"))
}

/// Where settings, history and log snapshots are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.oneclick".to_string()
}

impl StorageConfig {
    /// Data directory with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(crate::ConfigLoader::expand_path(&self.data_dir))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir().join("history.json")
    }

    pub fn logs_path(&self) -> PathBuf {
        self.data_dir().join("logs.json")
    }
}

/// Debug log stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Initial state of the logging toggle when settings do not say otherwise.
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_entries: default_max_entries(),
            retention_hours: default_retention_hours(),
            sweep_interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

fn default_max_entries() -> usize {
    500
}

fn default_retention_hours() -> u64 {
    24
}

fn default_sweep_interval_minutes() -> u64 {
    60
}

/// Page scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    #[serde(default = "default_max_pending_mutations")]
    pub max_pending_mutations: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            max_pending_mutations: default_max_pending_mutations(),
        }
    }
}

fn default_max_pending_mutations() -> usize {
    1024
}
