//! Settings collaborator: user preferences, credentials and change notifications.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Dial prefix written on first install.
pub const DEFAULT_DIAL_PREFIX: &str = "8";

fn default_true() -> bool {
    true
}

/// Persisted user preferences, keyed as the settings UI writes them.
///
/// Every key may be absent in storage; absent keys take the defaults below.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub tenant: String,

    #[serde(default)]
    pub extension: String,

    #[serde(default)]
    pub password: String,

    /// `None` when the key has never been written; `Some("")` means "no prefix".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dial_prefix: Option<String>,

    #[serde(default = "default_true")]
    pub click_to_call_enabled: bool,

    #[serde(default)]
    pub click_to_call_disabled_sites: Vec<String>,

    /// Cached login indicator for the UI. Never authoritative.
    #[serde(default)]
    pub is_logged_in: bool,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_true")]
    pub use_sidebar: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tenant: String::new(),
            extension: String::new(),
            password: String::new(),
            dial_prefix: None,
            click_to_call_enabled: true,
            click_to_call_disabled_sites: Vec::new(),
            is_logged_in: false,
            debug_logging: false,
            use_sidebar: true,
        }
    }
}

impl Settings {
    /// Preferences written on first install.
    pub fn install_defaults() -> Self {
        Self {
            dial_prefix: Some(DEFAULT_DIAL_PREFIX.to_string()),
            ..Self::default()
        }
    }

    /// The configured dial prefix, empty when none is set.
    pub fn dial_prefix(&self) -> &str {
        self.dial_prefix.as_deref().unwrap_or("")
    }

    /// Complete credentials, or `None` if any of tenant/extension/password is empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let credentials = Credentials::new(&self.tenant, &self.extension, &self.password);
        credentials.is_complete().then_some(credentials)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tenant", &self.tenant)
            .field("extension", &self.extension)
            .field("password", &"***")
            .field("dial_prefix", &self.dial_prefix)
            .field("click_to_call_enabled", &self.click_to_call_enabled)
            .field("click_to_call_disabled_sites", &self.click_to_call_disabled_sites)
            .field("is_logged_in", &self.is_logged_in)
            .field("debug_logging", &self.debug_logging)
            .field("use_sidebar", &self.use_sidebar)
            .finish()
    }
}

/// Credentials for the vendor login step. Read per call, never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant: String,
    pub extension: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        tenant: impl Into<String>,
        extension: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            extension: extension.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.tenant.is_empty() && !self.extension.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("extension", &self.extension)
            .field("password", &"***")
            .finish()
    }
}

/// Individual settings keys, used in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    Tenant,
    Extension,
    Password,
    DialPrefix,
    ClickToCallEnabled,
    ClickToCallDisabledSites,
    IsLoggedIn,
    DebugLogging,
    UseSidebar,
}

impl SettingKey {
    /// Changes to these keys require pages to re-evaluate click-to-call.
    pub fn affects_click_to_call(&self) -> bool {
        matches!(
            self,
            SettingKey::ClickToCallEnabled | SettingKey::ClickToCallDisabledSites
        )
    }
}

/// Notification broadcast after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub keys: Vec<SettingKey>,
}

impl SettingsChange {
    pub fn touches(&self, key: SettingKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn affects_click_to_call(&self) -> bool {
        self.keys.iter().any(SettingKey::affects_click_to_call)
    }
}

/// A partial write to the settings store. Unset fields are left untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub tenant: Option<String>,
    pub extension: Option<String>,
    pub password: Option<String>,
    pub dial_prefix: Option<String>,
    pub click_to_call_enabled: Option<bool>,
    pub click_to_call_disabled_sites: Option<Vec<String>>,
    pub is_logged_in: Option<bool>,
    pub debug_logging: Option<bool>,
    pub use_sidebar: Option<bool>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: &Credentials) -> Self {
        self.tenant = Some(credentials.tenant.clone());
        self.extension = Some(credentials.extension.clone());
        self.password = Some(credentials.password.clone());
        self
    }

    /// Blank out tenant, extension and password.
    pub fn clear_credentials(mut self) -> Self {
        self.tenant = Some(String::new());
        self.extension = Some(String::new());
        self.password = Some(String::new());
        self
    }

    pub fn dial_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.dial_prefix = Some(prefix.into());
        self
    }

    pub fn click_to_call_enabled(mut self, enabled: bool) -> Self {
        self.click_to_call_enabled = Some(enabled);
        self
    }

    pub fn disabled_sites(mut self, sites: Vec<String>) -> Self {
        self.click_to_call_disabled_sites = Some(sites);
        self
    }

    pub fn logged_in(mut self, logged_in: bool) -> Self {
        self.is_logged_in = Some(logged_in);
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = Some(enabled);
        self
    }

    pub fn use_sidebar(mut self, enabled: bool) -> Self {
        self.use_sidebar = Some(enabled);
        self
    }

    /// Apply to `settings`, returning the keys whose value actually changed.
    pub fn apply(self, settings: &mut Settings) -> Vec<SettingKey> {
        let mut changed = Vec::new();

        fn set<T: PartialEq>(
            slot: &mut T,
            value: Option<T>,
            key: SettingKey,
            changed: &mut Vec<SettingKey>,
        ) {
            if let Some(value) = value {
                if *slot != value {
                    *slot = value;
                    changed.push(key);
                }
            }
        }

        set(&mut settings.tenant, self.tenant, SettingKey::Tenant, &mut changed);
        set(&mut settings.extension, self.extension, SettingKey::Extension, &mut changed);
        set(&mut settings.password, self.password, SettingKey::Password, &mut changed);
        set(
            &mut settings.dial_prefix,
            self.dial_prefix.map(Some),
            SettingKey::DialPrefix,
            &mut changed,
        );
        set(
            &mut settings.click_to_call_enabled,
            self.click_to_call_enabled,
            SettingKey::ClickToCallEnabled,
            &mut changed,
        );
        set(
            &mut settings.click_to_call_disabled_sites,
            self.click_to_call_disabled_sites,
            SettingKey::ClickToCallDisabledSites,
            &mut changed,
        );
        set(&mut settings.is_logged_in, self.is_logged_in, SettingKey::IsLoggedIn, &mut changed);
        set(
            &mut settings.debug_logging,
            self.debug_logging,
            SettingKey::DebugLogging,
            &mut changed,
        );
        set(&mut settings.use_sidebar, self.use_sidebar, SettingKey::UseSidebar, &mut changed);

        changed
    }
}

impl fmt::Debug for SettingsPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsPatch")
            .field("tenant", &self.tenant)
            .field("extension", &self.extension)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("dial_prefix", &self.dial_prefix)
            .field("click_to_call_enabled", &self.click_to_call_enabled)
            .field("click_to_call_disabled_sites", &self.click_to_call_disabled_sites)
            .field("is_logged_in", &self.is_logged_in)
            .field("debug_logging", &self.debug_logging)
            .field("use_sidebar", &self.use_sidebar)
            .finish()
    }
}

/// Read/write preference store with change notifications.
///
/// Callers re-read on every operation instead of caching settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the current settings. Absent keys take their defaults.
    async fn load(&self) -> Result<Settings, StoreError>;

    /// Write a partial update and notify subscribers of changed keys.
    async fn apply(&self, patch: SettingsPatch) -> Result<Settings, StoreError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SettingsChange>;
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
