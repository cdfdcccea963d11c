//! # OneClick Protocols
//!
//! Shared definitions for the OneClick workspace. Contains only types,
//! collaborator traits and the error taxonomy - no implementations.
//!
//! ## Collaborator Traits
//!
//! - [`SettingsStore`] - Key-value preference store with change notifications
//! - [`HistoryStore`] - Append-only, capped call history
//!
//! ## Messages
//!
//! [`Command`] is the typed set of actions UI surfaces send to the host;
//! every command is answered with a [`Response`].

pub mod error;
pub mod history;
pub mod logs;
pub mod message;
pub mod settings;

pub use error::{CallError, ErrorOrigin, Stage, StoreError};
pub use history::{CallHistoryEntry, HistoryStore, MAX_HISTORY_ENTRIES};
pub use logs::{LogEntry, LogLevel};
pub use message::{CallResult, Command, LoginReport, Reply, Response};
pub use settings::{
    Credentials, SettingKey, Settings, SettingsChange, SettingsPatch, SettingsStore,
    DEFAULT_DIAL_PREFIX,
};
