//! # OneClick Config
//!
//! Host configuration (TOML) and the settings collaborator implementations.

mod error;
mod loader;
mod schema;
mod store;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use store::{FileSettingsStore, MemorySettingsStore};
pub use validator::ConfigValidator;
