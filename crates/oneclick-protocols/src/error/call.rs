//! Call and session errors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::StoreError;

/// Message shown when tenant, extension or password is missing.
pub const MISSING_CREDENTIALS: &str =
    "Please configure your Vaspian credentials (tenant, extension and password)";

/// Which protocol step a network failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    Call,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Login => f.write_str("login"),
            Stage::Call => f.write_str("call"),
        }
    }
}

/// The step of a dial sequence an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorOrigin {
    Request,
    Config,
    Login,
    Call,
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Invalid phone number: {0:?}")]
    InvalidNumber(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Login failed. Please check your credentials.")]
    Authentication { status: u16 },

    #[error("Session expired or cookies not sent properly. Please log in again.")]
    SessionExpired { url: String },

    #[error("Network error during {stage}: {message}")]
    Network { stage: Stage, message: String },

    #[error("Call failed: {status} {reason}")]
    CallFailed { status: u16, reason: String },

    #[error("A call is already in progress")]
    CallInProgress,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl CallError {
    /// Configuration error for missing credentials.
    pub fn missing_credentials() -> Self {
        Self::Configuration(MISSING_CREDENTIALS.to_string())
    }

    pub fn network(stage: Stage, err: impl fmt::Display) -> Self {
        Self::Network {
            stage,
            message: err.to_string(),
        }
    }

    pub fn origin(&self) -> ErrorOrigin {
        match self {
            CallError::InvalidNumber(_) | CallError::CallInProgress => ErrorOrigin::Request,
            CallError::Configuration(_) | CallError::Store(_) => ErrorOrigin::Config,
            CallError::Authentication { .. } => ErrorOrigin::Login,
            CallError::Network { stage, .. } => match stage {
                Stage::Login => ErrorOrigin::Login,
                Stage::Call => ErrorOrigin::Call,
            },
            CallError::SessionExpired { .. } | CallError::CallFailed { .. } => ErrorOrigin::Call,
        }
    }

    /// Whether the user has to re-enter credentials rather than simply retry.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            CallError::Authentication { .. } | CallError::SessionExpired { .. }
        )
    }
}
