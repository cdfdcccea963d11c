//! Typed message actions exchanged between UI surfaces and the host.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::CallHistoryEntry;
use crate::logs::LogEntry;

/// An action requested by a UI surface. One variant per action.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    MakeCall {
        phone_number: String,
    },
    TestLogin {
        tenant: String,
        extension: String,
        password: String,
    },
    Logout,
    GetLoginStatus,
    GetCallHistory,
    ClearCallHistory,
    UpdateCallNote {
        phone_number: String,
        timestamp: DateTime<Utc>,
        note: String,
    },
    GetLogs,
    ClearLogs,
    SetLogging {
        enabled: bool,
    },
}

impl Command {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Command::MakeCall { .. } => "makeCall",
            Command::TestLogin { .. } => "testLogin",
            Command::Logout => "logout",
            Command::GetLoginStatus => "getLoginStatus",
            Command::GetCallHistory => "getCallHistory",
            Command::ClearCallHistory => "clearCallHistory",
            Command::UpdateCallNote { .. } => "updateCallNote",
            Command::GetLogs => "getLogs",
            Command::ClearLogs => "clearLogs",
            Command::SetLogging { .. } => "setLogging",
        }
    }
}

// Hand-written so the testLogin password never reaches a log line.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MakeCall { phone_number } => f
                .debug_struct("MakeCall")
                .field("phone_number", phone_number)
                .finish(),
            Command::TestLogin {
                tenant, extension, ..
            } => f
                .debug_struct("TestLogin")
                .field("tenant", tenant)
                .field("extension", extension)
                .field("password", &"***")
                .finish(),
            Command::UpdateCallNote {
                phone_number,
                timestamp,
                note,
            } => f
                .debug_struct("UpdateCallNote")
                .field("phone_number", phone_number)
                .field("timestamp", timestamp)
                .field("note", note)
                .finish(),
            Command::SetLogging { enabled } => f
                .debug_struct("SetLogging")
                .field("enabled", enabled)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Outcome of a placed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResult {
    pub message: String,
    /// The number as sent to the call endpoint, dial prefix included.
    pub destination: String,
    /// The number as requested, without the dial prefix.
    pub phone_number: String,
    /// Extension the call was placed from.
    pub extension: String,
    /// Raw body returned by the call endpoint.
    #[serde(default)]
    pub response: String,
    /// Set when the login step succeeded without a session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Outcome of a credential test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReport {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Typed result payload of a [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Call(CallResult),
    Login(LoginReport),
    LoginStatus {
        #[serde(rename = "isLoggedIn")]
        is_logged_in: bool,
    },
    CallHistory {
        #[serde(rename = "callHistory")]
        call_history: Vec<CallHistoryEntry>,
    },
    NoteUpdated {
        updated: bool,
    },
    Logs {
        logs: Vec<LogEntry>,
    },
    Logging {
        enabled: bool,
    },
    Done,
}

/// `{success, result | error}` envelope returned for every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(reply: Reply) -> Self {
        Self {
            success: true,
            result: Some(reply),
            error: None,
        }
    }

    pub fn err(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result<E: fmt::Display>(result: Result<Reply, E>) -> Self {
        match result {
            Ok(reply) => Self::ok(reply),
            Err(e) => Self::err(e),
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
