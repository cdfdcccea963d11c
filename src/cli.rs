//! CLI definitions for OneClick.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};

/// OneClick CLI.
#[derive(Parser)]
#[command(name = "oneclick")]
#[command(about = "Click-to-call for phone numbers on web pages, through a Vaspian web PBX")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.oneclick/config.toml)
    #[arg(short, long, global = true, env = "ONECLICK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Answer JSON commands on stdin, one per line (default)
    Serve,

    /// Log in and place a call
    Call {
        /// Number to dial, e.g. "(716) 923-4121" or "1-855-VASPIAN"
        phone_number: String,
    },

    /// Check credentials against the PBX
    TestLogin {
        #[arg(long)]
        tenant: String,

        #[arg(long)]
        extension: String,

        #[arg(long, env = "ONECLICK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session and forget credentials and call history
    Logout,

    /// Show whether a usable session exists
    Status,

    /// Call history commands
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Debug log commands
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },

    /// Turn the debug log stream on or off
    SetLogging {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Wrap phone numbers in an HTML page and print the result
    Scan {
        /// HTML file to scan
        file: PathBuf,

        /// Hostname the page was loaded from, checked against the disabled sites
        #[arg(long)]
        host: Option<String>,

        /// HTML fragment appended to <body> after the initial scan (repeatable)
        #[arg(long)]
        insert: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum HistoryAction {
    /// List placed calls, oldest first
    List,

    /// Remove every entry
    Clear,

    /// Set the note of one entry
    Note {
        phone_number: String,

        /// Entry timestamp as listed, RFC 3339
        timestamp: DateTime<Utc>,

        note: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum LogsAction {
    /// List debug log entries
    List,

    /// Remove every entry
    Clear,
}
