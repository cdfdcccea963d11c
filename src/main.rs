//! OneClick - click-to-call through a Vaspian web PBX
//!
//! Main entry point for the OneClick host process and CLI.

mod cli;
mod cmd_host;
mod cmd_scan;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use oneclick_config::{ConfigLoader, HostConfig};
use oneclick_history::{LogBuffer, LogCaptureLayer};

use crate::cli::{Cli, Commands};

/// Get the .oneclick directory path.
fn oneclick_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".oneclick"))
        .unwrap_or_else(|| PathBuf::from(".oneclick"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing with console, file and debug-log-stream output.
///
/// Log files are written to ~/.oneclick/debug/ with daily rotation. The
/// console goes to stderr since stdout carries command responses.
fn init_tracing(logs: Arc<LogBuffer>) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = oneclick_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("oneclick")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop, so it has to live as long as the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_filter(env_filter()),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
        // The user-visible stream has its own toggle; it sees debug detail
        // regardless of RUST_LOG.
        .with(
            LogCaptureLayer::new(logs)
                .with_filter(Targets::new().with_target("oneclick", Level::DEBUG)),
        )
        .init();

    Ok(())
}

fn log_buffer(config: &HostConfig) -> Arc<LogBuffer> {
    let retention = chrono::Duration::hours(config.logging.retention_hours as i64);
    Arc::new(LogBuffer::with_limits(
        config.logging.debug,
        config.logging.max_entries,
        retention,
    ))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ConfigLoader::default_path);
    let config = ConfigLoader::load_or_default(&config_path)?;

    let logs = log_buffer(&config);
    init_tracing(logs.clone())?;
    info!("Using configuration {:?}", config_path);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Scan { file, host, insert } => {
            cmd_scan::run_scan(&config, &file, host.as_deref(), &insert).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Serve => {
            let host = cmd_host::build_host(&config, logs).await?;
            cmd_host::run_serve(&config, host).await?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let host = cmd_host::build_host(&config, logs).await?;
            let Some(command) = cmd_host::to_command(command) else {
                return Ok(ExitCode::FAILURE);
            };
            if cmd_host::run_once(&config, &host, command).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
