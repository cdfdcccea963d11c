//! Message host: `serve` and the one-shot command handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use oneclick_config::{FileSettingsStore, HostConfig};
use oneclick_history::{FileHistoryStore, LogBuffer, spawn_retention_sweep};
use oneclick_protocols::{Command, Response, SettingsStore};
use oneclick_session::{CallOrchestrator, MessageHost, SessionClient};

use crate::cli::{Commands, HistoryAction, LogsAction};

/// Open the stores under the data directory and wire up a [`MessageHost`].
pub(crate) async fn build_host(
    config: &HostConfig,
    logs: Arc<LogBuffer>,
) -> Result<MessageHost, Box<dyn std::error::Error>> {
    let storage = &config.storage;
    let settings = Arc::new(FileSettingsStore::open(storage.settings_path()).await?);
    let history = Arc::new(FileHistoryStore::open(storage.history_path()).await?);

    let loaded = logs.load(&storage.logs_path()).await?;
    debug!("Loaded {} log entries", loaded);
    let debug_logging = settings.load().await?.debug_logging;
    logs.set_enabled(debug_logging || config.logging.debug);

    let client = Arc::new(SessionClient::new(&config.vendor)?);
    let orchestrator = Arc::new(CallOrchestrator::new(settings, history, client));
    Ok(MessageHost::new(orchestrator, logs))
}

/// Map a one-shot subcommand to the message it stands for.
pub(crate) fn to_command(command: Commands) -> Option<Command> {
    let command = match command {
        Commands::Call { phone_number } => Command::MakeCall { phone_number },
        Commands::TestLogin {
            tenant,
            extension,
            password,
        } => Command::TestLogin {
            tenant,
            extension,
            password,
        },
        Commands::Logout => Command::Logout,
        Commands::Status => Command::GetLoginStatus,
        Commands::History { action } => match action {
            HistoryAction::List => Command::GetCallHistory,
            HistoryAction::Clear => Command::ClearCallHistory,
            HistoryAction::Note {
                phone_number,
                timestamp,
                note,
            } => Command::UpdateCallNote {
                phone_number,
                timestamp,
                note,
            },
        },
        Commands::Logs { action } => match action {
            LogsAction::List => Command::GetLogs,
            LogsAction::Clear => Command::ClearLogs,
        },
        Commands::SetLogging { enabled } => Command::SetLogging { enabled },
        Commands::Serve | Commands::Scan { .. } => return None,
    };
    Some(command)
}

/// Handle a single command and print its response. Returns whether it succeeded.
pub(crate) async fn run_once(
    config: &HostConfig,
    host: &MessageHost,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    host.logs().sweep(Utc::now());
    let response = host.handle(command).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    persist_logs(config, host).await;
    Ok(response.success)
}

/// Read one JSON command per line from stdin and answer each on stdout.
pub(crate) async fn run_serve(
    config: &HostConfig,
    host: MessageHost,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_secs(config.logging.sweep_interval_minutes.saturating_mul(60));
    let sweep = spawn_retention_sweep(
        host.logs().clone(),
        interval,
        Some(config.storage.logs_path()),
    );
    let watch = spawn_settings_watch(&host);

    info!("OneClick message host ready");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(command) => host.handle(command).await,
            Err(e) => {
                warn!("Rejected message: {}", e);
                Response::err(format!("Invalid message: {}", e))
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;

        persist_logs(config, &host).await;
    }

    info!("Input closed, shutting down");
    sweep.abort();
    watch.abort();
    Ok(())
}

/// Log settings changes that matter to running pages.
fn spawn_settings_watch(host: &MessageHost) -> tokio::task::JoinHandle<()> {
    let mut changes = host.orchestrator().settings().subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    debug!("Settings changed: {:?}", change.keys);
                    if change.affects_click_to_call() {
                        info!("Click-to-call settings changed, open pages need to be re-scanned");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Settings watch lagged, skipped {} changes", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn persist_logs(config: &HostConfig, host: &MessageHost) {
    if let Err(e) = host.logs().persist(&config.storage.logs_path()).await {
        warn!("Failed to persist logs: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_command_mapping() {
        assert_eq!(
            to_command(Commands::Call {
                phone_number: "7169234121".to_string()
            }),
            Some(Command::MakeCall {
                phone_number: "7169234121".to_string()
            })
        );
        assert_eq!(to_command(Commands::Status), Some(Command::GetLoginStatus));
        assert_eq!(
            to_command(Commands::Logs {
                action: LogsAction::Clear
            }),
            Some(Command::ClearLogs)
        );
        assert_eq!(to_command(Commands::Serve), None);
    }

    #[tokio::test]
    async fn test_build_host_in_temp_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = HostConfig::default();
        config.storage.data_dir = dir.path().to_string_lossy().into_owned();

        let logs = Arc::new(LogBuffer::new(false));
        let host = build_host(&config, logs).await.unwrap();

        assert!(config.storage.settings_path().exists());
        let response = host.handle(Command::GetCallHistory).await;
        assert!(response.success);

        assert!(run_once(&config, &host, Command::ClearLogs).await.unwrap());
        assert!(config.storage.logs_path().exists());
    }
}
