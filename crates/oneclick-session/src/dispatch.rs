//! Command dispatch for UI surfaces.

use std::sync::Arc;

use oneclick_history::LogBuffer;
use oneclick_protocols::{
    CallError, Command, Credentials, HistoryStore, Reply, Response, SettingsPatch, SettingsStore,
};
use tracing::{debug, warn};

use crate::orchestrator::CallOrchestrator;

/// Answers every [`Command`] with a [`Response`].
pub struct MessageHost {
    orchestrator: Arc<CallOrchestrator>,
    logs: Arc<LogBuffer>,
}

impl MessageHost {
    pub fn new(orchestrator: Arc<CallOrchestrator>, logs: Arc<LogBuffer>) -> Self {
        Self { orchestrator, logs }
    }

    pub fn orchestrator(&self) -> &Arc<CallOrchestrator> {
        &self.orchestrator
    }

    pub fn logs(&self) -> &Arc<LogBuffer> {
        &self.logs
    }

    pub async fn handle(&self, command: Command) -> Response {
        debug!("Handling {:?}", command);
        Response::from_result(self.dispatch(command).await)
    }

    async fn dispatch(&self, command: Command) -> Result<Reply, CallError> {
        match command {
            Command::MakeCall { phone_number } => self
                .orchestrator
                .place_call(&phone_number)
                .await
                .map(Reply::Call),
            Command::TestLogin {
                tenant,
                extension,
                password,
            } => self
                .orchestrator
                .test_login(&Credentials::new(tenant, extension, password))
                .await
                .map(Reply::Login),
            Command::Logout => {
                self.orchestrator.logout().await?;
                Ok(Reply::Done)
            }
            Command::GetLoginStatus => Ok(Reply::LoginStatus {
                is_logged_in: self.orchestrator.login_status().await?,
            }),
            Command::GetCallHistory => Ok(Reply::CallHistory {
                call_history: self.history().list().await?,
            }),
            Command::ClearCallHistory => {
                self.history().clear().await?;
                Ok(Reply::Done)
            }
            Command::UpdateCallNote {
                phone_number,
                timestamp,
                note,
            } => {
                let updated = self
                    .history()
                    .update_note(&phone_number, &timestamp, &note)
                    .await?;
                if !updated {
                    warn!(
                        "No call history entry for {} at {}",
                        phone_number,
                        timestamp.to_rfc3339()
                    );
                }
                Ok(Reply::NoteUpdated { updated })
            }
            Command::GetLogs => Ok(Reply::Logs {
                logs: self.logs.entries(),
            }),
            Command::ClearLogs => {
                self.logs.clear();
                Ok(Reply::Done)
            }
            Command::SetLogging { enabled } => {
                self.logs.set_enabled(enabled);
                self.settings()
                    .apply(SettingsPatch::new().debug_logging(enabled))
                    .await?;
                Ok(Reply::Logging { enabled })
            }
        }
    }

    fn history(&self) -> &Arc<dyn HistoryStore> {
        self.orchestrator.history()
    }

    fn settings(&self) -> &Arc<dyn SettingsStore> {
        self.orchestrator.settings()
    }
}
