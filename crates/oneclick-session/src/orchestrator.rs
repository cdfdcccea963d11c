//! Call orchestration: settings, login, prefix, call, history.

use std::sync::Arc;

use oneclick_detect::DialRequest;
use oneclick_protocols::{
    CallError, CallHistoryEntry, CallResult, Credentials, DEFAULT_DIAL_PREFIX, HistoryStore,
    LoginReport, SettingsPatch, SettingsStore,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::client::{SessionClient, SessionState};

/// Drives a dial sequence end to end.
///
/// Only one sequence runs at a time; a second `place_call` while one is in
/// flight fails with [`CallError::CallInProgress`] instead of queuing.
pub struct CallOrchestrator {
    settings: Arc<dyn SettingsStore>,
    history: Arc<dyn HistoryStore>,
    client: Arc<SessionClient>,
    in_flight: Mutex<()>,
}

impl CallOrchestrator {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        history: Arc<dyn HistoryStore>,
        client: Arc<SessionClient>,
    ) -> Self {
        Self {
            settings,
            history,
            client,
            in_flight: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &Arc<SessionClient> {
        &self.client
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Log in and place a call to `raw_number`.
    ///
    /// The number recorded in history is the requested one; the dial prefix
    /// only applies to what is sent to the call endpoint.
    pub async fn place_call(&self, raw_number: &str) -> Result<CallResult, CallError> {
        let request = DialRequest::new(raw_number)?;
        let _guard = self.in_flight.try_lock().map_err(|_| {
            warn!("Ignoring call to {}: a call is already in progress", request.number());
            CallError::CallInProgress
        })?;

        info!("Making call to: {}", request.number());
        let result = self.dial(request).await;
        if let Err(e) = &result {
            error!(origin = ?e.origin(), "Call error: {}", e);
        }
        result
    }

    async fn dial(&self, request: DialRequest) -> Result<CallResult, CallError> {
        let settings = self.settings.load().await?;
        let credentials = settings.credentials().ok_or_else(|| {
            error!("Missing credentials");
            CallError::missing_credentials()
        })?;
        info!(
            "Tenant: {}, Extension: {}, Prefix: {}",
            credentials.tenant,
            credentials.extension,
            settings.dial_prefix()
        );

        info!("Step 1: Logging in...");
        let login = self.client.login(&credentials).await?;
        self.set_logged_in(true).await;

        let phone_number = request.into_number();
        let destination = format!("{}{}", settings.dial_prefix(), phone_number);

        info!("Step 2: Making click-to-call request...");
        let receipt = match self.client.call(&credentials.extension, &destination).await {
            Ok(receipt) => receipt,
            Err(e) => {
                if matches!(e, CallError::SessionExpired { .. }) {
                    self.set_logged_in(false).await;
                }
                return Err(e);
            }
        };

        match self.history.append(CallHistoryEntry::new(&phone_number)).await {
            Ok(_) => info!("Added {} to call history", phone_number),
            Err(e) => error!("Failed to record {} in call history: {}", phone_number, e),
        }

        info!(success = true, "Call initiated to {}", destination);
        Ok(CallResult {
            message: "Call initiated".to_string(),
            destination,
            phone_number,
            extension: credentials.extension,
            response: receipt.body,
            warning: login.warning,
        })
    }

    /// Check `credentials` against the login endpoint.
    pub async fn test_login(&self, credentials: &Credentials) -> Result<LoginReport, CallError> {
        if !credentials.is_complete() {
            return Err(CallError::missing_credentials());
        }
        info!(
            "Testing login for tenant {}, extension {}",
            credentials.tenant, credentials.extension
        );

        match self.client.login(credentials).await {
            Ok(outcome) => {
                self.set_logged_in(true).await;
                info!(success = true, "Login test successful");
                Ok(LoginReport {
                    is_valid: true,
                    warning: outcome.warning,
                })
            }
            Err(e) => {
                self.set_logged_in(false).await;
                error!("Login test failed: {}", e);
                Err(e)
            }
        }
    }

    /// End the session and forget the credentials and call history.
    ///
    /// The dial prefix is kept, falling back to the install default when unset.
    pub async fn logout(&self) -> Result<(), CallError> {
        let removed = self.client.logout();
        info!("Removed {} vendor cookies", removed);

        let settings = self.settings.load().await?;
        let prefix = settings
            .dial_prefix
            .unwrap_or_else(|| DEFAULT_DIAL_PREFIX.to_string());
        self.settings
            .apply(
                SettingsPatch::new()
                    .clear_credentials()
                    .dial_prefix(prefix)
                    .logged_in(false),
            )
            .await?;
        self.history.clear().await?;

        info!(success = true, "Logged out successfully");
        Ok(())
    }

    /// Whether a usable session exists.
    ///
    /// The stored flag is only a cache; a `true` that the cookie jar no longer
    /// backs is corrected to `false`.
    pub async fn login_status(&self) -> Result<bool, CallError> {
        let cached = self.settings.load().await?.is_logged_in;
        let live = self.client.session_state() == SessionState::LoggedIn;
        if cached && !live {
            info!("Stored login flag is stale, clearing it");
            self.settings
                .apply(SettingsPatch::new().logged_in(false))
                .await?;
        }
        Ok(cached && live)
    }

    async fn set_logged_in(&self, logged_in: bool) {
        if let Err(e) = self
            .settings
            .apply(SettingsPatch::new().logged_in(logged_in))
            .await
        {
            warn!("Failed to update login flag: {}", e);
        }
    }
}
