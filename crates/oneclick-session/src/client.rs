//! Session protocol client.
//!
//! Login and call are two plain POSTs against the vendor host. The session
//! itself is whatever cookies the login left in the jar, so the client's
//! state is always re-derived from the jar rather than trusted.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use oneclick_config::VendorConfig;
use oneclick_protocols::{CallError, Credentials, Stage};
use parking_lot::Mutex;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::endpoints::VendorEndpoints;
use crate::jar::{StoredCookie, VendorCookieJar};

static PASSWORD_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Password=[^&]*").expect("password pattern must compile"));

/// Mask the `Password` query parameter of a login URL.
pub fn redact_password(url: &str) -> String {
    PASSWORD_PARAM.replace_all(url, "Password=***").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

/// Result of a successful login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub status: u16,
    /// Cookies set or changed by this login.
    pub new_cookies: usize,
    /// Set when the login succeeded at the HTTP level but no session cookie appeared.
    pub warning: Option<String>,
}

/// Result of a successful call request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReceipt {
    pub status: u16,
    pub destination: String,
    pub final_url: String,
    pub body: String,
}

pub struct SessionClient {
    http: Client,
    jar: Arc<VendorCookieJar>,
    endpoints: VendorEndpoints,
    phase: Mutex<SessionState>,
}

impl SessionClient {
    pub fn new(config: &VendorConfig) -> Result<Self, CallError> {
        let endpoints = VendorEndpoints::from_config(config)?;
        let jar = Arc::new(VendorCookieJar::new());

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_provider(jar.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| CallError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            jar,
            endpoints,
            phase: Mutex::new(SessionState::LoggedOut),
        })
    }

    pub fn endpoints(&self) -> &VendorEndpoints {
        &self.endpoints
    }

    pub fn jar(&self) -> &Arc<VendorCookieJar> {
        &self.jar
    }

    /// Current state, checked against the cookie jar.
    ///
    /// `LoggedIn` is only reported while the jar still holds cookies for the
    /// vendor host.
    pub fn session_state(&self) -> SessionState {
        match *self.phase.lock() {
            SessionState::LoggingIn => SessionState::LoggingIn,
            SessionState::LoggedIn if self.jar.has_cookies_for(self.endpoints.host()) => {
                SessionState::LoggedIn
            }
            _ => SessionState::LoggedOut,
        }
    }

    fn set_phase(&self, state: SessionState) {
        *self.phase.lock() = state;
    }

    fn vendor_cookies(&self) -> Vec<StoredCookie> {
        self.jar.cookies_for_host(self.endpoints.host())
    }

    /// Authenticate with `credentials`. Never retried.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, CallError> {
        let url = self.endpoints.login_url(credentials);
        info!("Login URL: {}", redact_password(url.as_str()));

        let before = self.vendor_cookies();
        info!("Cookies before login: {} cookies", before.len());
        log_cookie_names(&before);

        self.set_phase(SessionState::LoggingIn);
        info!("Sending login request...");

        let (status, final_url, body) = match self.post(url, Stage::Login).await {
            Ok(parts) => parts,
            Err(e) => {
                self.set_phase(SessionState::LoggedOut);
                error!("Login network error: {}", e);
                return Err(e);
            }
        };
        info!("Login response: {} {}", status.as_u16(), reason(status));
        debug!("Response URL: {}", redact_password(final_url.as_str()));
        log_body("Login", &body);

        if !status.is_success() {
            self.set_phase(SessionState::LoggedOut);
            error!(
                "Login failed with status: {} {}",
                status.as_u16(),
                reason(status)
            );
            return Err(CallError::Authentication {
                status: status.as_u16(),
            });
        }

        let after = self.vendor_cookies();
        info!("Cookies after login: {} cookies", after.len());
        for cookie in &after {
            debug!(
                "Cookie {}: path={}, secure={}, httpOnly={}",
                cookie.name, cookie.path, cookie.secure, cookie.http_only
            );
        }

        let new_cookies = after.iter().filter(|c| !before.contains(c)).count();
        let warning = if new_cookies == 0 {
            let message = "Login returned success but no session cookie was set".to_string();
            warn!("{}", message);
            Some(message)
        } else {
            None
        };

        self.set_phase(SessionState::LoggedIn);
        info!(success = true, "Login request completed successfully");

        Ok(LoginOutcome {
            status: status.as_u16(),
            new_cookies,
            warning,
        })
    }

    /// Ask the PBX to connect `extension` to `destination`, reusing the session cookies.
    pub async fn call(&self, extension: &str, destination: &str) -> Result<CallReceipt, CallError> {
        let url = self.endpoints.call_url(extension, destination);
        info!("Call URL: {}", url);

        let cookies = self.vendor_cookies();
        info!("Cookies before call: {} cookies", cookies.len());
        if cookies.is_empty() {
            warn!("No cookies found! This will likely fail.");
        } else {
            log_cookie_names(&cookies);
        }

        info!("Sending click-to-call request...");
        let (status, final_url, body) = self.post(url, Stage::Call).await.inspect_err(|e| {
            error!("Call network error: {}", e);
        })?;
        info!("Call response: {} {}", status.as_u16(), reason(status));
        info!("Response URL: {}", final_url);
        log_body("Call", &body);

        if !status.is_success() {
            error!("Call failed: {} {}", status.as_u16(), reason(status));
            return Err(CallError::CallFailed {
                status: status.as_u16(),
                reason: reason(status).to_string(),
            });
        }

        if is_login_redirect(&final_url) {
            self.set_phase(SessionState::LoggedOut);
            error!("Session expired or cookies not sent properly");
            return Err(CallError::SessionExpired {
                url: final_url.to_string(),
            });
        }

        info!(success = true, "Call request completed successfully");
        Ok(CallReceipt {
            status: status.as_u16(),
            destination: destination.to_string(),
            final_url: final_url.to_string(),
            body,
        })
    }

    /// Remove every vendor-host cookie, one by one. Returns how many were removed.
    pub fn logout(&self) -> usize {
        info!("Logging out...");
        let cookies = self.vendor_cookies();
        let mut removed = 0;
        for cookie in &cookies {
            if self.jar.remove(&cookie.name, &cookie.domain, &cookie.path) {
                removed += 1;
                info!("Removed cookie: {}", cookie.name);
            }
        }

        let remaining = self.vendor_cookies().len();
        if remaining > 0 {
            warn!("{} cookies for {} survived logout", remaining, self.endpoints.host());
        }
        self.set_phase(SessionState::LoggedOut);
        removed
    }

    async fn post(&self, url: Url, stage: Stage) -> Result<(StatusCode, Url, String), CallError> {
        let response: Response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| transport_error(stage, e))?;

        let status = response.status();
        let final_url = response.url().clone();
        debug!("Response headers: {:?}", response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(stage, e))?;
        Ok((status, final_url, body))
    }
}

/// reqwest errors carry the request URL, which for login includes the password.
fn transport_error(stage: Stage, err: reqwest::Error) -> CallError {
    CallError::network(stage, redact_password(&err.to_string()))
}

/// A response that ended on a login page means the session was not accepted.
fn is_login_redirect(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    let query = url.query().unwrap_or("").to_ascii_lowercase();
    path.contains("login") || query.contains("login")
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

fn log_cookie_names(cookies: &[StoredCookie]) {
    if !cookies.is_empty() {
        let names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
        debug!("Cookie names: {}", names.join(", "));
    }
}

fn log_body(step: &str, body: &str) {
    if body.is_empty() {
        debug!("{} response body: (empty)", step);
    } else {
        debug!("{} response body ({} chars): {}", step, body.len(), body);
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
