//! Vendor endpoint URLs.

use oneclick_config::VendorConfig;
use oneclick_protocols::{CallError, Credentials};
use url::Url;
use url::form_urlencoded::byte_serialize;

#[derive(Debug, Clone)]
pub struct VendorEndpoints {
    host: String,
    login: Url,
    call: Url,
}

impl VendorEndpoints {
    pub fn new(base_url: &str, login_path: &str, call_path: &str) -> Result<Self, CallError> {
        let base = Url::parse(base_url).map_err(|e| {
            CallError::Configuration(format!("Invalid vendor base URL {:?}: {}", base_url, e))
        })?;
        let host = base
            .host_str()
            .ok_or_else(|| {
                CallError::Configuration(format!("Vendor base URL {:?} has no host", base_url))
            })?
            .to_ascii_lowercase();

        let join = |path: &str| {
            base.join(path).map_err(|e| {
                CallError::Configuration(format!("Invalid vendor path {:?}: {}", path, e))
            })
        };

        Ok(Self {
            host,
            login: join(login_path)?,
            call: join(call_path)?,
        })
    }

    pub fn from_config(config: &VendorConfig) -> Result<Self, CallError> {
        Self::new(&config.base_url, &config.login_path, &config.call_path)
    }

    /// Host the session cookies are scoped to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `?tenantWebName=/{tenant}&UserID={extension}&Password={password}`
    pub fn login_url(&self, credentials: &Credentials) -> Url {
        let mut url = self.login.clone();
        let query = format!(
            "tenantWebName=/{}&UserID={}&Password={}",
            encode(&credentials.tenant),
            encode(&credentials.extension),
            encode(&credentials.password)
        );
        url.set_query(Some(&query));
        url
    }

    /// `?origExt={extension}&destExt={destination}`
    pub fn call_url(&self, extension: &str, destination: &str) -> Url {
        let mut url = self.call.clone();
        let query = format!(
            "origExt={}&destExt={}",
            encode(extension),
            encode(destination)
        );
        url.set_query(Some(&query));
        url
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> VendorEndpoints {
        VendorEndpoints::from_config(&VendorConfig::default()).unwrap()
    }

    #[test]
    fn test_default_host() {
        assert_eq!(endpoints().host(), "xtone.buf.vaspian.net");
    }

    #[test]
    fn test_login_url() {
        let url = endpoints().login_url(&Credentials::new("sandbox", "101", "p@ss&word"));
        assert_eq!(
            url.as_str(),
            "https://xtone.buf.vaspian.net/webadmin/en/user/jsp/ProcessLogin.jsp\
             ?tenantWebName=/sandbox&UserID=101&Password=p%40ss%26word"
        );
    }

    #[test]
    fn test_call_url() {
        let url = endpoints().call_url("101", "87169234121");
        assert_eq!(
            url.as_str(),
            "https://xtone.buf.vaspian.net/webadmin/en/user/jsp/ProcessClickToCall.jsp\
             ?origExt=101&destExt=87169234121"
        );
    }

    #[test]
    fn test_international_destination_encoded() {
        let url = endpoints().call_url("101", "+17169234121");
        assert!(url.as_str().ends_with("destExt=%2B17169234121"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            VendorEndpoints::new("not a url", "/login", "/call"),
            Err(CallError::Configuration(_))
        ));
    }
}
