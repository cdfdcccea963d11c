//! Cookie jar for the vendor session.
//!
//! Plugged into `reqwest` as the cookie provider, so every request carries
//! and updates it. Unlike reqwest's built-in jar it can enumerate and
//! remove individual cookies, which logout relies on.

use std::fmt;

use chrono::{DateTime, Utc};
use cookie::Cookie;
use parking_lot::Mutex;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use tracing::debug;
use url::{Host, Url};

/// A cookie as held by the jar.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    /// Lower-cased domain without a leading dot.
    pub domain: String,
    /// Set without a `Domain` attribute: only sent back to the exact host.
    pub host_only: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        if self.host_only {
            host == self.domain
        } else {
            host == self.domain || host.ends_with(&format!(".{}", self.domain))
        }
    }

    fn matches_path(&self, path: &str) -> bool {
        path == self.path
            || (path.starts_with(&self.path)
                && (self.path.ends_with('/') || path[self.path.len()..].starts_with('/')))
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

// Values are session secrets; keep them out of logs.
impl fmt::Debug for StoredCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Default)]
pub struct VendorCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
}

impl VendorCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one `Set-Cookie` header value received from `url`.
    pub fn store(&self, header: &str, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };
        let Ok(parsed) = Cookie::parse(header.to_string()) else {
            debug!("Ignoring malformed Set-Cookie header");
            return;
        };

        let (domain, host_only) = match parsed.domain() {
            Some(domain) if !domain.is_empty() => {
                (domain.trim_start_matches('.').to_ascii_lowercase(), false)
            }
            _ => (host.to_ascii_lowercase(), true),
        };

        let path = match parsed.path() {
            Some(path) if path.starts_with('/') => path.to_string(),
            _ => default_path(url.path()),
        };

        let now = Utc::now();
        let expires_at = match parsed.max_age() {
            Some(max_age) => Some(now + chrono::Duration::seconds(max_age.whole_seconds())),
            None => parsed
                .expires_datetime()
                .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), 0)),
        };

        let cookie = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            host_only,
            path,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            expires_at,
        };

        // A server may only set cookies for itself or a parent domain.
        if !cookie.matches_host(host) {
            debug!(name = %cookie.name, "Rejecting cookie for foreign domain");
            return;
        }
        if !cookie.host_only && !domain_attribute_allowed(&cookie.domain, url) {
            debug!(name = %cookie.name, domain = %cookie.domain, "Rejecting cookie for public domain");
            return;
        }

        let mut cookies = self.cookies.lock();
        cookies.retain(|existing| !existing.same_slot(&cookie));
        if cookie.is_expired(now) {
            debug!(name = %cookie.name, "Cookie expired by server");
            return;
        }
        cookies.push(cookie);
    }

    /// Live cookies that would be sent to `host`.
    pub fn cookies_for_host(&self, host: &str) -> Vec<StoredCookie> {
        let now = Utc::now();
        let mut cookies = self.cookies.lock();
        cookies.retain(|c| !c.is_expired(now));
        cookies.iter().filter(|c| c.matches_host(host)).cloned().collect()
    }

    pub fn has_cookies_for(&self, host: &str) -> bool {
        !self.cookies_for_host(host).is_empty()
    }

    /// Remove the cookie identified by `(name, domain, path)`.
    pub fn remove(&self, name: &str, domain: &str, path: &str) -> bool {
        let mut cookies = self.cookies.lock();
        let before = cookies.len();
        cookies.retain(|c| !(c.name == name && c.domain == domain && c.path == path));
        cookies.len() != before
    }

    pub fn len(&self) -> usize {
        self.cookies.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for VendorCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorCookieJar")
            .field("cookies", &self.len())
            .finish()
    }
}

impl CookieStore for VendorCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(value) = header.to_str() {
                self.store(value, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        let secure_scheme = url.scheme() == "https";
        let path = url.path();

        let pairs: Vec<String> = self
            .cookies_for_host(host)
            .into_iter()
            .filter(|c| c.matches_path(path) && (!c.secure || secure_scheme))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        if pairs.is_empty() {
            return None;
        }
        HeaderValue::from_str(&pairs.join("; ")).ok()
    }
}

/// A `Domain` attribute must name the host itself or a registrable parent.
///
/// Single-label suffixes such as `net` are refused, and IP hosts only accept
/// their own address.
fn domain_attribute_allowed(domain: &str, url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(host)) => host.eq_ignore_ascii_case(domain) || domain.contains('.'),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => url
            .host_str()
            .is_some_and(|host| host.trim_matches(|c| c == '[' || c == ']') == domain),
        None => false,
    }
}

/// Directory part of a request path, used when a cookie has no `Path`.
fn default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn header_for(jar: &VendorCookieJar, target: &str) -> Option<String> {
        jar.cookies(&url(target))
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_host_only_cookie() {
        let jar = VendorCookieJar::new();
        jar.store(
            "JSESSIONID=abc123; Path=/; HttpOnly",
            &url("https://xtone.buf.vaspian.net/webadmin/en/user/jsp/ProcessLogin.jsp"),
        );

        let cookies = jar.cookies_for_host("xtone.buf.vaspian.net");
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].host_only);
        assert!(cookies[0].http_only);
        assert!(jar.cookies_for_host("other.vaspian.net").is_empty());
        assert_eq!(
            header_for(&jar, "https://xtone.buf.vaspian.net/webadmin/en/user/jsp/ProcessClickToCall.jsp"),
            Some("JSESSIONID=abc123".to_string())
        );
    }

    #[test]
    fn test_domain_cookie_covers_subdomains() {
        let jar = VendorCookieJar::new();
        jar.store(
            "route=r1; Domain=.vaspian.net; Path=/",
            &url("https://xtone.buf.vaspian.net/"),
        );
        assert!(jar.has_cookies_for("xtone.buf.vaspian.net"));
        assert!(jar.has_cookies_for("vaspian.net"));
        assert!(!jar.has_cookies_for("example.com"));
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let jar = VendorCookieJar::new();
        jar.store("evil=1; Domain=example.com", &url("https://xtone.buf.vaspian.net/"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_public_suffix_domain_rejected() {
        let jar = VendorCookieJar::new();
        jar.store("tracker=1; Domain=.net; Path=/", &url("https://xtone.buf.vaspian.net/"));
        assert!(jar.is_empty());

        jar.store("route=r1; Domain=vaspian.net; Path=/", &url("https://xtone.buf.vaspian.net/"));
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_ip_host_only_accepts_own_address() {
        let jar = VendorCookieJar::new();
        jar.store("a=1; Domain=0.0.1; Path=/", &url("http://127.0.0.1:8080/"));
        assert!(jar.is_empty());

        jar.store("a=1; Domain=127.0.0.1; Path=/", &url("http://127.0.0.1:8080/"));
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_single_label_host_may_name_itself() {
        let jar = VendorCookieJar::new();
        jar.store("a=1; Domain=localhost; Path=/", &url("http://localhost:8080/"));
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_default_path_from_request() {
        let jar = VendorCookieJar::new();
        jar.store("a=1", &url("https://pbx.example/webadmin/en/user/jsp/ProcessLogin.jsp"));
        let cookies = jar.cookies_for_host("pbx.example");
        assert_eq!(cookies[0].path, "/webadmin/en/user/jsp");

        assert!(header_for(&jar, "https://pbx.example/webadmin/en/user/jsp/Other.jsp").is_some());
        assert!(header_for(&jar, "https://pbx.example/other").is_none());
        assert_eq!(default_path("/login"), "/");
    }

    #[test]
    fn test_replace_same_slot() {
        let jar = VendorCookieJar::new();
        let target = url("https://pbx.example/");
        jar.store("JSESSIONID=one; Path=/", &target);
        jar.store("JSESSIONID=two; Path=/", &target);
        let cookies = jar.cookies_for_host("pbx.example");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "two");
    }

    #[test]
    fn test_max_age_zero_removes() {
        let jar = VendorCookieJar::new();
        let target = url("https://pbx.example/");
        jar.store("JSESSIONID=one; Path=/", &target);
        jar.store("JSESSIONID=; Path=/; Max-Age=0", &target);
        assert!(jar.is_empty());
    }

    #[test]
    fn test_secure_cookie_not_sent_over_http() {
        let jar = VendorCookieJar::new();
        jar.store("s=1; Path=/; Secure", &url("https://pbx.example/"));
        assert!(header_for(&jar, "http://pbx.example/").is_none());
        assert!(header_for(&jar, "https://pbx.example/").is_some());
    }

    #[test]
    fn test_remove_individual_cookie() {
        let jar = VendorCookieJar::new();
        let target = url("https://pbx.example/");
        jar.store("a=1; Path=/", &target);
        jar.store("b=2; Path=/", &target);

        assert!(jar.remove("a", "pbx.example", "/"));
        assert!(!jar.remove("a", "pbx.example", "/"));
        let names: Vec<_> = jar
            .cookies_for_host("pbx.example")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_debug_hides_value() {
        let jar = VendorCookieJar::new();
        jar.store("JSESSIONID=secretvalue; Path=/", &url("https://pbx.example/"));
        let cookie = &jar.cookies_for_host("pbx.example")[0];
        assert!(!format!("{:?}", cookie).contains("secretvalue"));
    }
}
