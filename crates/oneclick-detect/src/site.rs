//! Per-site click-to-call gate.

use oneclick_protocols::Settings;

/// Strip a leading `http://` or `https://` and a trailing `/`.
pub fn normalize_site(site: &str) -> &str {
    let site = site.trim();
    let site = site
        .strip_prefix("https://")
        .or_else(|| site.strip_prefix("http://"))
        .unwrap_or(site);
    site.strip_suffix('/').unwrap_or(site)
}

/// Whether a disabled-site entry covers `hostname`, itself or any subdomain.
pub fn site_matches(site: &str, hostname: &str) -> bool {
    let site = normalize_site(site);
    if site.is_empty() {
        return false;
    }
    hostname == site
        || hostname
            .strip_suffix(site)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Whether pages on `hostname` should get clickable numbers.
pub fn click_to_call_enabled(settings: &Settings, hostname: &str) -> bool {
    if !settings.click_to_call_enabled {
        return false;
    }
    !settings
        .click_to_call_disabled_sites
        .iter()
        .any(|site| site_matches(site, hostname))
}
