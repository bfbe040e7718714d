//! Configuration loading and resolution.

use std::time::Duration;

pub const API_KEY_ENV: &str = "EXA_API_KEY";
pub const BASE_URL_ENV: &str = "EXA_BASE_URL";
pub const TIMEOUT_ENV: &str = "EXA_TIMEOUT_SECS";

/// Resolve the API key used to pre-authenticate the session.
///
/// Order: explicit flag, then `EXA_API_KEY`. `None` means the client must
/// send an `auth` request before calling tools.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(key) = explicit {
        return Some(key.to_string());
    }

    std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

/// Resolve the upstream API root.
pub fn resolve_base_url(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| exa_search::DEFAULT_BASE_URL.to_string())
}

/// Resolve the upstream request timeout. No timeout unless configured.
pub fn resolve_timeout(explicit: Option<u64>) -> Option<Duration> {
    explicit
        .or_else(|| std::env::var(TIMEOUT_ENV).ok()?.parse().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
