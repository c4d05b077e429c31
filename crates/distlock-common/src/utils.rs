//! Utility functions for distlock

use chrono::{DateTime, SecondsFormat, Utc};

use crate::DEFAULT_OWNER;

/// Get the local hostname
///
/// Falls back to "distlock-node" when the hostname cannot be resolved
/// or is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use distlock_common::local_hostname;
///
/// assert!(!local_hostname().is_empty());
/// ```
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

/// Format a UTC timestamp as RFC3339 with second precision and a `Z` suffix
pub fn format_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp with any offset into UTC
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
