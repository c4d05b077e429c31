//! Lock Record Data Model

use chrono::{DateTime, Utc};
use distlock_common::{
    BIN_HOSTNAME, BIN_LOCKED, BIN_NAME, BIN_UPDATED, format_rfc3339, parse_rfc3339,
};
use distlock_storage::Bins;

/// Persisted lock record
///
/// Stored as the string bins `name`, `hostname`, `locked` and `updated`.
/// The TTL is attached by the backend at the record level and is not a bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    /// Lock name
    pub name: String,
    /// Owner that acquired the lock, informational only
    pub hostname: String,
    /// Acquisition time
    pub locked: DateTime<Utc>,
    /// Last keepalive write
    pub updated: DateTime<Utc>,
}

impl LockRecord {
    /// A fresh record with `locked` and `updated` set to now
    pub fn new(name: &str, hostname: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            hostname: hostname.to_string(),
            locked: now,
            updated: now,
        }
    }

    pub fn to_bins(&self) -> Bins {
        let mut bins = Bins::new();
        bins.insert(BIN_NAME.to_string(), self.name.clone());
        bins.insert(BIN_HOSTNAME.to_string(), self.hostname.clone());
        bins.insert(BIN_LOCKED.to_string(), format_rfc3339(&self.locked));
        bins.insert(BIN_UPDATED.to_string(), format_rfc3339(&self.updated));
        bins
    }

    /// Bins written by a keepalive: only `updated` changes
    pub fn renewal_bins(now: DateTime<Utc>) -> Bins {
        let mut bins = Bins::new();
        bins.insert(BIN_UPDATED.to_string(), format_rfc3339(&now));
        bins
    }

    /// Parse a stored record; `None` if a bin is missing or a timestamp is malformed
    pub fn from_bins(bins: &Bins) -> Option<Self> {
        Some(Self {
            name: bins.get(BIN_NAME)?.clone(),
            hostname: bins.get(BIN_HOSTNAME)?.clone(),
            locked: parse_rfc3339(bins.get(BIN_LOCKED)?)?,
            updated: parse_rfc3339(bins.get(BIN_UPDATED)?)?,
        })
    }
}
