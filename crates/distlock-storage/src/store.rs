//! Storage adapter contract
//!
//! The lock manager relies on the backend for atomicity; no read primitive is needed

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use distlock_common::StoreError;

/// Named string fields of a stored record
pub type Bins = BTreeMap<String, String>;

/// Identity of a record: namespace, set (collection) and user key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub namespace: String,
    pub set: String,
    pub name: String,
}

impl RecordKey {
    /// Build a key, rejecting empty components
    pub fn new(
        namespace: impl Into<String>,
        set: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = Self {
            namespace: namespace.into(),
            set: set.into(),
            name: name.into(),
        };

        if key.namespace.is_empty() {
            return Err(StoreError::InvalidKey("namespace is empty".to_string()));
        }
        if key.set.is_empty() {
            return Err(StoreError::InvalidKey("set is empty".to_string()));
        }
        if key.name.is_empty() {
            return Err(StoreError::InvalidKey("name is empty".to_string()));
        }

        Ok(key)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.set, self.name)
    }
}

/// Backend primitives required by the lock manager
///
/// Implementations must make `create_if_absent` atomic: of any number of
/// concurrent calls for the same key, exactly one may succeed while the
/// record exists. Records must expire on their own once `ttl` passes
/// without a `put`.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Write a new record, failing with [`StoreError::AlreadyExists`] if the key is present
    async fn create_if_absent(
        &self,
        key: &RecordKey,
        bins: Bins,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Upsert bins and reset the record TTL
    ///
    /// Bins not named in `bins` keep their stored values.
    async fn put(&self, key: &RecordKey, bins: Bins, ttl: Duration) -> Result<(), StoreError>;

    /// Remove a record; removing an absent key succeeds
    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError>;
}
