//! In-memory lock record store
//!
//! Provides create-if-absent, upsert and delete with per-record expiry

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use distlock_common::StoreError;
use tokio::time::Instant;
use tracing::debug;

use crate::store::{Bins, LockStore, RecordKey};

/// A stored record with its expiry deadline
struct RecordEntry {
    bins: Bins,
    expires_at: Instant,
}

impl RecordEntry {
    fn new(bins: Bins, ttl: Duration) -> Self {
        Self {
            bins,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory lock store using DashMap
///
/// Atomicity of `create_if_absent` comes from the shard lock held by the
/// DashMap entry API. Expiry is evaluated lazily against `tokio::time::Instant`,
/// so tests running on a paused clock see records expire deterministically.
#[derive(Default)]
pub struct MemoryLockStore {
    records: DashMap<RecordKey, RecordEntry>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bins of a live record, or `None` when absent or expired
    pub fn get(&self, key: &RecordKey) -> Option<Bins> {
        self.records
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.bins.clone())
    }

    /// Time left before a live record expires
    pub fn ttl_remaining(&self, key: &RecordKey) -> Option<Duration> {
        self.records
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired records, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.records.len());

        if removed > 0 {
            debug!(count = removed, "Purged expired lock records");
        }
        removed
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn create_if_absent(
        &self,
        key: &RecordKey,
        bins: Bins,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired() {
                    return Err(StoreError::AlreadyExists(key.to_string()));
                }
                occupied.insert(RecordEntry::new(bins, ttl));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(RecordEntry::new(bins, ttl));
            }
        }

        debug!(key = %key, "Lock record created");
        Ok(())
    }

    async fn put(&self, key: &RecordKey, bins: Bins, ttl: Duration) -> Result<(), StoreError> {
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired() {
                    *entry = RecordEntry::new(bins, ttl);
                } else {
                    entry.bins.extend(bins);
                    entry.expires_at = Instant::now() + ttl;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(RecordEntry::new(bins, ttl));
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), StoreError> {
        if self.records.remove(key).is_some() {
            debug!(key = %key, "Lock record deleted");
        }
        Ok(())
    }
}
