//! Distributed Lock Service Implementation
//!
//! Provides:
//! - Single-shot acquisition (`lock`)
//! - Blocking acquisition with a fault budget (`lock_wait`)
//! - Bounded blocking acquisition (`lock_wait_timeout`)

use std::sync::Arc;
use std::time::Duration;

use distlock_common::{LOCK_SET, LockConfig, LockError, StoreError};
use distlock_storage::{LockStore, RecordKey};
use metrics::counter;
use tracing::{debug, info, warn};

use super::lease::Lease;
use super::model::LockRecord;
use crate::metrics::{ACQUIRE_ERRORS_TOTAL, ACQUIRE_TOTAL, CONTENTION_TOTAL};

/// Lock manager over a shared storage backend
///
/// Cloning is cheap; clones share the backend handle and configuration.
/// Mutual exclusion rests entirely on the backend's atomic create-if-absent.
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn LockStore>,
    config: Arc<LockConfig>,
    owner: Arc<str>,
}

impl LockManager {
    /// Create a lock manager, validating the configuration
    pub fn new(store: Arc<dyn LockStore>, config: LockConfig) -> Result<Self, LockError> {
        config.validate()?;
        let owner: Arc<str> = config.resolved_owner().into();

        info!(
            namespace = %config.namespace,
            owner = %owner,
            ttl_ms = config.ttl_ms,
            ping_interval_ms = config.ping_interval_ms,
            "LockManager initialized"
        );

        Ok(Self {
            store,
            config: Arc::new(config),
            owner,
        })
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Identifier written into the `hostname` bin of every record
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Storage key of the named lock
    pub fn record_key(&self, name: &str) -> Result<RecordKey, StoreError> {
        RecordKey::new(self.config.namespace.as_str(), LOCK_SET, name)
    }

    /// Try to acquire a lock once
    ///
    /// Returns `LockError::Locked` when another caller holds the name and
    /// `LockError::Storage` for any other backend failure.
    pub async fn lock(&self, name: &str) -> Result<Lease, LockError> {
        let key = self.record_key(name)?;
        let record = LockRecord::new(name, &self.owner);

        match self
            .store
            .create_if_absent(&key, record.to_bins(), self.config.ttl())
            .await
        {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                counter!(CONTENTION_TOTAL).increment(1);
                debug!(key = %key, "Lock is held by another owner");
                return Err(LockError::Locked);
            }
            Err(e) => {
                counter!(ACQUIRE_ERRORS_TOTAL).increment(1);
                return Err(e.into());
            }
        }

        counter!(ACQUIRE_TOTAL).increment(1);
        debug!(key = %key, owner = %self.owner, "Lock acquired");

        Ok(Lease::start(
            self.store.clone(),
            key,
            self.config.ping_interval(),
            self.config.ttl(),
        ))
    }

    /// Acquire a lock, retrying until it is free
    ///
    /// Contention is retried without limit. Storage failures are retried
    /// until more than `wait_retries` occur in a row, then the last one is
    /// returned. A contention result resets the failure run.
    pub async fn lock_wait(&self, name: &str) -> Result<Lease, LockError> {
        let mut fault_tries: u32 = 0;

        loop {
            match self.lock(name).await {
                Ok(lease) => return Ok(lease),
                Err(LockError::Locked) => {
                    fault_tries = 0;
                }
                Err(e) => {
                    fault_tries += 1;
                    if fault_tries > self.config.wait_retries {
                        warn!(
                            name = %name,
                            attempts = fault_tries,
                            error = %e,
                            "Giving up on lock after repeated failures"
                        );
                        return Err(e);
                    }
                    warn!(
                        name = %name,
                        attempt = fault_tries,
                        error = %e,
                        "Lock attempt failed, retrying"
                    );
                }
            }

            tokio::time::sleep(self.config.retry_sleep()).await;
        }
    }

    /// Like `lock_wait`, but gives up with `LockError::Timeout` once `timeout` elapses
    pub async fn lock_wait_timeout(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Lease, LockError> {
        match tokio::time::timeout(timeout, self.lock_wait(name)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(name = %name, timeout = ?timeout, "Lock wait timed out");
                Err(LockError::Timeout(timeout))
            }
        }
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("config", &self.config)
            .field("owner", &self.owner)
            .finish()
    }
}
