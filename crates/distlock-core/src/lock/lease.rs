//! Lease handle and keepalive task
//!
//! A `Lease` owns the keepalive task of one held lock. The task stops when
//! the lease is released or dropped, whichever comes first. The record is
//! deleted only after the task has exited, so an in-flight renewal can never
//! recreate it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use distlock_common::LockError;
use distlock_storage::{LockStore, RecordKey};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use super::model::LockRecord;
use crate::metrics::{LEASES_HELD, RELEASE_TOTAL, RENEWAL_ERRORS_TOTAL, RENEWALS_TOTAL};

/// Handle to a held lock
///
/// `release` stops the keepalive and deletes the record. Calling it again is
/// a no-op. A lease dropped without release (early return, `?`, panic unwind)
/// signals its keepalive at once and deletes the record in a background task.
pub struct Lease {
    name: String,
    key: RecordKey,
    store: Arc<dyn LockStore>,
    keepalive: Mutex<Option<KeepaliveHandle>>,
    released: AtomicBool,
}

/// Stop signal and join handle of a running keepalive task
struct KeepaliveHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl KeepaliveHandle {
    /// Signal the task and wait until any in-flight renewal has finished
    async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await
            && e.is_panic()
        {
            warn!(error = %e, "Lock keepalive panicked");
        }
    }
}

impl Lease {
    /// Spawn the keepalive task for a freshly created record
    pub(crate) fn start(
        store: Arc<dyn LockStore>,
        key: RecordKey,
        ping_interval: Duration,
        ttl: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();

        let keepalive = Keepalive {
            store: store.clone(),
            key: key.clone(),
            ping_interval,
            ttl,
        };
        let task = tokio::spawn(keepalive.run(stop_rx));
        gauge!(LEASES_HELD).increment(1.0);

        Self {
            name: key.name.clone(),
            key,
            store,
            keepalive: Mutex::new(Some(KeepaliveHandle { stop_tx, task })),
            released: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Stop the keepalive and delete the lock record
    ///
    /// Waits for a renewal already in progress before deleting.
    pub async fn release(&self) -> Result<(), LockError> {
        if !self.mark_released() {
            return Ok(());
        }

        if let Some(keepalive) = self.take_keepalive() {
            keepalive.stop().await;
        }
        self.store.delete(&self.key).await?;

        debug!(key = %self.key, "Lock released");
        Ok(())
    }

    /// Returns true for the first caller only
    fn mark_released(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        counter!(RELEASE_TOTAL).increment(1);
        gauge!(LEASES_HELD).decrement(1.0);
        true
    }

    fn take_keepalive(&self) -> Option<KeepaliveHandle> {
        self.keepalive.lock().take()
    }

    /// Stop renewing without deleting the record, as if the holder crashed
    #[cfg(test)]
    pub(crate) fn abandon(self) {
        self.released.store(true, Ordering::Release);
        if let Some(keepalive) = self.take_keepalive() {
            let _ = keepalive.stop_tx.send(());
        }
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("key", &self.key)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if !self.mark_released() {
            return;
        }

        let keepalive = self.take_keepalive();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                let key = self.key.clone();
                handle.spawn(async move {
                    if let Some(keepalive) = keepalive {
                        keepalive.stop().await;
                    }
                    match store.delete(&key).await {
                        Ok(()) => debug!(key = %key, "Dropped lease released"),
                        Err(e) => warn!(key = %key, error = %e, "Failed to release dropped lease"),
                    }
                });
            }
            Err(_) => {
                warn!(
                    key = %self.key,
                    "Lease dropped outside a runtime, record will expire by ttl"
                );
            }
        }
    }
}

/// Periodic TTL renewal for one lock record
struct Keepalive {
    store: Arc<dyn LockStore>,
    key: RecordKey,
    ping_interval: Duration,
    ttl: Duration,
}

impl Keepalive {
    async fn run(self, mut stop_rx: oneshot::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                // Fires on an explicit stop and when the lease is dropped
                _ = &mut stop_rx => break,
                _ = ticker.tick() => self.renew().await,
            }
        }

        debug!(key = %self.key, "Lock keepalive stopped");
    }

    async fn renew(&self) {
        let bins = LockRecord::renewal_bins(Utc::now());
        match self.store.put(&self.key, bins, self.ttl).await {
            Ok(()) => {
                counter!(RENEWALS_TOTAL).increment(1);
            }
            Err(e) => {
                counter!(RENEWAL_ERRORS_TOTAL).increment(1);
                warn!(key = %self.key, error = %e, "Lock keepalive failed");
            }
        }
    }
}
