//! Distlock Core - named distributed locks
//!
//! This crate provides:
//! - Single-shot and blocking lock acquisition over a [`LockStore`]
//! - Lease handles with background keepalive and idempotent release
//! - The `Locker`/`Releaser` traits and a no-op implementation for call-site tests
//! - Metric names published through the `metrics` facade
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use distlock_core::{LockConfig, LockError, LockManager, MemoryLockStore};
//!
//! # async fn run() -> Result<(), LockError> {
//! let manager = LockManager::new(Arc::new(MemoryLockStore::new()), LockConfig::default())?;
//!
//! let lease = manager.lock_wait("batch-job-42").await?;
//! // critical section
//! lease.release().await?;
//! # Ok(())
//! # }
//! ```

pub mod lock;
pub mod locker;
pub mod metrics;

// Re-export lock types
pub use lock::{Lease, LockManager, LockRecord};
pub use locker::{Locker, NoopLocker, NoopReleaser, Releaser};

// Re-export shared types so callers need a single dependency
pub use distlock_common::{LockConfig, LockError, StoreError};
pub use distlock_storage::{Bins, LockStore, MemoryLockStore, RecordKey};
