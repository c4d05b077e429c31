//! Distlock Storage - backend contract for lock records
//!
//! The lock manager talks to its backend only through [`LockStore`]:
//! create-if-absent with TTL, unconditional put with refreshed TTL, and
//! delete by key. [`MemoryLockStore`] is a process-local implementation
//! used for tests and single-process deployments.

pub mod memory;
pub mod store;

pub use memory::MemoryLockStore;
pub use store::{Bins, LockStore, RecordKey};
