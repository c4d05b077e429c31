//! Error types for distlock
//!
//! This module defines:
//! - `StoreError`: failures reported by a storage backend
//! - `LockError`: failures reported by the lock manager and lease handles

use std::time::Duration;

/// Errors reported by a lock storage backend
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A create-if-absent write found an existing record
    #[error("record '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Errors reported by lock acquisition and release
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The name is currently held by another caller
    #[error("Locked")]
    Locked,

    /// Any backend failure other than a create conflict
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("lock wait timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LockError {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockError::Locked)
    }
}
