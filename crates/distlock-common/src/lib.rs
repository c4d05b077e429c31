//! Distlock Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all distlock components:
//! - Error types for storage and lock operations
//! - Lock manager configuration
//! - Utility functions (hostname, timestamps)
//! - Common constants

pub mod config;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use crate::config::LockConfig;
pub use error::{LockError, StoreError};
pub use utils::{format_rfc3339, local_hostname, parse_rfc3339};

/// Collection (set) under which every lock record is stored
pub const LOCK_SET: &str = "distlock";

/// Default storage namespace
pub const DEFAULT_NAMESPACE: &str = "distlock";

/// Owner used when the local hostname cannot be resolved
pub const DEFAULT_OWNER: &str = "distlock-node";

/// Record bin names
pub const BIN_NAME: &str = "name";
pub const BIN_HOSTNAME: &str = "hostname";
pub const BIN_LOCKED: &str = "locked";
pub const BIN_UPDATED: &str = "updated";
