//! Lock manager configuration
//!
//! Replaces the fixed ping/TTL/retry constants with a structure passed to the
//! lock manager at construction. Values can be overridden from the
//! environment with the `DISTLOCK_` prefix, e.g. `DISTLOCK_TTL_MS=10000`.

use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;

use crate::{DEFAULT_NAMESPACE, LockError, local_hostname};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DISTLOCK";

/// Configuration for the lock manager
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Storage namespace holding the lock records (default: "distlock")
    pub namespace: String,

    /// Owner identifier written into each record (default: local hostname)
    pub owner: Option<String>,

    /// Keepalive interval in milliseconds (default: 1000ms)
    /// Must be strictly shorter than the TTL
    pub ping_interval_ms: u64,

    /// Record expiration in milliseconds, reapplied on every renewal (default: 30000ms)
    pub ttl_ms: u64,

    /// Sleep between blocking acquisition attempts in milliseconds (default: 100ms)
    pub retry_sleep_ms: u64,

    /// Consecutive non-contention failures tolerated by a blocking acquisition (default: 3)
    pub wait_retries: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            owner: None,
            ping_interval_ms: 1000,
            ttl_ms: 30_000,
            retry_sleep_ms: 100,
            wait_retries: 3,
        }
    }
}

impl LockConfig {
    /// Create a config for the given namespace with default timings
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Load configuration from `DISTLOCK_*` environment variables
    pub fn from_env() -> Result<Self, LockError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit environment source
    pub fn from_environment(env: Environment) -> Result<Self, LockError> {
        let config = Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .map_err(|e| LockError::Config(e.to_string()))?;

        let lock_config: LockConfig = config
            .try_deserialize()
            .map_err(|e| LockError::Config(e.to_string()))?;
        lock_config.validate()?;

        Ok(lock_config)
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval_ms = duration_ms(interval);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = duration_ms(ttl);
        self
    }

    pub fn with_retry_sleep(mut self, sleep: Duration) -> Self {
        self.retry_sleep_ms = duration_ms(sleep);
        self
    }

    pub fn with_wait_retries(mut self, retries: u32) -> Self {
        self.wait_retries = retries;
        self
    }

    /// Check the timing invariants
    pub fn validate(&self) -> Result<(), LockError> {
        if self.namespace.is_empty() {
            return Err(LockError::Config("namespace must not be empty".to_string()));
        }
        if self.ttl_ms == 0 {
            return Err(LockError::Config("ttl must be positive".to_string()));
        }
        if self.ping_interval_ms == 0 {
            return Err(LockError::Config("ping interval must be positive".to_string()));
        }
        if self.ping_interval() >= self.ttl() {
            return Err(LockError::Config(format!(
                "ping interval {:?} must be shorter than ttl {:?}",
                self.ping_interval(),
                self.ttl()
            )));
        }
        Ok(())
    }

    /// Owner identifier, resolving the local hostname when none is configured
    pub fn resolved_owner(&self) -> String {
        match &self.owner {
            Some(owner) if !owner.is_empty() => owner.clone(),
            _ => local_hostname(),
        }
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn retry_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_sleep_ms)
    }
}

/// Whole milliseconds of a duration, saturating at `u64::MAX`
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
