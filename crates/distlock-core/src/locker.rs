//! Object-safe locking traits
//!
//! Lets call sites depend on `dyn Locker` and swap in `NoopLocker` where no backend exists

use async_trait::async_trait;
use distlock_common::LockError;

use crate::lock::{Lease, LockManager};

/// A held lock that can be released
#[async_trait]
pub trait Releaser: Send + Sync {
    async fn release(&self) -> Result<(), LockError>;
}

/// Acquires named locks
#[async_trait]
pub trait Locker: Send + Sync {
    /// Single attempt; `LockError::Locked` when the name is held
    async fn lock(&self, name: &str) -> Result<Box<dyn Releaser>, LockError>;

    /// Retry until acquired or the fault budget is exhausted
    async fn lock_wait(&self, name: &str) -> Result<Box<dyn Releaser>, LockError>;
}

#[async_trait]
impl Releaser for Lease {
    async fn release(&self) -> Result<(), LockError> {
        Lease::release(self).await
    }
}

#[async_trait]
impl Locker for LockManager {
    async fn lock(&self, name: &str) -> Result<Box<dyn Releaser>, LockError> {
        let lease = LockManager::lock(self, name).await?;
        Ok(Box::new(lease))
    }

    async fn lock_wait(&self, name: &str) -> Result<Box<dyn Releaser>, LockError> {
        let lease = LockManager::lock_wait(self, name).await?;
        Ok(Box::new(lease))
    }
}

/// Releaser that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReleaser;

#[async_trait]
impl Releaser for NoopReleaser {
    async fn release(&self) -> Result<(), LockError> {
        Ok(())
    }
}

/// Locker that always succeeds without touching any backend
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocker;

#[async_trait]
impl Locker for NoopLocker {
    async fn lock(&self, _name: &str) -> Result<Box<dyn Releaser>, LockError> {
        Ok(Box::new(NoopReleaser))
    }

    async fn lock_wait(&self, _name: &str) -> Result<Box<dyn Releaser>, LockError> {
        Ok(Box::new(NoopReleaser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distlock_common::LockConfig;
    use distlock_storage::MemoryLockStore;
    use std::sync::Arc;
    use std::time::Duration;

    // Verify object safety of both traits.
    fn _assert_dyn_releaser(_: &dyn Releaser) {}
    fn _assert_dyn_locker(_: &dyn Locker) {}

    #[tokio::test]
    async fn test_noop_locker_always_succeeds() {
        let locker: Box<dyn Locker> = Box::new(NoopLocker);

        let first = locker.lock("job").await.unwrap();
        let second = locker.lock("job").await.unwrap();
        let third = locker.lock_wait("job").await.unwrap();

        first.release().await.unwrap();
        second.release().await.unwrap();
        third.release().await.unwrap();
        third.release().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_manager_as_dyn_locker() {
        let config = LockConfig::new("test")
            .with_owner("host-a")
            .with_ping_interval(Duration::from_millis(500))
            .with_ttl(Duration::from_secs(2));
        let manager = LockManager::new(Arc::new(MemoryLockStore::new()), config).unwrap();
        let locker: Arc<dyn Locker> = Arc::new(manager);

        let held = locker.lock("job").await.unwrap();
        assert!(matches!(locker.lock("job").await, Err(LockError::Locked)));

        held.release().await.unwrap();
        let again = locker.lock_wait("job").await.unwrap();
        again.release().await.unwrap();
    }
}
