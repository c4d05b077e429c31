//! Distlock Integration Tests
//!
//! Several lock managers, each standing in for a separate process, share
//! one in-memory backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use distlock_core::{
    LockConfig, LockError, LockManager, LockRecord, Locker, MemoryLockStore, RecordKey,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(owner: &str) -> LockConfig {
    LockConfig::new("it")
        .with_owner(owner)
        .with_ping_interval(Duration::from_millis(200))
        .with_ttl(Duration::from_secs(1))
        .with_retry_sleep(Duration::from_millis(10))
}

fn manager(store: &Arc<MemoryLockStore>, owner: &str) -> LockManager {
    LockManager::new(store.clone(), config(owner)).unwrap()
}

// ============== Example Scenario ==============

#[tokio::test]
async fn test_batch_job_scenario() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());
    let caller_a = manager(&store, "host-a");
    let caller_b = manager(&store, "host-b");

    let lease = caller_a.lock("batch-job-42").await.unwrap();

    let key = RecordKey::new("it", "distlock", "batch-job-42").unwrap();
    let record = LockRecord::from_bins(&store.get(&key).unwrap()).unwrap();
    assert_eq!(record.name, "batch-job-42");
    assert_eq!(record.hostname, "host-a");

    assert_eq!(
        caller_b.lock("batch-job-42").await.unwrap_err(),
        LockError::Locked
    );

    lease.release().await.unwrap();

    let lease = caller_b.lock("batch-job-42").await.unwrap();
    let record = LockRecord::from_bins(&store.get(&key).unwrap()).unwrap();
    assert_eq!(record.hostname, "host-b");
    lease.release().await.unwrap();
}

// ============== Concurrency Tests ==============

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lock_wait_serializes_critical_sections() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..8 {
        let locker = manager(&store, &format!("worker-{}", i));
        let inside = inside.clone();
        let completed = completed.clone();

        handles.push(tokio::spawn(async move {
            let lease = locker.lock_wait("shared").await.unwrap();

            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
            tokio::time::sleep(Duration::from_millis(5)).await;
            inside.fetch_sub(1, Ordering::SeqCst);

            completed.fetch_add(1, Ordering::SeqCst);
            lease.release().await.unwrap();
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(completed.load(Ordering::SeqCst), 8);
    assert!(store.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_single_shot_has_one_winner() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let locker = manager(&store, &format!("worker-{}", i));
        handles.push(tokio::spawn(async move { locker.lock("race").await }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(lease) => winners.push(lease),
            Err(e) => assert_eq!(e, LockError::Locked),
        }
    }

    assert_eq!(winners.len(), 1);
    winners[0].release().await.unwrap();
}

// ============== Lease Lifetime Tests ==============

#[tokio::test]
async fn test_keepalive_holds_lock_past_ttl() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());
    let holder = manager(&store, "host-a");
    let other = manager(&store, "host-b");

    let lease = holder.lock("long-job").await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(matches!(other.lock("long-job").await, Err(LockError::Locked)));
    lease.release().await.unwrap();
}

#[tokio::test]
async fn test_dropped_lease_frees_name() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());
    let locker = manager(&store, "host-a");

    async fn fail_midway(locker: &LockManager) -> Result<(), LockError> {
        let _lease = locker.lock("job").await?;
        Err(LockError::Config("simulated failure".to_string()))
    }

    assert!(fail_midway(&locker).await.is_err());

    let lease = locker
        .lock_wait_timeout("job", Duration::from_millis(500))
        .await
        .unwrap();
    lease.release().await.unwrap();
}

#[tokio::test]
async fn test_locker_trait_object() {
    init_tracing();
    let store = Arc::new(MemoryLockStore::new());
    let locker: Box<dyn Locker> = Box::new(manager(&store, "host-a"));

    let releaser = locker.lock_wait("dyn-job").await.unwrap();
    assert_eq!(store.len(), 1);

    releaser.release().await.unwrap();
    releaser.release().await.unwrap();
    assert!(store.is_empty());
}
