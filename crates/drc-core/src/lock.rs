//! Per-stack mutual exclusion.
//!
//! Both entry points can fire for the same stack at once. Holding a stack's
//! lock across check, fetch, persist and relink makes the second caller see
//! the first caller's edge.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by stack identifier.
///
/// Entries exist only while some caller holds or waits on them. Cloning is
/// cheap and shares the registry.
#[derive(Debug, Clone, Default)]
pub struct StackLocks {
  inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl StackLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to `identifier`.
  pub async fn acquire(&self, identifier: &str) -> StackLockGuard {
    let mutex = self
      .inner
      .entry(identifier.to_owned())
      .or_default()
      .value()
      .clone();
    let guard = mutex.lock_owned().await;
    StackLockGuard {
      guard:      Some(guard),
      registry:   self.inner.clone(),
      identifier: identifier.to_owned(),
    }
  }

  /// Number of identifiers currently locked or awaited.
  pub fn len(&self) -> usize { self.inner.len() }

  pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

/// Releases the stack lock on drop and prunes the registry entry when nobody
/// else references it.
#[derive(Debug)]
pub struct StackLockGuard {
  guard:      Option<OwnedMutexGuard<()>>,
  registry:   Arc<DashMap<String, Arc<Mutex<()>>>>,
  identifier: String,
}

impl Drop for StackLockGuard {
  fn drop(&mut self) {
    // Release first so our own reference no longer counts.
    self.guard.take();
    self
      .registry
      .remove_if(&self.identifier, |_, m| Arc::strong_count(m) == 1);
  }
}
