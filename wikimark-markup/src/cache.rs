//! Keyed, compute-once snapshots of read-only configuration.
//!
//! The whitelist and the compiled token rules are built lazily the first time
//! a render needs them and then shared behind an [`Arc`] by every later render.
use std::{
  collections::HashMap,
  sync::{Arc, PoisonError, RwLock},
};

/// Memoizes immutable values by string key.
///
/// Initialization never holds the lock while building: two renders racing on a
/// cold key may both build a value, but only the first one inserted is kept and
/// returned to both. After that, lookups only take the shared read lock.
#[derive(Debug)]
pub struct SnapshotCache<T> {
  entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for SnapshotCache<T> {
  fn default() -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
    }
  }
}

impl<T> SnapshotCache<T> {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Return the snapshot for `key`, building it with `init` if absent.
  pub fn get_or_init<F>(&self, key: &str, init: F) -> Arc<T>
  where
    F: FnOnce() -> T,
  {
    if let Some(existing) = self.get(key) {
      return existing;
    }

    let built = Arc::new(init());
    let mut entries =
      self.entries.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(entries.entry(key.to_string()).or_insert(built))
  }

  /// Return the snapshot for `key` without building it.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<Arc<T>> {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .map(Arc::clone)
  }

  /// Drop the snapshot for `key` so the next access rebuilds it.
  pub fn invalidate(&self, key: &str) -> bool {
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(key)
      .is_some()
  }

  /// Number of cached snapshots.
  #[must_use]
  pub fn len(&self) -> usize {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
