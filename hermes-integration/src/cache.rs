use std::hash::Hash;

use hermes_profiling::{CollectedProfile, ProfileId};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Completed profiles waiting for the envelope of their transaction.
pub type ProfileQueue = FifoCache<ProfileId, CollectedProfile>;

/// A bounded map that evicts in insertion order.
///
/// Once the capacity is exceeded, the entry inserted first is dropped. Reading an entry does not
/// affect its position, and re-adding an existing key replaces the value without moving it.
#[derive(Debug)]
pub struct FifoCache<K, V> {
    capacity: usize,
    entries: Mutex<IndexMap<K, V>>,
}

impl<K, V> FifoCache<K, V>
where
    K: Hash + Eq + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
        }
    }

    /// Inserts or replaces the value for `key`.
    pub fn add(&self, key: K, value: V) {
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get_mut(&key) {
            *existing = value;
            return;
        }

        entries.insert(key, value);

        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                hermes_log::debug!(key = ?evicted, "evicted oldest entry from profile queue");
            }
        }
    }

    /// Returns a copy of the value for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    /// Removes the value for `key`, if any.
    pub fn delete(&self, key: &K) {
        self.entries.lock().shift_remove(key);
    }

    /// Removes and returns the value for `key`.
    ///
    /// Concurrent callers never both receive the same value.
    pub fn take(&self, key: &K) -> Option<V> {
        self.entries.lock().shift_remove(key)
    }

    /// Returns the number of entries.
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
