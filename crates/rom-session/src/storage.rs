//! Key-value storage for tracker state.
//!
//! The analyzer persists one JSON record per tracker. Any backend offering
//! get/set-with-TTL/delete and prefix scans can implement [`KeyValueStore`];
//! [`InMemoryStore`] is the process-local default.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use rom_core::StorageError;

/// Async key-value store with optional per-entry expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError>;

    /// Removes `key`. Returns `true` if it was present.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Returns every live entry whose key starts with `prefix`.
    async fn get_by_prefix(&self, prefix: &str) -> Result<BTreeMap<String, String>, StorageError>;

    /// Removes every entry whose key starts with `prefix`. Returns the count removed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, StorageError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local store. Expired entries are invisible to reads and dropped
/// lazily on writes and by [`InMemoryStore::purge_expired`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.is_live(now)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError> {
        let now = Instant::now();
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let now = Instant::now();
        Ok(self
            .entries
            .write()
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<BTreeMap<String, String>, StorageError> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && entry.is_live(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let doomed: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        let mut removed = 0;
        for key in doomed {
            if entries.remove(&key).is_some_and(|entry| entry.is_live(now)) {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryStore::new();
        store.set("a:knee:flexion", "{}".into(), None).await.unwrap();
        assert_eq!(store.get("a:knee:flexion").await.unwrap().as_deref(), Some("{}"));
        assert!(store.delete("a:knee:flexion").await.unwrap());
        assert!(!store.delete("a:knee:flexion").await.unwrap());
        assert!(store.get("a:knee:flexion").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prefix_operations() {
        let store = InMemoryStore::new();
        for key in ["s1:knee:flexion", "s1:hip:flexion", "s2:knee:flexion"] {
            store.set(key, key.to_string(), None).await.unwrap();
        }
        let s1 = store.get_by_prefix("s1:").await.unwrap();
        assert_eq!(s1.len(), 2);
        assert!(s1.contains_key("s1:hip:flexion"));

        assert_eq!(store.delete_by_prefix("s1:").await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_prefix("").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible() {
        let store = InMemoryStore::new();
        store.set("kept", "y".into(), Some(Duration::from_secs(60))).await.unwrap();
        store.set("gone", "x".into(), Some(Duration::ZERO)).await.unwrap();
        assert!(store.get("gone").await.unwrap().is_none());
        assert_eq!(store.get_by_prefix("").await.unwrap().len(), 1);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
