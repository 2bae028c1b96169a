//! Session-scoped tracker management.
//!
//! Live trackers are cached in memory and mirrored to a [`KeyValueStore`].
//! A cache miss rehydrates from the store; an unreadable record starts a
//! fresh tracker. Writes are best effort. Cache entries idle for longer than
//! the record TTL are dropped, so an expired session starts over.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rom_core::{RomSnapshot, RomTracker, StorageError, TrackerRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

/// Maximum accepted session id length.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Checks that a session id is non-empty, at most
/// [`MAX_SESSION_ID_LEN`] characters and limited to `[A-Za-z0-9_-]`.
///
/// # Errors
///
/// Returns the reason the id is rejected.
pub fn validate_session_id(session_id: &str) -> Result<(), String> {
    if session_id.is_empty() {
        return Err("session id must not be empty".to_string());
    }
    if session_id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(format!(
            "session id must be at most {MAX_SESSION_ID_LEN} characters"
        ));
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("session id may only contain letters, digits, '_' and '-'".to_string());
    }
    Ok(())
}

/// Identity of one tracker: `"{session_id}:{body_part}:{movement_type}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerKey {
    pub session_id: String,
    pub body_part: String,
    pub movement_type: String,
}

impl TrackerKey {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        body_part: impl Into<String>,
        movement_type: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            body_part: body_part.into(),
            movement_type: movement_type.into(),
        }
    }

    /// Store key prefix shared by every tracker of a session.
    #[must_use]
    pub fn session_prefix(session_id: &str) -> String {
        format!("{session_id}:")
    }

    /// Parses a store key. Returns `None` unless it has three `:`-separated parts.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.splitn(3, ':');
        let (session_id, body_part, movement_type) = (parts.next()?, parts.next()?, parts.next()?);
        if session_id.is_empty() || body_part.is_empty() || movement_type.is_empty() {
            return None;
        }
        Some(Self::new(session_id, body_part, movement_type))
    }
}

impl fmt::Display for TrackerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.session_id, self.body_part, self.movement_type)
    }
}

/// Per-tracker entry of a [`SessionSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub rom: RomSnapshot,
    pub frame_count: u64,
    pub valid_frame_count: u64,
}

/// All trackers of one session: body part → movement type → summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub trackers: BTreeMap<String, BTreeMap<String, TrackerSummary>>,
}

/// A cached tracker, locked per update.
pub type SharedTracker = Arc<Mutex<RomTracker>>;

struct CacheEntry {
    tracker: SharedTracker,
    touched: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.touched) < ttl
    }
}

/// Owns the tracker cache and its backing store.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    cache: RwLock<HashMap<TrackerKey, CacheEntry>>,
    smoothing_window: usize,
    ttl: Duration,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("cached_trackers", &self.cache.read().len())
            .field("smoothing_window", &self.smoothing_window)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, smoothing_window: usize, ttl: Duration) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            smoothing_window,
            ttl,
        }
    }

    /// Returns the cached tracker for `key`, rehydrating it from the store or
    /// creating a fresh one on a miss.
    ///
    /// A cached tracker idle for longer than the TTL counts as a miss, and a
    /// miss also drops every other idle entry.
    pub async fn tracker(&self, key: &TrackerKey) -> SharedTracker {
        let now = Instant::now();
        {
            let mut cache = self.cache.write();
            if let Some(entry) = cache.get_mut(key) {
                if entry.is_fresh(self.ttl, now) {
                    entry.touched = now;
                    return Arc::clone(&entry.tracker);
                }
            }
            let before = cache.len();
            cache.retain(|_, entry| entry.is_fresh(self.ttl, now));
            let evicted = before - cache.len();
            if evicted > 0 {
                debug!(evicted, "dropped idle trackers");
            }
        }

        let loaded = self.load(key).await;
        let mut cache = self.cache.write();
        // A concurrent miss may have filled the slot while we were loading.
        let entry = cache.entry(key.clone()).or_insert_with(|| CacheEntry {
            tracker: Arc::new(Mutex::new(loaded)),
            touched: Instant::now(),
        });
        Arc::clone(&entry.tracker)
    }

    async fn load(&self, key: &TrackerKey) -> RomTracker {
        let fresh = || RomTracker::new(&key.body_part, &key.movement_type, self.smoothing_window);
        let raw = match self.store.get(&key.to_string()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return fresh(),
            Err(err) => {
                warn!(%key, error = %err, "tracker read failed, starting fresh");
                return fresh();
            }
        };
        match serde_json::from_str::<TrackerRecord>(&raw) {
            Ok(record) => {
                debug!(%key, frames = record.frame_count, "rehydrated tracker");
                RomTracker::from_record(record, self.smoothing_window)
            }
            Err(err) => {
                warn!(%key, error = %err, "undecodable tracker record, starting fresh");
                fresh()
            }
        }
    }

    /// Writes a tracker record to the store. Failures are logged and ignored.
    pub async fn persist(&self, key: &TrackerKey, record: &TrackerRecord) {
        if let Err(err) = self.try_persist(key, record).await {
            warn!(%key, error = %err, "tracker write failed");
        }
    }

    async fn try_persist(&self, key: &TrackerKey, record: &TrackerRecord) -> Result<(), StorageError> {
        let value = serde_json::to_string(record)?;
        self.store.set(&key.to_string(), value, Some(self.ttl)).await
    }

    /// Summarises every tracker of a session, or `None` if it has none.
    ///
    /// Stored records are overlaid with cached trackers, which may be newer
    /// when a write failed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionSummary>, StorageError> {
        let stored = self
            .store
            .get_by_prefix(&TrackerKey::session_prefix(session_id))
            .await?;

        let mut records: BTreeMap<TrackerKey, TrackerRecord> = BTreeMap::new();
        for (raw_key, raw) in stored {
            let Some(key) = TrackerKey::parse(&raw_key) else {
                continue;
            };
            match serde_json::from_str::<TrackerRecord>(&raw) {
                Ok(record) => {
                    records.insert(key, record);
                }
                Err(err) => warn!(key = %raw_key, error = %err, "skipping undecodable tracker record"),
            }
        }
        let now = Instant::now();
        let cached: Vec<(TrackerKey, SharedTracker)> = self
            .cache
            .read()
            .iter()
            .filter(|(key, entry)| key.session_id == session_id && entry.is_fresh(self.ttl, now))
            .map(|(key, entry)| (key.clone(), Arc::clone(&entry.tracker)))
            .collect();
        for (key, tracker) in cached {
            records.insert(key, tracker.lock().to_record());
        }

        if records.is_empty() {
            return Ok(None);
        }

        let mut trackers: BTreeMap<String, BTreeMap<String, TrackerSummary>> = BTreeMap::new();
        for (key, record) in records {
            let tracker = RomTracker::from_record(record, self.smoothing_window);
            trackers.entry(key.body_part).or_default().insert(
                key.movement_type,
                TrackerSummary {
                    rom: tracker.current_rom(),
                    frame_count: tracker.frame_count(),
                    valid_frame_count: tracker.valid_frame_count(),
                },
            );
        }
        Ok(Some(SessionSummary {
            session_id: session_id.to_string(),
            trackers,
        }))
    }

    /// Drops every tracker of a session from the cache and the store.
    /// Returns the number of stored records removed.
    ///
    /// # Errors
    ///
    /// Propagates store failures; the cache is cleared regardless.
    pub async fn clear_session(&self, session_id: &str) -> Result<usize, StorageError> {
        let evicted = {
            let mut cache = self.cache.write();
            let before = cache.len();
            cache.retain(|key, _| key.session_id != session_id);
            before - cache.len()
        };
        let removed = self
            .store
            .delete_by_prefix(&TrackerKey::session_prefix(session_id))
            .await?;
        info!(session_id, evicted, removed, "cleared session");
        Ok(removed)
    }

    /// Distinct session ids with a live record in the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn active_sessions(&self) -> Result<Vec<String>, StorageError> {
        let ids: BTreeSet<String> = self
            .store
            .get_by_prefix("")
            .await?
            .keys()
            .filter_map(|key| TrackerKey::parse(key))
            .map(|key| key.session_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    /// Number of trackers held in memory.
    #[must_use]
    pub fn cached_trackers(&self) -> usize {
        self.cache.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn manager(store: Arc<InMemoryStore>) -> SessionManager {
        SessionManager::new(store, 5, Duration::from_secs(3600))
    }

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("patient-42_a").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id("a:b").is_err());
        assert!(validate_session_id(&"x".repeat(129)).is_err());
        assert!(validate_session_id(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_tracker_key_format() {
        let key = TrackerKey::new("s1", "lower_back", "flexion");
        assert_eq!(key.to_string(), "s1:lower_back:flexion");
        assert_eq!(TrackerKey::parse("s1:lower_back:flexion"), Some(key));
        assert!(TrackerKey::parse("s1:lower_back").is_none());
    }

    #[tokio::test]
    async fn test_cache_returns_same_tracker() {
        let manager = manager(Arc::new(InMemoryStore::new()));
        let key = TrackerKey::new("s1", "knee", "flexion");
        let a = manager.tracker(&key).await;
        let b = manager.tracker(&key).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.cached_trackers(), 1);
    }

    #[tokio::test]
    async fn test_rehydrates_from_store() {
        let store = Arc::new(InMemoryStore::new());
        let key = TrackerKey::new("s1", "knee", "flexion");
        {
            let first = manager(Arc::clone(&store));
            let tracker = first.tracker(&key).await;
            let record = {
                let mut t = tracker.lock();
                t.record(Some(40.0));
                t.record(Some(60.0));
                t.to_record()
            };
            first.persist(&key, &record).await;
        }

        let second = manager(store);
        let tracker = second.tracker(&key).await;
        let t = tracker.lock();
        assert_eq!(t.frame_count(), 2);
        assert_eq!(t.current_rom().current, 50.0);
    }

    #[tokio::test]
    async fn test_undecodable_record_starts_fresh() {
        let store = Arc::new(InMemoryStore::new());
        store.set("s1:knee:flexion", "not json".into(), None).await.unwrap();
        let manager = manager(store);
        let tracker = manager.tracker(&TrackerKey::new("s1", "knee", "flexion")).await;
        assert_eq!(tracker.lock().frame_count(), 0);
    }

    #[tokio::test]
    async fn test_get_and_clear_session() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(Arc::clone(&store));
        for (bp, mt) in [("knee", "flexion"), ("lower_back", "rotation")] {
            let key = TrackerKey::new("s1", bp, mt);
            let tracker = manager.tracker(&key).await;
            let record = {
                let mut t = tracker.lock();
                t.record(Some(10.0));
                t.to_record()
            };
            manager.persist(&key, &record).await;
        }
        manager.tracker(&TrackerKey::new("s2", "hip", "flexion")).await;

        let summary = manager.get_session("s1").await.unwrap().unwrap();
        assert_eq!(summary.trackers.len(), 2);
        assert_eq!(summary.trackers["knee"]["flexion"].frame_count, 1);
        assert_eq!(summary.trackers["knee"]["flexion"].rom.current, 10.0);

        // s2 was never persisted
        assert_eq!(manager.active_sessions().await.unwrap(), vec!["s1"]);

        assert_eq!(manager.clear_session("s1").await.unwrap(), 2);
        assert!(manager.get_session("s1").await.unwrap().is_none());
        assert_eq!(manager.cached_trackers(), 1);
        assert!(store.get("s1:knee:flexion").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idle_tracker_expires_with_its_record() {
        let store = Arc::new(InMemoryStore::new());
        let manager = SessionManager::new(store.clone(), 5, Duration::from_millis(20));
        let key = TrackerKey::new("s1", "knee", "flexion");
        let tracker = manager.tracker(&key).await;
        let record = {
            let mut t = tracker.lock();
            t.record(Some(30.0));
            t.to_record()
        };
        manager.persist(&key, &record).await;
        assert_eq!(manager.active_sessions().await.unwrap(), vec!["s1"]);

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(manager.active_sessions().await.unwrap().is_empty());
        assert!(manager.get_session("s1").await.unwrap().is_none());

        let renewed = manager.tracker(&key).await;
        assert!(!Arc::ptr_eq(&tracker, &renewed));
        assert_eq!(renewed.lock().frame_count(), 0);
        assert_eq!(renewed.lock().min_angle(), None);
    }

    #[tokio::test]
    async fn test_idle_entries_are_dropped_on_miss() {
        let manager = SessionManager::new(
            Arc::new(InMemoryStore::new()),
            5,
            Duration::from_millis(20),
        );
        manager.tracker(&TrackerKey::new("s1", "knee", "flexion")).await;
        manager.tracker(&TrackerKey::new("s2", "hip", "flexion")).await;
        assert_eq!(manager.cached_trackers(), 2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        manager.tracker(&TrackerKey::new("s3", "knee", "flexion")).await;
        assert_eq!(manager.cached_trackers(), 1);
    }

    #[tokio::test]
    async fn test_cached_tracker_overlays_failed_write() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(Arc::clone(&store));
        let key = TrackerKey::new("s1", "knee", "flexion");
        let tracker = manager.tracker(&key).await;
        let record = {
            let mut t = tracker.lock();
            t.record(Some(10.0));
            t.to_record()
        };
        manager.persist(&key, &record).await;
        // a later frame whose write never reached the store
        tracker.lock().record(Some(20.0));

        let summary = manager.get_session("s1").await.unwrap().unwrap();
        assert_eq!(summary.trackers["knee"]["flexion"].frame_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let manager = manager(Arc::new(InMemoryStore::new()));
        assert!(manager.get_session("nobody").await.unwrap().is_none());
    }
}
