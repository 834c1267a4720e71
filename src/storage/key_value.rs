// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded key-value store shared by every node of a runtime.
//!
//! Values are kept as serialized JSON strings behind one mutex. When the
//! store is persistent it is loaded from its file on open and mirrored back
//! to it on a fixed interval; the flusher copies a snapshot under the lock
//! and does all file work outside it, so `set`/`get` callers never wait on
//! disk.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::KeyValueStoreSettings;
use crate::errors::StoreError;
use crate::observability::messages::{store::*, StructuredLog};
use crate::utils::write_atomically;

#[derive(Debug)]
pub struct KeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    file_path: Option<PathBuf>,
    flush_interval: Duration,
    max_entries: usize,
}

impl KeyValueStore {
    /// A store that is never loaded from or written to disk.
    pub fn in_memory(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            file_path: None,
            flush_interval: Duration::ZERO,
            max_entries,
        }
    }

    /// Opens a store per `settings`, loading the backing file when persistence is on.
    pub fn open(settings: &KeyValueStoreSettings) -> Result<Self, StoreError> {
        let store = Self {
            entries: Mutex::new(HashMap::new()),
            file_path: settings
                .is_persistent()
                .then(|| settings.file_name.clone()),
            flush_interval: settings.flush_interval(),
            max_entries: settings.max_entries,
        };
        store.load()?;
        Ok(store)
    }

    /// Stores `value` under `key`, returning the previous serialized value.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let mut entries = self.lock();
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            return Err(StoreError::CapacityExceeded {
                key: key.to_string(),
                capacity: self.max_entries,
            });
        }
        Ok(entries.insert(key.to_string(), json))
    }

    /// Stores a JSON value, returning the previous value if there was one.
    pub fn set_value(&self, key: &str, value: &Value) -> Result<Option<Value>, StoreError> {
        Ok(self.set(key, value)?.map(|raw| parse_raw(&raw)))
    }

    /// Reads and deserializes `key`. A value of another shape reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self
            .get_raw(key)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    pub fn get_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get_raw(key)?.map(|raw| parse_raw(&raw)))
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        check_key(key)?;
        Ok(self.lock().remove(key).is_some())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn is_persistent(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Copy of every entry, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Writes a snapshot to the backing file through a sibling temp file.
    ///
    /// Returns `false` without touching disk when the store is memory-only.
    pub fn flush(&self) -> Result<bool, StoreError> {
        let Some(path) = self.file_path.as_deref() else {
            return Ok(false);
        };

        let snapshot = self.snapshot();
        let entries = snapshot.len();
        let object: Map<String, Value> = snapshot
            .into_iter()
            .map(|(key, raw)| (key, Value::String(raw)))
            .collect();
        let contents = format!("{:#}", Value::Object(object));

        write_atomically(path, contents.as_bytes()).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        StoreFlushed { path, entries }.log();
        Ok(true)
    }

    /// Flushes every interval until `shutdown` fires, then flushes once more.
    ///
    /// Returns `None` for a memory-only store.
    pub fn spawn_flusher(self: &Arc<Self>, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.is_persistent() || self.flush_interval.is_zero() {
            return None;
        }

        let store = Arc::clone(self);
        let period = self.flush_interval;
        Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => store.flush_logged(),
                }
            }
            store.flush_logged();
        }))
    }

    fn flush_logged(&self) {
        if let Err(error) = self.flush() {
            StoreFlushFailed { error: &error }.log();
        }
    }

    fn load(&self) -> Result<usize, StoreError> {
        let Some(path) = self.file_path.as_deref() else {
            return Ok(0);
        };

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(0);
        }

        let object: Map<String, Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let available = object.len();
        let mut entries = self.lock();
        for (key, value) in object {
            if entries.len() >= self.max_entries {
                break;
            }
            let raw = match value {
                Value::String(raw) => raw,
                other => other.to_string(),
            };
            entries.insert(key, raw);
        }
        let loaded = entries.len();
        drop(entries);

        StoreLoaded {
            path,
            entries: loaded,
            skipped: available - loaded,
        }
        .log();
        Ok(loaded)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

fn parse_raw(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn persisted(dir: &tempfile::TempDir) -> KeyValueStoreSettings {
        KeyValueStoreSettings::persisted(dir.path().join("kv.json"), Duration::from_secs(60))
    }

    #[test]
    fn test_blank_keys_are_rejected() {
        let store = KeyValueStore::in_memory(10);
        assert!(matches!(store.set("  ", &1), Err(StoreError::InvalidKey)));
        assert!(matches!(store.get_raw(""), Err(StoreError::InvalidKey)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_returns_previous_and_get_deserializes() {
        let store = KeyValueStore::in_memory(10);
        assert_eq!(store.set_value("count", &json!(1)).unwrap(), None);
        assert_eq!(store.set_value("count", &json!(2)).unwrap(), Some(json!(1)));

        let count: Option<i64> = store.get("count").unwrap();
        assert_eq!(count, Some(2));
        assert_eq!(store.get::<i64>("missing").unwrap(), None);
    }

    #[test]
    fn test_mismatched_type_reads_as_none() {
        let store = KeyValueStore::in_memory(10);
        store.set("name", "widget").unwrap();
        assert_eq!(store.get::<i64>("name").unwrap(), None);
        assert_eq!(store.get::<String>("name").unwrap(), Some("widget".to_string()));
    }

    #[test]
    fn test_store_is_bounded_but_overwrites_are_allowed() {
        let store = KeyValueStore::in_memory(2);
        store.set("a", &1).unwrap();
        store.set("b", &2).unwrap();

        match store.set("c", &3) {
            Err(StoreError::CapacityExceeded { key, capacity }) => {
                assert_eq!(key, "c");
                assert_eq!(capacity, 2);
            }
            other => panic!("Expected CapacityExceeded, got {:?}", other),
        }

        store.set("a", &10).unwrap();
        assert_eq!(store.get::<i64>("a").unwrap(), Some(10));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_flush_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let settings = persisted(&dir);

        let store = KeyValueStore::open(&settings).unwrap();
        store.set_value("user", &json!({"name": "ada", "id": 7})).unwrap();
        store.set("flag", &true).unwrap();
        assert!(store.flush().unwrap());

        let reopened = KeyValueStore::open(&settings).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(
            reopened.get_value("user").unwrap(),
            Some(json!({"name": "ada", "id": 7}))
        );
        assert_eq!(reopened.get::<bool>("flag").unwrap(), Some(true));
    }

    #[test]
    fn test_flush_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join("kv.json");
        let settings = KeyValueStoreSettings::persisted(&path, Duration::from_secs(60));

        let store = KeyValueStore::open(&settings).unwrap();
        store.set("k", &"v").unwrap();
        store.flush().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_zero_interval_is_memory_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.json");
        fs::write(&path, r#"{"existing": "1"}"#).unwrap();

        let settings = KeyValueStoreSettings {
            file_name: path.clone(),
            flush_interval_seconds: 0,
            max_entries: 10,
        };
        let store = KeyValueStore::open(&settings).unwrap();
        assert!(!store.is_persistent());
        assert!(store.is_empty());

        store.set("k", &"v").unwrap();
        assert!(!store.flush().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"existing": "1"}"#);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let settings = persisted(&dir);
        fs::write(&settings.file_name, "[1, 2").unwrap();

        assert!(matches!(
            KeyValueStore::open(&settings),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_load_respects_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = persisted(&dir);
        fs::write(&settings.file_name, r#"{"a": "1", "b": "2", "c": "3"}"#).unwrap();
        settings.max_entries = 2;

        let store = KeyValueStore::open(&settings).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_flusher_writes_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let settings = persisted(&dir);
        let store = Arc::new(KeyValueStore::open(&settings).unwrap());
        store.set("k", &42).unwrap();

        let shutdown = CancellationToken::new();
        let handle = store.spawn_flusher(shutdown.clone()).unwrap();
        shutdown.cancel();
        handle.await.unwrap();

        let reopened = KeyValueStore::open(&settings).unwrap();
        assert_eq!(reopened.get::<i64>("k").unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_memory_only_store_has_no_flusher() {
        let store = Arc::new(KeyValueStore::in_memory(5));
        assert!(store.spawn_flusher(CancellationToken::new()).is_none());
    }
}
