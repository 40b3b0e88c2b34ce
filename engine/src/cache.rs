use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Transient key-value store with per-entry TTL.
///
/// Backs OTP and session state: entries expire lazily on read, and
/// [`ExpiringCache::take`] implements the verify-once pattern (a successful
/// read consumes the entry). Interior mutability behind a mutex so one
/// instance can be shared as an injected collaborator.
pub struct ExpiringCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn put(&self, key: K, value: V, ttl: Duration) {
        self.put_at(key, value, ttl, Utc::now());
    }

    pub fn put_at(&self, key: K, value: V, ttl: Duration, now: DateTime<Utc>) {
        self.entries.lock().expect("cache poisoned").insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Read an entry, dropping it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Read and consume an entry (the OTP-verify pattern).
    pub fn take(&self, key: &K) -> Option<V> {
        self.take_at(key, Utc::now())
    }

    pub fn take_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache poisoned");
        let entry = entries.remove(key)?;
        (entry.expires_at > now).then_some(entry.value)
    }

    pub fn remove(&self, key: &K) {
        self.entries.lock().expect("cache poisoned").remove(key);
    }

    /// Drop every entry that has expired as of `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.entries
            .lock()
            .expect("cache poisoned")
            .retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for ExpiringCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
