/*!
 * Node-local cache tier: capacity-bounded, time-expiring, least-recently-used eviction.
 */

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

#[derive(Debug)]
struct LocalEntry {
    value: String,
    expires_at: Instant,
    tick: u64,
}

#[derive(Debug, Default)]
struct LocalState {
    entries: HashMap<String, LocalEntry>,
    /// Access order: tick -> key, oldest first
    order: BTreeMap<u64, String>,
    next_tick: u64,
}

impl LocalState {
    fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;
        if let Some(entry) = self.entries.get_mut(key) {
            self.order.remove(&entry.tick);
            entry.tick = tick;
            self.order.insert(tick, key.to_string());
        }
    }

    fn remove(&mut self, key: &str) -> Option<LocalEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.tick);
        Some(entry)
    }
}

/// In-process tier of the two-tier cache
#[derive(Debug)]
pub struct LocalTier {
    state: Mutex<LocalState>,
    capacity: usize,
    ttl: Duration,
}

impl LocalTier {
    /// Create a tier holding at most `capacity` entries, each living `ttl`
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Get a live value and mark it as recently used
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        let expired = match state.entries.get(key) {
            Some(entry) => entry.expires_at <= Instant::now(),
            None => return None,
        };
        if expired {
            state.remove(key);
            return None;
        }
        state.touch(key);
        state.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or replace a value, evicting the least recently used entry when full
    pub fn put(&self, key: &str, value: &str) {
        let mut state = self.state.lock();
        state.remove(key);

        while state.entries.len() >= self.capacity {
            let oldest = state.order.iter().next().map(|(_, k)| k.clone());
            match oldest {
                Some(oldest) => {
                    state.remove(&oldest);
                    debug!("Local cache full, evicted least recently used entry");
                }
                None => break,
            }
        }

        let tick = state.next_tick;
        state.next_tick += 1;
        state.entries.insert(
            key.to_string(),
            LocalEntry {
                value: value.to_string(),
                expires_at: Instant::now() + self.ttl,
                tick,
            },
        );
        state.order.insert(tick, key.to_string());
    }

    /// Remove a key, returning whether it was present
    pub fn evict(&self, key: &str) -> bool {
        self.state.lock().remove(key).is_some()
    }

    /// Whether a live value exists, without touching recency
    pub fn contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .entries
            .get(key)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    /// Number of stored entries, including ones not yet noticed as expired
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
