//! Bounded memoization for query and statistics results.
//!
//! Keys are (operation name, parameter fingerprint, store generation). A
//! re-ingestion bumps the store generation, which invalidates every cached
//! table at once. There is no partial invalidation and no implicit
//! framework magic. Tables are small (thousands of rows), so hits return
//! clones rather than references.

use crate::error::Result;
use std::collections::{HashMap, VecDeque};

const DEFAULT_CAPACITY: usize = 32;

struct Entry<T> {
    generation: u64,
    value: T,
}

/// Bounded per-table-type memo.
pub struct Memo<T> {
    capacity: usize,
    entries: HashMap<String, Entry<T>>,
    insertion_order: VecDeque<String>,
}

impl<T: Clone> Memo<T> {
    /// Memo with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Memo bounded to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached value for (op, params, generation), computing and
    /// caching it on a miss. A stale-generation hit is a miss.
    pub fn fetch<F>(&mut self, op: &str, params: &str, generation: u64, compute: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let key = format!("{op}\u{1f}{params}");
        if let Some(entry) = self.entries.get(&key) {
            if entry.generation == generation {
                return Ok(entry.value.clone());
            }
        }

        let value = compute()?;
        self.insert(key, generation, value.clone());
        Ok(value)
    }

    fn insert(&mut self, key: String, generation: u64, value: T) {
        if !self.entries.contains_key(&key) {
            self.make_room(generation);
            self.insertion_order.push_back(key.clone());
        }
        self.entries.insert(key, Entry { generation, value });
    }

    fn make_room(&mut self, generation: u64) {
        if self.entries.len() < self.capacity {
            return;
        }
        // Stale generations go first; they can never hit again.
        self.entries.retain(|_, e| e.generation == generation);
        self.insertion_order.retain(|k| self.entries.contains_key(k));
        // Still full: evict oldest insertions.
        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
