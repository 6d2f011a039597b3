//! Optional LRU layer in front of a [`PostingsSource`].
//!
//! The cache is keyed by `(offset, length)` and may be shared by several readers, each with its
//! own file handle.

use crate::error::Result;
use crate::persist::PostingsSource;
use crate::DocId;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

type Key = (u64, u32);

/// Small LRU map from postings location to decoded list.
pub struct LruCache {
    capacity: usize,
    items: HashMap<Key, Arc<Vec<DocId>>>,
    access_order: VecDeque<Key>,
}

impl LruCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: HashMap::with_capacity(capacity),
            access_order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&mut self, key: &Key) -> Option<Arc<Vec<DocId>>> {
        let value = self.items.get(key)?.clone();
        self.touch(*key);
        Some(value)
    }

    pub fn insert(&mut self, key: Key, value: Arc<Vec<DocId>>) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() >= self.capacity && !self.items.contains_key(&key) {
            if let Some(oldest) = self.access_order.pop_front() {
                self.items.remove(&oldest);
            }
        }
        self.touch(key);
        self.items.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn touch(&mut self, key: Key) {
        self.access_order.retain(|k| *k != key);
        self.access_order.push_back(key);
    }
}

pub type SharedCache = Arc<Mutex<LruCache>>;

pub fn shared_cache(capacity: usize) -> SharedCache {
    Arc::new(Mutex::new(LruCache::new(capacity)))
}

/// Wraps a source and answers repeated loads from the shared cache.
pub struct CachedPostings<S> {
    source: S,
    cache: SharedCache,
}

impl<S: PostingsSource> CachedPostings<S> {
    pub fn new(source: S, cache: SharedCache) -> Self {
        Self { source, cache }
    }
}

impl<S: PostingsSource> PostingsSource for CachedPostings<S> {
    fn load(&mut self, offset: u64, length: u32) -> Result<Vec<DocId>> {
        let key = (offset, length);
        if let Some(hit) = self.cache.lock().get(&key) {
            return Ok(hit.as_ref().clone());
        }
        let postings = self.source.load(offset, length)?;
        self.cache.lock().insert(key, Arc::new(postings.clone()));
        Ok(postings)
    }
}
