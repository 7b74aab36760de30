//! Bounded fingerprint cache.
//!
//! Backed by [`lru::LruCache`]. Under [`EvictionPolicy::InsertionOrder`]
//! lookups use `peek`, so the recency list only ever reflects insertion order
//! and the oldest inserted entry is the one evicted. Under
//! [`EvictionPolicy::LeastRecentlyUsed`] lookups use `get` and promote.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::config::EvictionPolicy;
use crate::fingerprint::Fingerprint;

/// Cache key: the raw text plus the language it was normalized for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    language: String,
    text: String,
}

impl CacheKey {
    pub(crate) fn new(text: &str, language_id: &str) -> Self {
        Self {
            language: language_id.trim().to_ascii_lowercase(),
            text: text.to_owned(),
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub(crate) struct FingerprintCache {
    entries: LruCache<CacheKey, Arc<Fingerprint>>,
    policy: EvictionPolicy,
}

impl FingerprintCache {
    /// `None` when `capacity` is zero.
    pub(crate) fn new(capacity: usize, policy: EvictionPolicy) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            entries: LruCache::new(capacity),
            policy,
        })
    }

    pub(crate) fn lookup(&mut self, key: &CacheKey) -> Option<Arc<Fingerprint>> {
        match self.policy {
            EvictionPolicy::InsertionOrder => self.entries.peek(key).cloned(),
            EvictionPolicy::LeastRecentlyUsed => self.entries.get(key).cloned(),
        }
    }

    /// Insert `value` unless `key` is already present. Returns `true` when an
    /// entry had to be evicted to make room.
    pub(crate) fn insert(&mut self, key: CacheKey, value: Arc<Fingerprint>) -> bool {
        if self.entries.contains(&key) {
            return false;
        }
        self.entries.push(key, value).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
