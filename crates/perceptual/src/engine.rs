//! Memoizing fingerprint engine.
//!
//! Each [`FingerprintEngine`] owns its cache; there is no process-wide state.
//! The cache sits behind a `Mutex`, so one engine can be shared through an
//! `Arc` by many analyzers and streaming sessions on different threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStats, FingerprintCache};
use crate::config::{PerceptualConfig, PerceptualError};
use crate::fingerprint::Fingerprint;
use crate::similarity::fingerprint_similarity;

pub struct FingerprintEngine {
    config: PerceptualConfig,
    cache: Option<Mutex<FingerprintCache>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    poison_reported: AtomicBool,
}

impl FingerprintEngine {
    /// Build an engine after validating `config`.
    pub fn new(config: PerceptualConfig) -> Result<Self, PerceptualError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: PerceptualConfig) -> Self {
        let cache = FingerprintCache::new(config.cache_capacity, config.eviction).map(Mutex::new);
        Self {
            config,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            poison_reported: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &PerceptualConfig {
        &self.config
    }

    /// Fingerprint `text`, serving repeated texts from the cache.
    ///
    /// Never fails: with caching disabled the fingerprint is computed
    /// uncached.
    pub fn fingerprint(&self, text: &str, language_id: &str) -> Arc<Fingerprint> {
        let Some(mut cache) = self.lock_cache() else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Arc::new(Fingerprint::compute(text, language_id, &self.config));
        };

        let key = CacheKey::new(text, language_id);
        if let Some(hit) = cache.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let fp = Arc::new(Fingerprint::compute(text, language_id, &self.config));
        if cache.insert(key, Arc::clone(&fp)) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        fp
    }

    /// Fingerprint many texts of one language, preserving input order.
    ///
    /// Each distinct uncached text is computed once, and every slot holding
    /// that text shares the same `Arc`. Repeats within the batch count as
    /// hits, as they would for successive [`fingerprint`](Self::fingerprint)
    /// calls. Misses are computed on the rayon pool when `use_parallel` is
    /// set; the cache lock is never held while computing.
    pub fn fingerprint_batch<S>(&self, texts: &[S], language_id: &str) -> Vec<Arc<Fingerprint>>
    where
        S: AsRef<str> + Sync,
    {
        let mut slots: Vec<Option<Arc<Fingerprint>>> = vec![None; texts.len()];
        // Distinct texts to compute: the first slot plus every later repeat.
        let mut pending: Vec<(usize, Vec<usize>)> = Vec::new();

        match self.lock_cache() {
            Some(mut cache) => {
                let mut pending_by_key: HashMap<CacheKey, usize> = HashMap::new();
                for (idx, text) in texts.iter().enumerate() {
                    let key = CacheKey::new(text.as_ref(), language_id);
                    if let Some(&at) = pending_by_key.get(&key) {
                        pending[at].1.push(idx);
                        continue;
                    }
                    match cache.lookup(&key) {
                        Some(hit) => slots[idx] = Some(hit),
                        None => {
                            pending_by_key.insert(key, pending.len());
                            pending.push((idx, Vec::new()));
                        }
                    }
                }
            }
            None => pending.extend((0..texts.len()).map(|idx| (idx, Vec::new()))),
        }

        let misses = pending.len() as u64;
        let hits = texts.len() as u64 - misses;
        self.hits.fetch_add(hits, Ordering::Relaxed);
        self.misses.fetch_add(misses, Ordering::Relaxed);

        let compute =
            |idx: usize| Arc::new(Fingerprint::compute(texts[idx].as_ref(), language_id, &self.config));
        let computed: Vec<Arc<Fingerprint>> = if self.config.use_parallel {
            pending.par_iter().map(|(idx, _)| compute(*idx)).collect()
        } else {
            pending.iter().map(|(idx, _)| compute(*idx)).collect()
        };

        if let Some(mut cache) = self.lock_cache() {
            let mut evicted = 0u64;
            for ((idx, _), fp) in pending.iter().zip(&computed) {
                if cache.insert(CacheKey::new(texts[*idx].as_ref(), language_id), Arc::clone(fp)) {
                    evicted += 1;
                }
            }
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }

        for ((idx, repeats), fp) in pending.into_iter().zip(computed) {
            for repeat in repeats {
                slots[repeat] = Some(Arc::clone(&fp));
            }
            slots[idx] = Some(fp);
        }

        debug!(
            texts = texts.len(),
            hits,
            misses,
            parallel = self.config.use_parallel,
            "fingerprint_batch"
        );

        slots
            .into_iter()
            .zip(texts)
            .map(|(slot, text)| {
                slot.unwrap_or_else(|| {
                    Arc::new(Fingerprint::compute(text.as_ref(), language_id, &self.config))
                })
            })
            .collect()
    }

    /// Combined similarity of two texts after normalization.
    pub fn similarity(&self, a: &str, b: &str, language_id: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let fa = self.fingerprint(a, language_id);
        let fb = self.fingerprint(b, language_id);
        self.fingerprint_similarity(&fa, &fb)
    }

    /// Combined similarity of two fingerprints with this engine's weights and
    /// edit cap.
    pub fn fingerprint_similarity(&self, a: &Fingerprint, b: &Fingerprint) -> f64 {
        fingerprint_similarity(a, b, &self.config.weights, self.config.max_edit_chars)
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (entries, capacity) = match self.lock_cache() {
            Some(cache) => (cache.len(), cache.capacity()),
            None => (0, self.config.cache_capacity),
        };
        CacheStats {
            entries,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached fingerprint. Counters are kept.
    pub fn clear_cache(&self) {
        if let Some(mut cache) = self.lock_cache() {
            cache.clear();
        }
    }

    /// `None` only when caching is disabled. A lock poisoned by a panicking
    /// holder is recovered: entries are immutable `Arc`s, so the map stays
    /// consistent.
    fn lock_cache(&self) -> Option<MutexGuard<'_, FingerprintCache>> {
        let cache = self.cache.as_ref()?;
        let guard = cache.lock().unwrap_or_else(|poisoned| {
            if !self.poison_reported.swap(true, Ordering::Relaxed) {
                warn!("fingerprint_cache_poisoned_recovered");
            }
            poisoned.into_inner()
        });
        Some(guard)
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::with_valid_config(PerceptualConfig::default())
    }
}

impl std::fmt::Debug for FingerprintEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintEngine")
            .field("config", &self.config)
            .field("stats", &self.cache_stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvictionPolicy;

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FingerprintEngine>();
    }

    #[test]
    fn repeated_text_hits_cache() {
        let engine = FingerprintEngine::default();
        let a = engine.fingerprint("let x = 1;", "javascript");
        let b = engine.fingerprint("let x = 1;", "javascript");
        assert!(Arc::ptr_eq(&a, &b));

        let stats = engine.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.capacity, 1000);
    }

    #[test]
    fn language_is_part_of_the_key() {
        let engine = FingerprintEngine::default();
        let js = engine.fingerprint("a # b", "javascript");
        let py = engine.fingerprint("a # b", "python");
        assert_ne!(js.normalized_text, py.normalized_text);
        assert_eq!(engine.cache_stats().entries, 2);
    }

    #[test]
    fn cache_is_bounded_and_counts_evictions() {
        let engine =
            FingerprintEngine::new(PerceptualConfig::new().with_cache_capacity(4)).unwrap();
        for i in 0..10 {
            engine.fingerprint(&format!("value_{i} = {i}"), "rust");
        }
        let stats = engine.cache_stats();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.evictions, 6);
    }

    #[test]
    fn insertion_order_evicts_oldest_even_if_recently_read() {
        let engine = FingerprintEngine::new(
            PerceptualConfig::new()
                .with_cache_capacity(2)
                .with_eviction(EvictionPolicy::InsertionOrder),
        )
        .unwrap();
        let first = engine.fingerprint("first line", "rust");
        engine.fingerprint("second line", "rust");
        engine.fingerprint("first line", "rust");
        engine.fingerprint("third line", "rust");

        let again = engine.fingerprint("first line", "rust");
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn lru_keeps_recently_read() {
        let engine = FingerprintEngine::new(
            PerceptualConfig::new()
                .with_cache_capacity(2)
                .with_eviction(EvictionPolicy::LeastRecentlyUsed),
        )
        .unwrap();
        let first = engine.fingerprint("first line", "rust");
        engine.fingerprint("second line", "rust");
        engine.fingerprint("first line", "rust");
        engine.fingerprint("third line", "rust");

        let again = engine.fingerprint("first line", "rust");
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn zero_capacity_never_caches() {
        let engine =
            FingerprintEngine::new(PerceptualConfig::new().with_cache_capacity(0)).unwrap();
        let a = engine.fingerprint("same", "rust");
        let b = engine.fingerprint("same", "rust");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        let stats = engine.cache_stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn clear_cache_drops_entries() {
        let engine = FingerprintEngine::default();
        engine.fingerprint("abc", "rust");
        engine.clear_cache();
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn batch_matches_single_calls_in_order() {
        let texts = ["alpha()", "beta()", "alpha()", "gamma()"];
        for parallel in [false, true] {
            let engine =
                FingerprintEngine::new(PerceptualConfig::new().with_parallel(parallel)).unwrap();
            let batch = engine.fingerprint_batch(&texts, "rust");
            assert_eq!(batch.len(), texts.len());
            for (text, fp) in texts.iter().zip(&batch) {
                assert_eq!(**fp, Fingerprint::compute(text, "rust", engine.config()));
            }
        }
    }

    #[test]
    fn batch_uses_existing_entries() {
        let engine = FingerprintEngine::default();
        let warm = engine.fingerprint("alpha()", "rust");
        let batch = engine.fingerprint_batch(&["alpha()", "beta()"], "rust");
        assert!(Arc::ptr_eq(&warm, &batch[0]));
        assert_eq!(engine.cache_stats().hits, 1);
    }

    #[test]
    fn batch_computes_repeated_texts_once() {
        let texts = ["alpha()", "beta()", "alpha()", "beta()", "alpha()", "beta()"];
        for parallel in [false, true] {
            let engine =
                FingerprintEngine::new(PerceptualConfig::new().with_parallel(parallel)).unwrap();
            let batch = engine.fingerprint_batch(&texts, "rust");

            assert!(Arc::ptr_eq(&batch[0], &batch[2]));
            assert!(Arc::ptr_eq(&batch[0], &batch[4]));
            assert!(Arc::ptr_eq(&batch[1], &batch[5]));
            assert!(!Arc::ptr_eq(&batch[0], &batch[1]));

            let stats = engine.cache_stats();
            assert_eq!(stats.misses, 2);
            assert_eq!(stats.hits, 4);
            assert_eq!(stats.entries, 2);

            let single = engine.fingerprint("beta()", "rust");
            assert!(Arc::ptr_eq(&single, &batch[1]));
        }
    }

    #[test]
    fn batch_without_cache_computes_every_slot() {
        let engine =
            FingerprintEngine::new(PerceptualConfig::new().with_cache_capacity(0)).unwrap();
        let batch = engine.fingerprint_batch(&["same()", "same()"], "rust");
        assert_eq!(batch[0], batch[1]);
        let stats = engine.cache_stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn poisoned_cache_keeps_serving() {
        let engine = Arc::new(FingerprintEngine::default());
        let warm = engine.fingerprint("let x = 1;", "javascript");

        let holder = Arc::clone(&engine);
        let panicked = std::thread::spawn(move || {
            let _guard = holder.cache.as_ref().unwrap().lock().unwrap();
            panic!("cache holder panicked");
        })
        .join();
        assert!(panicked.is_err());
        assert!(engine.cache.as_ref().unwrap().is_poisoned());

        let again = engine.fingerprint("let x = 1;", "javascript");
        assert!(Arc::ptr_eq(&warm, &again));
        let fresh = engine.fingerprint("let y = 2;", "javascript");
        assert_eq!(
            *fresh,
            Fingerprint::compute("let y = 2;", "javascript", engine.config())
        );

        let stats = engine.cache_stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn similarity_normalizes_first() {
        let engine = FingerprintEngine::default();
        assert_eq!(engine.similarity("x = 1 // a", "X  =  1", "rust"), 1.0);
        assert!(engine.similarity("x = 1", "y = 2", "rust") < 1.0);
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = PerceptualConfig {
            version: 0,
            ..Default::default()
        };
        assert!(FingerprintEngine::new(cfg).is_err());
    }
}
