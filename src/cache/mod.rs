//! Curvature cache
//!
//! The coordinate update for feature `j` needs the weighted curvature
//! `Σ_i w_i * x_ij²`. It depends only on the data and the instance weights,
//! both fixed for the lifetime of an optimizer, so it is memoized here in an
//! LRU cache bounded by entry count. Very wide datasets keep only the hottest
//! features, which under active-set sweeps are exactly the non-zero ones.

use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache of per-feature weighted curvature
pub struct CurvatureCache {
    cache: Option<LruCache<usize, f64>>,
    hits: u64,
    misses: u64,
}

impl CurvatureCache {
    /// Create a cache holding at most `capacity` features; 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Whether values are retained at all
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Look up the curvature of `feature`
    pub fn get(&mut self, feature: usize) -> Option<f64> {
        let cache = self.cache.as_mut()?;
        if let Some(&value) = cache.get(&feature) {
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store the curvature of `feature`
    pub fn put(&mut self, feature: usize, value: f64) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(feature, value);
        }
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.cache.as_ref().map_or(0, |c| c.cap().get()),
            size: self.cache.as_ref().map_or(0, |c| c.len()),
        }
    }

    /// Drop every entry, e.g. after the instance weights changed
    pub fn clear(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curvature_cache_basic() {
        let mut cache = CurvatureCache::new(3);

        assert_eq!(cache.get(0), None);
        assert_eq!(cache.stats().misses, 1);

        cache.put(0, 5.0);
        assert_eq!(cache.get(0), Some(5.0));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_curvature_cache_lru_eviction() {
        let mut cache = CurvatureCache::new(2);

        cache.put(0, 1.0);
        cache.put(1, 2.0);
        cache.put(2, 3.0); // evicts feature 0

        assert_eq!(cache.get(0), None);
        assert_eq!(cache.get(1), Some(2.0));
        assert_eq!(cache.get(2), Some(3.0));
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = CurvatureCache::new(10);
        assert_eq!(cache.hit_rate(), 0.0);

        cache.get(0);
        cache.get(1);
        cache.put(0, 1.0);
        cache.get(0);
        cache.get(0);

        // 2 hits, 2 misses
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = CurvatureCache::new(0);
        assert!(!cache.is_enabled());

        cache.put(0, 1.0);
        assert_eq!(cache.get(0), None);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 0,
                misses: 0,
                capacity: 0,
                size: 0
            }
        );
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = CurvatureCache::new(10);
        cache.put(0, 1.0);
        cache.get(0);

        cache.clear();

        assert_eq!(cache.get(0), None);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 1);
    }
}
