//! Resolution cache
//!
//! Memoizes search results per (key, context chains). Slots are write-once:
//! a populated slot, even an empty one, is never replaced. Registrations
//! made after a slot was filled are therefore invisible to that exact
//! query shape. This staleness is a known limitation of the registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::identity::{context_chain, Identity};
use crate::registry::RegistrationEntry;

/// Cached search result
pub type CachedEntries = Arc<[RegistrationEntry]>;

/// Cache key: the primary key and the context chains the search walks
///
/// The context part holds each element's expanded chain rather than its
/// name. A plain name `Dog` (chain `[Dog]`) and a type `Dog` (chain
/// `[Dog, Animal]`) are different query shapes, as are two separately
/// declared `Dog` types with different ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub key: String,
    pub context: Vec<Vec<String>>,
}

impl CacheKey {
    pub fn new(key: &str, context: &[Identity]) -> Result<Self> {
        let context = context
            .iter()
            .map(context_chain)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            key: key.to_string(),
            context,
        })
    }
}

/// Write-once memo of search results
#[derive(Debug)]
pub struct ResolutionCache {
    /// Cached entries
    entries: RwLock<HashMap<CacheKey, CachedEntries>>,
    /// Configuration
    config: CacheConfig,
    /// Statistics
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create a new cache with default config
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get a cached result
    pub fn get(&self, key: &CacheKey) -> Option<CachedEntries> {
        let found = self.entries.read().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store `entries` unless the slot is already filled
    ///
    /// Returns whatever the slot holds afterwards, so racing writers all
    /// observe the first value stored.
    pub fn insert_if_absent(&self, key: CacheKey, entries: Vec<RegistrationEntry>) -> CachedEntries {
        let mut slots = self.entries.write();
        slots
            .entry(key)
            .or_insert_with(|| entries.into())
            .clone()
    }

    /// Cached result for `key`, computing and storing it on a miss
    ///
    /// `compute` receives the key so it can search with the same context
    /// chains the slot is filed under. With caching disabled `compute` runs
    /// on every call and nothing is stored.
    pub fn get_or_try_insert_with<F>(&self, key: CacheKey, compute: F) -> Result<CachedEntries>
    where
        F: FnOnce(&CacheKey) -> Result<Vec<RegistrationEntry>>,
    {
        if !self.config.enabled {
            return compute(&key).map(Into::into);
        }

        if let Some(hit) = self.get(&key) {
            tracing::trace!(key = key.key.as_str(), context = ?key.context, "cache hit");
            return Ok(hit);
        }

        let computed = compute(&key)?;
        tracing::trace!(
            key = key.key.as_str(),
            context = ?key.context,
            found = computed.len(),
            "cache miss, storing result"
        );
        Ok(self.insert_if_absent(key, computed))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        CacheStats {
            entries: self.len(),
            hits,
            misses,
            hit_rate: if hits + misses > 0 {
                hits as f64 / (hits + misses) as f64
            } else {
                0.0
            },
        }
    }

    /// Get number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of filled slots
    pub entries: usize,
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::identity::{Instance, TypeHandle};
    use std::sync::Barrier;
    use std::thread;

    fn entry(label: &str) -> RegistrationEntry {
        RegistrationEntry::new(Component::opaque(label), "")
    }

    #[test]
    fn test_cache_key_keeps_parts_apart() {
        let dog = TypeHandle::new("Dog");
        let named = CacheKey::new("Feeder:morning", &[]).unwrap();
        let scoped = CacheKey::new("Feeder", &["morning".into()]).unwrap();
        assert_ne!(named, scoped);

        let by_instance = CacheKey::new("Feeder", &[Instance::of(dog.clone()).into()]).unwrap();
        let by_type = CacheKey::new("Feeder", &[dog.into()]).unwrap();
        assert_eq!(by_instance, by_type);
        assert_eq!(by_type.context, vec![vec!["Dog"]]);
    }

    #[test]
    fn test_cache_key_keeps_context_elements_apart() {
        let key = CacheKey::new("Feeder", &["Dog".into(), "Bowl".into()]).unwrap();
        assert_eq!(key.context, vec![vec!["Dog"], vec!["Bowl"]]);
    }

    #[test]
    fn test_cache_key_uses_expanded_chains() {
        let animal = TypeHandle::new("Animal");
        let pet = TypeHandle::new("Pet");
        let dog = TypeHandle::derive("Dog", &[animal]).unwrap();
        let pet_dog = TypeHandle::derive("Dog", &[pet]).unwrap();

        let by_name = CacheKey::new("Feeder", &["Dog".into()]).unwrap();
        let by_type = CacheKey::new("Feeder", &[(&dog).into()]).unwrap();
        let by_other_type = CacheKey::new("Feeder", &[(&pet_dog).into()]).unwrap();

        assert_ne!(by_name, by_type);
        assert_ne!(by_type, by_other_type);
        assert_eq!(by_type.context, vec![vec!["Dog", "Animal"]]);
    }

    #[test]
    fn test_write_once() {
        let cache = ResolutionCache::new();
        let key = CacheKey::new("Animal*", &[]).unwrap();

        let first = cache.insert_if_absent(key.clone(), vec![]);
        let second = cache.insert_if_absent(key.clone(), vec![entry("dog")]);

        assert!(first.is_empty());
        assert!(second.is_empty());
        assert!(cache.get(&key).unwrap().is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with_computes_once() {
        let cache = ResolutionCache::new();
        let key = CacheKey::new("Animal*", &[]).unwrap();

        let first = cache
            .get_or_try_insert_with(key.clone(), |_| Ok(vec![entry("dog")]))
            .unwrap();
        let second = cache
            .get_or_try_insert_with(key, |_| panic!("must be served from cache"))
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ResolutionCache::new();
        let key = CacheKey::new("Animal*", &[]).unwrap();

        let failed = cache.get_or_try_insert_with(key.clone(), |_| {
            Err(crate::error::ComponentError::InvalidManifest {
                reason: "test".to_string(),
            })
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let cache = ResolutionCache::with_config(CacheConfig::default().with_enabled(false));
        let key = CacheKey::new("Animal*", &[]).unwrap();

        cache
            .get_or_try_insert_with(key.clone(), |_| Ok(vec![]))
            .unwrap();
        let second = cache
            .get_or_try_insert_with(key, |_| Ok(vec![entry("dog")]))
            .unwrap();

        assert_eq!(second.len(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_racing_writers_see_first_value() {
        let cache = Arc::new(ResolutionCache::new());
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let key = CacheKey::new("Animal*", &[]).unwrap();
                    let stored = cache.insert_if_absent(key, vec![entry(&format!("writer-{}", i))]);
                    stored[0].component.label().to_string()
                })
            })
            .collect();

        let seen: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(seen.iter().all(|label| label == &seen[0]));
        assert_eq!(cache.len(), 1);
    }
}
