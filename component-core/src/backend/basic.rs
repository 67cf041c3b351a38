//! In-process backend: one store, one cache

use parking_lot::RwLock;

use crate::cache::{CacheKey, CacheStats, CachedEntries, ResolutionCache};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::identity::Identity;
use crate::registry::{register, resolve, Registration, RegistryStore};

use super::RegistryBackend;

/// Default backend
///
/// Resolutions share a read lock on the store and may run concurrently;
/// registrations take the write lock. The cache has its own lock, so a
/// cached lookup never touches the store.
#[derive(Debug, Default)]
pub struct BasicBackend {
    store: RwLock<RegistryStore>,
    cache: ResolutionCache,
}

impl BasicBackend {
    /// Create a new backend with caching enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom cache config
    pub fn with_config(cache: CacheConfig) -> Self {
        Self {
            store: RwLock::new(RegistryStore::new()),
            cache: ResolutionCache::with_config(cache),
        }
    }

    /// Number of primary keys in the store
    pub fn key_count(&self) -> usize {
        self.store.read().len()
    }

    /// Total registration entries in the store
    pub fn entry_count(&self) -> usize {
        self.store.read().entry_count()
    }

    /// Sorted list of primary keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.read().keys().map(str::to_string).collect();
        keys.sort();
        keys
    }
}

impl RegistryBackend for BasicBackend {
    fn register(&self, registration: &Registration) -> Result<usize> {
        let mut store = self.store.write();
        register::apply(&mut store, registration)
    }

    fn lookup(&self, key: &str, context: &[Identity]) -> Result<CachedEntries> {
        let cache_key = CacheKey::new(key, context)?;
        self.cache.get_or_try_insert_with(cache_key, |cache_key| {
            let store = self.store.read();
            resolve::search_chains(&store, &cache_key.key, &cache_key.context)
        })
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.cache.stats())
    }

    fn name(&self) -> &'static str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::identity::TypeHandle;

    #[test]
    fn test_register_and_lookup() {
        let backend = BasicBackend::new();
        let dog = TypeHandle::derive("Dog", &[TypeHandle::new("Animal")]).unwrap();

        let added = backend
            .register(&Registration::new(Component::of_type(dog)))
            .unwrap();
        assert_eq!(added, 4);
        assert_eq!(backend.keys(), vec!["Animal", "Animal*", "Dog", "Dog*"]);

        let found = backend.lookup("Animal*", &[]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].component.label(), "Dog");
    }

    #[test]
    fn test_cached_miss_hides_later_registration() {
        let backend = BasicBackend::new();
        assert!(backend.lookup("Animal*", &[]).unwrap().is_empty());

        let dog = TypeHandle::derive("Dog", &[TypeHandle::new("Animal")]).unwrap();
        backend
            .register(&Registration::new(Component::of_type(dog)))
            .unwrap();

        assert!(backend.lookup("Animal*", &[]).unwrap().is_empty());
        assert_eq!(backend.lookup("Dog*", &[]).unwrap().len(), 1);
        assert_eq!(backend.cache_stats().unwrap().entries, 2);
    }

    #[test]
    fn test_uncached_backend_sees_later_registration() {
        let backend = BasicBackend::with_config(CacheConfig::default().with_enabled(false));
        assert!(backend.lookup("Animal*", &[]).unwrap().is_empty());

        let dog = TypeHandle::derive("Dog", &[TypeHandle::new("Animal")]).unwrap();
        backend
            .register(&Registration::new(Component::of_type(dog)))
            .unwrap();

        assert_eq!(backend.lookup("Animal*", &[]).unwrap().len(), 1);
    }
}
