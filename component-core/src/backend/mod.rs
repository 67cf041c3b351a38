//! Pluggable registry backends
//!
//! The public registry API always talks to exactly one backend. Which one is
//! chosen by [`RegistryConfig::backend`], usually read from the
//! `COMPONENT_REGISTRY_BACKEND` environment variable. Custom backends can be
//! injected directly with [`ComponentRegistry::with_backend`].
//!
//! # Example
//!
//! ```rust
//! use component_core::backend::{backend_from_config, RegistryBackend};
//! use component_core::config::RegistryConfig;
//!
//! let backend = backend_from_config(&RegistryConfig::default()).unwrap();
//! assert_eq!(backend.name(), "basic");
//! ```
//!
//! [`ComponentRegistry::with_backend`]: crate::ComponentRegistry::with_backend

mod basic;

pub use basic::BasicBackend;

use std::sync::Arc;

use crate::cache::{CacheStats, CachedEntries};
use crate::config::{BackendKind, RegistryConfig};
use crate::error::Result;
use crate::identity::Identity;
use crate::registry::Registration;

/// Storage and lookup of registrations
///
/// All methods take `&self`; implementations provide their own interior
/// mutability and must be safe to share between threads.
pub trait RegistryBackend: Send + Sync {
    /// Store a registration, returning the number of new entries
    fn register(&self, registration: &Registration) -> Result<usize>;

    /// Entries for `key` best matching `context`, possibly memoized
    fn lookup(&self, key: &str, context: &[Identity]) -> Result<CachedEntries>;

    /// Resolution cache statistics, for backends that cache
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }

    /// Get backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Build the backend selected by `config`
pub fn backend_from_config(config: &RegistryConfig) -> Result<Arc<dyn RegistryBackend>> {
    let backend: Arc<dyn RegistryBackend> = match config.backend {
        BackendKind::Basic => Arc::new(BasicBackend::with_config(config.cache.clone())),
    };
    tracing::debug!(
        backend = backend.name(),
        cache = config.cache.enabled,
        "selected registry backend"
    );
    Ok(backend)
}
