//! # Component Core - contextual component registry
//!
//! Register implementations ("components") under the types they provide,
//! optionally scoped to a tuple of context types, and resolve the best
//! match for a requested type and context later on:
//!
//! - **Registration** fans a component out over its whole ancestor chain, so
//!   a query for any supertype finds it
//! - **Resolution** matches the query context against registration contexts
//!   through the Cartesian product of the context types' ancestor chains,
//!   most specific first, left to right
//! - **Caching** memoizes every (key, context types) query, write-once
//!
//! ## Example
//!
//! ```rust
//! use component_core::{Component, ComponentRegistry, Instance, Query, Registration, TypeHandle};
//!
//! let registry = ComponentRegistry::new();
//!
//! // Declare a small type hierarchy
//! let animal = TypeHandle::new("Animal");
//! let dog = TypeHandle::derive("Dog", &[animal.clone()]).unwrap();
//!
//! // A type component is found through every ancestor
//! registry.register_component(Component::of_type(dog.clone())).unwrap();
//! let animals = registry.filter_all(&Query::new(&animal)).unwrap();
//! assert_eq!(animals[0].resolved.label(), "Dog");
//!
//! // A callable needs an explicit identity, here scoped to dogs
//! Registration::new(Component::opaque("feed_dog"))
//!     .identity("Feeder")
//!     .context([&dog])
//!     .named("morning")
//!     .register(&registry)
//!     .unwrap();
//!
//! let rex = Instance::of(dog);
//! let feeder = registry
//!     .require_one(&Query::new("Feeder").context([&rex]).named("morning"))
//!     .unwrap();
//! assert_eq!(feeder.label(), "feed_dog");
//! ```
//!
//! ## Known limitation
//!
//! Query results are cached write-once. A registration made after a query
//! shape was first answered (even with "nothing found") does not change the
//! answer for that shape. Register everything during start-up, before the
//! first resolution.

pub mod backend;
pub mod cache;
pub mod component;
pub mod config;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod registry;

use std::sync::OnceLock;

// Re-export main types
pub use component::{Component, ComponentId, ComponentKind, Resolved, ResolvedEntry};
pub use config::{BackendKind, CacheConfig, RegistryConfig};
pub use error::{ComponentError, ErrorCategory, ErrorResponse, Result};
pub use identity::{ancestor_chain, identity_of, Identity, Instance, TypeHandle};
pub use manifest::{RegistryManifest, TypeTable};
pub use registry::{ComponentRegistry, Query, Registration};

static GLOBAL: OnceLock<ComponentRegistry> = OnceLock::new();

/// The process-wide registry
///
/// Created on first use from the environment (see [`RegistryConfig::from_env`]).
/// A malformed environment falls back to the default configuration.
pub fn global() -> &'static ComponentRegistry {
    GLOBAL.get_or_init(|| {
        ComponentRegistry::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid registry configuration, using defaults");
            ComponentRegistry::new()
        })
    })
}

/// Register into the process-wide registry
pub fn register(registration: Registration) -> Result<()> {
    global().register(registration)
}

/// [`ComponentRegistry::query_one`] on the process-wide registry
pub fn query_one(query: &Query) -> Result<Option<Resolved>> {
    global().query_one(query)
}

/// [`ComponentRegistry::require_one`] on the process-wide registry
pub fn require_one(query: &Query) -> Result<Resolved> {
    global().require_one(query)
}

/// [`ComponentRegistry::filter_all`] on the process-wide registry
pub fn filter_all(query: &Query) -> Result<Vec<ResolvedEntry>> {
    global().filter_all(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_registry_is_shared() {
        let widget = TypeHandle::new("GlobalWidget");
        register(Registration::new(Component::of_type(widget.clone()))).unwrap();

        assert!(std::ptr::eq(global(), global()));
        let found = require_one(&Query::new(&widget)).unwrap();
        assert_eq!(found.label(), "GlobalWidget");
        assert_eq!(filter_all(&Query::new("GlobalWidget")).unwrap().len(), 1);
        assert!(query_one(&Query::new("GlobalGadget")).unwrap().is_none());
    }
}
