//! Component Registry - registration and contextual resolution
//!
//! ## Architecture
//!
//! ```text
//!   Registration (component, context, identity, name)
//!         │
//!         ▼
//!   ┌──────────────────────────────────────────────┐
//!   │              Registration engine              │
//!   │  roots = identity | ancestor chain            │
//!   │  keys  = root[:name] + root*  per root        │
//!   └──────────────────────────────────────────────┘
//!         │ append (dedup by component + name)
//!         ▼
//!   RegistryStore:  key → context signature → [entries]
//!         ▲
//!         │ Cartesian search over context ancestors
//!   ┌──────────────────────────────────────────────┐
//!   │   ResolutionCache (write-once per query)      │
//!   └──────────────────────────────────────────────┘
//!         ▲
//!   query_one / require_one / filter_all  ──▶  optional instantiation
//! ```

pub mod register;
pub mod resolve;
mod service;
mod store;

pub use register::{Registration, RegistrationPlan};
pub use service::{ComponentRegistry, Query};
pub use store::{
    context_signature, is_wildcard, primary_key, wildcard_key, ContextBuckets, RegistrationEntry,
    RegistryStore,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::identity::TypeHandle;

    #[test]
    fn test_registry_basic() {
        let registry = ComponentRegistry::new();
        let animal = TypeHandle::new("Animal");
        let dog = TypeHandle::derive("Dog", &[animal.clone()]).unwrap();

        registry.register_component(Component::of_type(dog)).unwrap();

        let animals = registry.filter_all(&Query::new(&animal)).unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].resolved.label(), "Dog");
    }
}
