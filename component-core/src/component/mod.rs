//! Components - the things the registry hands out
//!
//! A component is an opaque handle: a type, an already constructed
//! instance, or a callable. The registry never looks inside a component
//! except to find its type (for ancestor fan-out at registration) and to
//! invoke its constructor (when a query asks for instantiation).

mod instantiate;

pub use instantiate::{instantiate, Resolved, ResolvedEntry};

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{BoxError, ComponentError, Result};
use crate::identity::{Identity, Instance, TypeHandle};

/// Constructor invoked with the query context as positional arguments
pub type Constructor =
    Arc<dyn Fn(&[Identity]) -> std::result::Result<Instance, BoxError> + Send + Sync>;

/// Identity used to deduplicate registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Uuid);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a component handle refers to
#[derive(Debug, Clone)]
pub enum ComponentKind {
    /// A declared type
    Type(TypeHandle),
    /// A constructed value
    Instance(Instance),
    /// A function-like component, identified only by its label
    Callable { label: String },
}

/// A registrable component
#[derive(Clone)]
pub struct Component {
    id: ComponentId,
    kind: ComponentKind,
    constructor: Option<Constructor>,
}

impl Component {
    /// A type component; registering the same type twice is idempotent
    pub fn of_type(ty: TypeHandle) -> Self {
        Self {
            id: ComponentId(ty.id()),
            kind: ComponentKind::Type(ty),
            constructor: None,
        }
    }

    /// An instance component
    pub fn instance(instance: Instance) -> Self {
        Self {
            id: ComponentId(instance.id()),
            kind: ComponentKind::Instance(instance),
            constructor: None,
        }
    }

    /// A callable component; `f` runs when the component is instantiated
    pub fn function<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Identity]) -> std::result::Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self::opaque(label).with_constructor(f)
    }

    /// A callable component with no behavior attached
    pub fn opaque(label: impl Into<String>) -> Self {
        Self {
            id: ComponentId(Uuid::new_v4()),
            kind: ComponentKind::Callable {
                label: label.into(),
            },
            constructor: None,
        }
    }

    /// Attach (or replace) the constructor used on instantiation
    pub fn with_constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Identity]) -> std::result::Result<Instance, BoxError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(f));
        self
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Type to inspect for ancestors; callables have none
    pub fn inspect_type(&self) -> Option<&TypeHandle> {
        match &self.kind {
            ComponentKind::Type(ty) => Some(ty),
            ComponentKind::Instance(instance) => Some(instance.type_handle()),
            ComponentKind::Callable { .. } => None,
        }
    }

    /// Human-readable label for logs and error messages
    pub fn label(&self) -> &str {
        match &self.kind {
            ComponentKind::Type(ty) => ty.name(),
            ComponentKind::Instance(instance) => instance.type_handle().name(),
            ComponentKind::Callable { label } => label,
        }
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Invoke the constructor with `args` as positional arguments
    pub fn construct(&self, args: &[Identity]) -> Result<Instance> {
        let constructor =
            self.constructor
                .as_ref()
                .ok_or_else(|| ComponentError::NotConstructible {
                    component: self.label().to_string(),
                })?;

        constructor(args).map_err(|source| ComponentError::ConstructionFailed {
            component: self.label().to_string(),
            source,
        })
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_components_share_type_identity() {
        let dog = TypeHandle::new("Dog");
        assert_eq!(Component::of_type(dog.clone()), Component::of_type(dog));
    }

    #[test]
    fn test_callables_are_distinct_until_cloned() {
        let feed = Component::opaque("feed");
        assert_eq!(feed, feed.clone());
        assert_ne!(feed, Component::opaque("feed"));
        assert!(feed.inspect_type().is_none());
    }

    #[test]
    fn test_instance_component_inspects_runtime_type() {
        let dog = TypeHandle::new("Dog");
        let component = Component::instance(Instance::of(dog.clone()));
        assert_eq!(component.inspect_type(), Some(&dog));
        assert_eq!(component.label(), "Dog");
    }

    #[test]
    fn test_construct_forwards_arguments() {
        let bowl = TypeHandle::new("Bowl");
        let bowl_ty = bowl.clone();
        let component = Component::function("make_bowl", move |args: &[Identity]| {
            Ok(Instance::new(bowl_ty.clone(), args.len()))
        });

        let made = component
            .construct(&["Dog".into(), "Cat".into()])
            .unwrap();
        assert_eq!(made.type_handle(), &bowl);
        assert_eq!(made.downcast_ref::<usize>(), Some(&2));
    }

    #[test]
    fn test_construct_without_constructor_fails() {
        let err = Component::of_type(TypeHandle::new("Dog"))
            .construct(&[])
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_CONSTRUCTIBLE");
    }

    #[test]
    fn test_constructor_error_is_wrapped() {
        let component = Component::function("broken", |_: &[Identity]| Err("no food".into()));
        let err = component.construct(&[]).unwrap_err();
        assert_eq!(err.error_code(), "CONSTRUCTION_FAILED");
        assert!(err.to_string().contains("no food"));
    }
}
