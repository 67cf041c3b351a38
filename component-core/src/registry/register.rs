//! Registration engine
//!
//! A registration fans out over every root identity of the component (its
//! whole ancestor chain, unless an explicit identity is given). Each root
//! produces two primary keys, the exact key and its wildcard twin, both
//! under the same context signature.

use crate::component::Component;
use crate::error::{ComponentError, Result};
use crate::identity::{identity_of, validate_name, Identity};

use super::store::{context_signature, primary_key, wildcard_key, RegistryStore};
use super::ComponentRegistry;

/// A pending registration, built fluently and applied to a registry
///
/// ```rust
/// use component_core::{Component, ComponentRegistry, Registration, TypeHandle};
///
/// let registry = ComponentRegistry::new();
/// let dog = TypeHandle::new("Dog");
///
/// Registration::new(Component::opaque("feed_dog"))
///     .identity("Feeder")
///     .context([&dog])
///     .named("morning")
///     .register(&registry)
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    component: Component,
    context: Vec<Identity>,
    identity: Option<Identity>,
    name: String,
}

impl Registration {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            context: Vec::new(),
            identity: None,
            name: String::new(),
        }
    }

    /// Scope the registration to a tuple of context types or type names
    pub fn context<I, T>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identity>,
    {
        self.context = context.into_iter().map(Into::into).collect();
        self
    }

    /// Register under this identity instead of the component's ancestors
    pub fn identity(mut self, identity: impl Into<Identity>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn context_elements(&self) -> &[Identity] {
        &self.context
    }

    pub fn explicit_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this registration to `registry`
    pub fn register(self, registry: &ComponentRegistry) -> Result<()> {
        registry.register(self)
    }
}

/// Keys and signature a registration writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPlan {
    /// Exact and wildcard key per root, root by root
    pub keys: Vec<String>,
    pub signature: String,
}

/// Validate a registration and compute where it lands
pub fn plan(registration: &Registration) -> Result<RegistrationPlan> {
    validate_name(&registration.name)?;

    let parts = registration
        .context
        .iter()
        .map(context_part)
        .collect::<Result<Vec<_>>>()?;

    let roots = match &registration.identity {
        Some(identity) => vec![identity_of(identity)?],
        None => {
            let ty = registration.component.inspect_type().ok_or_else(|| {
                ComponentError::MissingIdentity {
                    component: registration.component.label().to_string(),
                }
            })?;
            let chain = ty
                .ancestor_names()
                .into_iter()
                .map(|name| identity_of(&Identity::Name(name)))
                .collect::<Result<Vec<_>>>()?;
            if chain.is_empty() {
                return Err(ComponentError::MissingIdentity {
                    component: registration.component.label().to_string(),
                });
            }
            chain
        }
    };

    let keys = roots
        .iter()
        .flat_map(|root| [primary_key(root, &registration.name), wildcard_key(root)])
        .collect();

    Ok(RegistrationPlan {
        keys,
        signature: context_signature(&parts),
    })
}

/// Write a registration into `store`, returning the number of new entries
pub fn apply(store: &mut RegistryStore, registration: &Registration) -> Result<usize> {
    let plan = plan(registration)?;

    let mut added = 0;
    for key in &plan.keys {
        if store.insert(key, &plan.signature, &registration.component, &registration.name) {
            added += 1;
        }
    }

    tracing::debug!(
        component = registration.component.label(),
        name = registration.name.as_str(),
        signature = plan.signature.as_str(),
        keys = ?plan.keys,
        added,
        "registered component"
    );

    Ok(added)
}

/// Registration context uses exact names only, no ancestor expansion
fn context_part(element: &Identity) -> Result<String> {
    match element {
        Identity::Instance(instance) => Err(ComponentError::InvalidContext {
            element: instance.type_handle().name().to_string(),
            reason: "instances cannot scope a registration, pass the type instead".to_string(),
        }),
        _ => identity_of(element).map_err(|err| ComponentError::InvalidContext {
            element: element.display_name().to_string(),
            reason: err.to_string(),
        }),
    }
}
