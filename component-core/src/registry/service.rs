//! Registry service - the public query surface

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::{backend_from_config, BasicBackend, RegistryBackend};
use crate::cache::CacheStats;
use crate::component::{instantiate, Component, Resolved, ResolvedEntry};
use crate::config::RegistryConfig;
use crate::error::{ComponentError, Result};
use crate::identity::{identity_of, validate_name, Identity};

use super::register::Registration;
use super::store::{primary_key, wildcard_key, RegistrationEntry};

/// A resolution request
///
/// ```rust
/// use component_core::{Instance, Query, TypeHandle};
///
/// let dog = TypeHandle::new("Dog");
/// let query = Query::new("Feeder")
///     .context([Instance::of(dog)])
///     .named("morning")
///     .instantiate();
/// assert_eq!(query.name(), "morning");
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    identity: Identity,
    context: Vec<Identity>,
    name: String,
    instantiate: bool,
}

impl Query {
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            context: Vec::new(),
            name: String::new(),
            instantiate: false,
        }
    }

    /// Context values (types, instances or names) to match against
    pub fn context<I, T>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identity>,
    {
        self.context = context.into_iter().map(Into::into).collect();
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Construct the resolved components, passing the context as arguments
    pub fn instantiate(mut self) -> Self {
        self.instantiate = true;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn context_values(&self) -> &[Identity] {
        &self.context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wants_instances(&self) -> bool {
        self.instantiate
    }

    fn describe_context(&self) -> String {
        self.context
            .iter()
            .map(Identity::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The component registry
///
/// Owns one backend and answers registrations and queries against it.
/// Usually there is one per process (see [`crate::global`]); tests create
/// their own.
#[derive(Clone)]
pub struct ComponentRegistry {
    backend: Arc<dyn RegistryBackend>,
}

impl ComponentRegistry {
    /// Create a registry on the basic backend with caching enabled
    pub fn new() -> Self {
        Self::with_backend(Arc::new(BasicBackend::new()))
    }

    /// Create a registry on the backend selected by `config`
    pub fn with_config(config: &RegistryConfig) -> Result<Self> {
        Ok(Self::with_backend(backend_from_config(config)?))
    }

    /// Create a registry configured from the process environment
    pub fn from_env() -> Result<Self> {
        Self::with_config(&RegistryConfig::from_env()?)
    }

    pub fn with_backend(backend: Arc<dyn RegistryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.backend.cache_stats()
    }

    /// Register a component
    ///
    /// Fails with `InvalidContext` or `MissingIdentity`; registering the
    /// same (component, name) twice under the same key and context is a
    /// no-op.
    pub fn register(&self, registration: Registration) -> Result<()> {
        self.backend.register(&registration)?;
        Ok(())
    }

    /// Register a type or instance component under its ancestor chain
    pub fn register_component(&self, component: Component) -> Result<()> {
        self.register(Registration::new(component))
    }

    /// Cached search for `key`, optionally instantiating the results
    pub fn filter_search(
        &self,
        key: &str,
        context: &[Identity],
        instantiate: bool,
    ) -> Result<Vec<ResolvedEntry>> {
        let started = Instant::now();
        let entries = self.backend.lookup(key, context)?;
        let resolved = materialize(&entries, context, instantiate)?;

        tracing::debug!(
            key,
            instantiate,
            found = resolved.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "filter search"
        );
        Ok(resolved)
    }

    /// The single component registered for the query, if any
    ///
    /// Fails with `AmbiguousResolution` when more than one entry matches.
    /// Ambiguity is detected before anything is instantiated.
    pub fn query_one(&self, query: &Query) -> Result<Option<Resolved>> {
        validate_name(&query.name)?;
        let key = primary_key(&identity_of(&query.identity)?, &query.name);
        let entries = self.backend.lookup(&key, &query.context)?;

        if entries.len() > 1 {
            return Err(ComponentError::AmbiguousResolution {
                key,
                context: query.describe_context(),
                components: entries
                    .iter()
                    .map(|e| e.component.label().to_string())
                    .collect(),
            });
        }

        let resolved = materialize(&entries, &query.context, query.instantiate)?;
        Ok(resolved.into_iter().next().map(|entry| entry.resolved))
    }

    /// Like [`query_one`](Self::query_one), but absence is an error
    pub fn require_one(&self, query: &Query) -> Result<Resolved> {
        self.query_one(query)?.ok_or_else(|| ComponentError::ComponentNotFound {
            key: primary_key(query.identity.display_name(), &query.name),
            context: query.describe_context(),
        })
    }

    /// Every component matching the query
    ///
    /// Without a name this searches the wildcard key, so every component
    /// registered under the identity (directly or through an ancestor)
    /// matches. Never fails for absence.
    pub fn filter_all(&self, query: &Query) -> Result<Vec<ResolvedEntry>> {
        let identity = identity_of(&query.identity)?;
        validate_name(&query.name)?;
        let key = if query.name.is_empty() {
            wildcard_key(&identity)
        } else {
            primary_key(&identity, &query.name)
        };
        self.filter_search(&key, &query.context, query.instantiate)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("backend", &self.backend.name())
            .finish()
    }
}

fn materialize(
    entries: &[RegistrationEntry],
    context: &[Identity],
    construct: bool,
) -> Result<Vec<ResolvedEntry>> {
    if construct {
        instantiate(entries, context)
    } else {
        Ok(entries.iter().map(ResolvedEntry::from).collect())
    }
}
