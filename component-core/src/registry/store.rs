//! Registry store - primary key → context signature → entries

use std::collections::HashMap;

use crate::component::Component;
use crate::identity::{NAME_SEPARATOR, WILDCARD};

/// One registration of a component under a key and context signature
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationEntry {
    pub component: Component,
    pub name: String,
}

impl RegistrationEntry {
    pub fn new(component: Component, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
        }
    }

    fn is_same(&self, component: &Component, name: &str) -> bool {
        self.component == *component && self.name == name
    }
}

/// Context signature → entries, for one primary key
pub type ContextBuckets = HashMap<String, Vec<RegistrationEntry>>;

/// `identity`, or `identity:name` when a name is given
pub fn primary_key(identity: &str, name: &str) -> String {
    if name.is_empty() {
        identity.to_string()
    } else {
        format!("{}{}{}", identity, NAME_SEPARATOR, name)
    }
}

/// `identity*`
pub fn wildcard_key(identity: &str) -> String {
    format!("{}{}", identity, WILDCARD)
}

pub fn is_wildcard(key: &str) -> bool {
    key.ends_with(WILDCARD)
}

/// Concatenation of the context identities, in argument order
pub fn context_signature<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(|p| p.as_ref()).collect()
}

/// Append-only two-level registry map
///
/// Entries are never removed or mutated. Within one bucket they keep
/// registration order, and a (component, name) pair appears at most once.
#[derive(Debug, Default)]
pub struct RegistryStore {
    keys: HashMap<String, ContextBuckets>,
}

impl RegistryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless the bucket already holds the same pair
    ///
    /// Returns true if the entry was added.
    pub fn insert(&mut self, key: &str, signature: &str, component: &Component, name: &str) -> bool {
        let bucket = self
            .keys
            .entry(key.to_string())
            .or_default()
            .entry(signature.to_string())
            .or_default();

        if bucket.iter().any(|entry| entry.is_same(component, name)) {
            return false;
        }

        bucket.push(RegistrationEntry::new(component.clone(), name));
        true
    }

    /// All context buckets under `key`
    pub fn buckets(&self, key: &str) -> Option<&ContextBuckets> {
        self.keys.get(key)
    }

    /// Entries under one (key, signature) pair
    pub fn bucket(&self, key: &str, signature: &str) -> Option<&[RegistrationEntry]> {
        self.keys
            .get(key)
            .and_then(|buckets| buckets.get(signature))
            .map(Vec::as_slice)
    }

    /// Every primary key, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Number of primary keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total entries across all keys and buckets
    pub fn entry_count(&self) -> usize {
        self.keys
            .values()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum()
    }
}
