//! Name → type lookup for manifest-declared types

use std::collections::HashMap;

use crate::error::{ComponentError, Result};
use crate::identity::{Identity, TypeHandle};

/// Types declared by a manifest, kept in declaration order
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    by_name: HashMap<String, usize>,
    types: Vec<TypeHandle>,
}

impl TypeTable {
    pub fn insert(&mut self, ty: TypeHandle) {
        let existing = self.by_name.get(ty.name()).copied();
        match existing {
            Some(idx) => self.types[idx] = ty,
            None => {
                self.by_name.insert(ty.name().to_string(), self.types.len());
                self.types.push(ty);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeHandle> {
        self.by_name.get(name).map(|idx| &self.types[*idx])
    }

    /// Like [`get`](Self::get), failing with `InvalidManifest`
    pub fn require(&self, name: &str) -> Result<&TypeHandle> {
        self.get(name).ok_or_else(|| ComponentError::InvalidManifest {
            reason: format!("unknown type '{}'", name),
        })
    }

    /// A declared type as an identity, or the bare name if undeclared
    pub fn resolve(&self, name: &str) -> Identity {
        match self.get(name) {
            Some(ty) => Identity::Type(ty.clone()),
            None => Identity::Name(name.to_string()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeHandle> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
