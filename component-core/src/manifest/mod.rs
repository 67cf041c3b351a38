//! Registry manifests - declaring types and registrations as JSON
//!
//! A manifest describes a type hierarchy and the components registered
//! against it, so a registry can be populated without code:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Animal" },
//!     { "name": "Dog", "bases": ["Animal"] }
//!   ],
//!   "components": [
//!     { "type": "Dog" },
//!     { "function": "feed_dog", "identity": "Feeder", "context": ["Dog"], "name": "morning" }
//!   ]
//! }
//! ```
//!
//! Types may be listed in any order; each is declared after its bases.
//! Components loaded from a manifest carry no constructors.

mod types;

pub use types::TypeTable;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{ComponentError, Result};
use crate::identity::TypeHandle;
use crate::registry::{ComponentRegistry, Registration};

/// A declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestType {
    pub name: String,

    /// Direct supertypes, in linearization order
    #[serde(default)]
    pub bases: Vec<String>,
}

/// A registration; exactly one of `type` and `function` must be set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestComponent {
    /// Register a declared type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Register an opaque callable with this label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Context type names
    #[serde(default)]
    pub context: Vec<String>,

    /// Explicit identity; required for functions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    #[serde(default)]
    pub name: String,
}

/// Types and registrations to load into a registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryManifest {
    #[serde(default)]
    pub types: Vec<ManifestType>,

    #[serde(default)]
    pub components: Vec<ManifestComponent>,
}

impl RegistryManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| ComponentError::ManifestLoad {
            path: path.display().to_string(),
            reason,
        };

        let json = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let manifest: Self = serde_json::from_str(&json).map_err(|e| load_error(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            types = manifest.types.len(),
            components = manifest.components.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Declare every type, bases first
    pub fn build_types(&self) -> Result<TypeTable> {
        let mut declared: HashMap<&str, &ManifestType> = HashMap::new();
        for ty in &self.types {
            if declared.insert(ty.name.as_str(), ty).is_some() {
                return Err(ComponentError::InvalidManifest {
                    reason: format!("type '{}' is declared twice", ty.name),
                });
            }
        }

        let mut table = TypeTable::default();
        let mut visiting = Vec::new();
        for ty in &self.types {
            declare(&ty.name, &declared, &mut table, &mut visiting)?;
        }
        Ok(table)
    }

    /// Declare the types and register every component into `registry`
    pub fn apply(&self, registry: &ComponentRegistry) -> Result<TypeTable> {
        let table = self.build_types()?;

        for (index, declared_component) in self.components.iter().enumerate() {
            let component = match (&declared_component.type_name, &declared_component.function) {
                (Some(type_name), None) => Component::of_type(table.require(type_name)?.clone()),
                (None, Some(label)) => Component::opaque(label.as_str()),
                _ => {
                    return Err(ComponentError::InvalidManifest {
                        reason: format!(
                            "component #{} must set exactly one of 'type' and 'function'",
                            index
                        ),
                    })
                }
            };

            let mut registration = Registration::new(component)
                .context(declared_component.context.iter().map(|name| table.resolve(name)))
                .named(declared_component.name.as_str());
            if let Some(identity) = &declared_component.identity {
                registration = registration.identity(table.resolve(identity));
            }
            registry.register(registration)?;
        }

        tracing::debug!(
            types = table.len(),
            components = self.components.len(),
            "applied manifest"
        );
        Ok(table)
    }
}

fn declare<'a>(
    name: &'a str,
    declared: &HashMap<&'a str, &'a ManifestType>,
    table: &mut TypeTable,
    visiting: &mut Vec<&'a str>,
) -> Result<TypeHandle> {
    if let Some(handle) = table.get(name) {
        return Ok(handle.clone());
    }

    let decl: &'a ManifestType = declared.get(name).copied().ok_or_else(|| {
        ComponentError::InvalidManifest {
            reason: format!("unknown type '{}'", name),
        }
    })?;

    if visiting.contains(&name) {
        return Err(ComponentError::InvalidManifest {
            reason: format!("type '{}' inherits from itself", name),
        });
    }

    visiting.push(name);
    let mut bases = Vec::with_capacity(decl.bases.len());
    for base in &decl.bases {
        bases.push(declare(base.as_str(), declared, table, visiting)?);
    }
    visiting.pop();

    let handle = if bases.is_empty() {
        TypeHandle::new(name)
    } else {
        TypeHandle::derive(name, &bases)?
    };
    table.insert(handle.clone());
    Ok(handle)
}
