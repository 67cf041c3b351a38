//! Type identities - turning types, instances and names into registry keys
//!
//! Everything the registry stores is keyed by strings. This module owns the
//! two conversions that produce them:
//!
//! - [`identity_of`]: the canonical name of a type, of an instance's type, or
//!   a plain name passed through unchanged
//! - [`ancestor_chain`]: the linearized supertypes of a type (or of an
//!   instance's type), most specific first
//!
//! ```text
//!   Identity::Name("Feeder")  ──identity_of──▶ "Feeder"
//!   Identity::Type(Dog)       ──identity_of──▶ "Dog"
//!   Identity::Instance(rex)   ──identity_of──▶ "Dog"
//!
//!   Identity::Type(Dog)       ──ancestor_chain──▶ ["Dog", "Animal"]
//! ```

mod instance;
mod type_handle;

pub use instance::Instance;
pub use type_handle::TypeHandle;

use std::fmt;

use crate::error::{ComponentError, Result};

/// Separates an identity from a registration name in primary keys
pub const NAME_SEPARATOR: char = ':';

/// Suffix marking a wildcard primary key
pub const WILDCARD: char = '*';

/// Something that names a type: a plain name, a type, or an instance
#[derive(Debug, Clone)]
pub enum Identity {
    Name(String),
    Type(TypeHandle),
    Instance(Instance),
}

impl Identity {
    /// Canonical identity string, see [`identity_of`]
    pub fn identity(&self) -> Result<String> {
        identity_of(self)
    }

    /// The type behind this identity, if it has one
    pub fn type_handle(&self) -> Option<&TypeHandle> {
        match self {
            Identity::Name(_) => None,
            Identity::Type(ty) => Some(ty),
            Identity::Instance(instance) => Some(instance.type_handle()),
        }
    }

    /// Raw display name, without validation
    pub fn display_name(&self) -> &str {
        match self {
            Identity::Name(name) => name,
            Identity::Type(ty) => ty.name(),
            Identity::Instance(instance) => instance.type_handle().name(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Identity::Name(name.to_string())
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Identity::Name(name)
    }
}

impl From<TypeHandle> for Identity {
    fn from(ty: TypeHandle) -> Self {
        Identity::Type(ty)
    }
}

impl From<&TypeHandle> for Identity {
    fn from(ty: &TypeHandle) -> Self {
        Identity::Type(ty.clone())
    }
}

impl From<Instance> for Identity {
    fn from(instance: Instance) -> Self {
        Identity::Instance(instance)
    }
}

impl From<&Instance> for Identity {
    fn from(instance: &Instance) -> Self {
        Identity::Instance(instance.clone())
    }
}

/// Canonical identity string of a name, type or instance
///
/// Names pass through unchanged, types yield their declared name and
/// instances their runtime type's name. The result must be non-empty and
/// must not contain the key markers `:` or `*`.
pub fn identity_of(x: &Identity) -> Result<String> {
    let name = x.display_name();
    validate(name)?;
    Ok(name.to_string())
}

/// Linearized ancestor names, most specific first
///
/// Fails with [`ComponentError::NoAncestors`] for plain names, which carry
/// no type to inspect.
pub fn ancestor_chain(x: &Identity) -> Result<Vec<String>> {
    match x.type_handle() {
        Some(ty) => Ok(ty.ancestor_names()),
        None => Err(ComponentError::NoAncestors {
            identity: x.display_name().to_string(),
            reason: "a plain name has no type to inspect".to_string(),
        }),
    }
}

/// Ancestor names used when matching a query context element
///
/// Types and instances expand to their full chain; a plain name matches
/// only itself.
pub(crate) fn context_chain(x: &Identity) -> Result<Vec<String>> {
    match x {
        Identity::Name(_) => Ok(vec![identity_of(x)?]),
        _ => ancestor_chain(x),
    }
}

/// Check a registration name
///
/// Names may be empty but, like identities, must not contain `:` or `*`:
/// a name ending in `*` would turn an exact key into a wildcard one.
pub fn validate_name(name: &str) -> Result<()> {
    let marker = [NAME_SEPARATOR, WILDCARD]
        .into_iter()
        .find(|marker| name.contains(*marker));

    match marker {
        Some(marker) => Err(ComponentError::InvalidIdentity {
            identity: name.to_string(),
            reason: format!("registration name must not contain '{}'", marker),
        }),
        None => Ok(()),
    }
}

fn validate(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "identity must not be empty"
    } else if name.contains(NAME_SEPARATOR) {
        "identity must not contain ':'"
    } else if name.contains(WILDCARD) {
        "identity must not contain '*'"
    } else {
        return Ok(());
    };

    Err(ComponentError::InvalidIdentity {
        identity: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> TypeHandle {
        let animal = TypeHandle::new("Animal");
        TypeHandle::derive("Dog", &[animal]).unwrap()
    }

    #[test]
    fn test_identity_of_variants() {
        let dog = dog();
        assert_eq!(identity_of(&"Feeder".into()).unwrap(), "Feeder");
        assert_eq!(identity_of(&(&dog).into()).unwrap(), "Dog");
        assert_eq!(identity_of(&Instance::of(dog).into()).unwrap(), "Dog");
    }

    #[test]
    fn test_identity_of_rejects_reserved_markers() {
        for bad in ["", "  ", "Feeder:morning", "Animal*"] {
            let err = identity_of(&bad.into()).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_IDENTITY", "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_ancestor_chain_of_type_and_instance() {
        let dog = dog();
        assert_eq!(ancestor_chain(&(&dog).into()).unwrap(), vec!["Dog", "Animal"]);
        assert_eq!(
            ancestor_chain(&Instance::of(dog).into()).unwrap(),
            vec!["Dog", "Animal"]
        );
    }

    #[test]
    fn test_ancestor_chain_of_name_fails() {
        let err = ancestor_chain(&"Dog".into()).unwrap_err();
        assert_eq!(err.error_code(), "NO_ANCESTORS");
    }

    #[test]
    fn test_context_chain_of_name_is_exact() {
        assert_eq!(context_chain(&"Dog".into()).unwrap(), vec!["Dog"]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("").is_ok());
        assert!(validate_name("morning").is_ok());
        for bad in ["big*", "a:b"] {
            let err = validate_name(bad).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_IDENTITY", "accepted {:?}", bad);
        }
    }
}
