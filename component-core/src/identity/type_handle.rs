//! Type descriptors and C3 linearization

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ComponentError, Result};

/// Handle to a registrable type
///
/// A type is declared once, either as a root (`TypeHandle::new`) or as a
/// subtype of other declared types (`TypeHandle::derive`). Its ancestor
/// chain is computed at declaration time and never changes afterwards.
///
/// Handles are cheap to clone. Two handles are equal only if they come from
/// the same declaration; two separately declared types with the same name
/// are different types. The registry stores registrations by name, but each
/// type still resolves through its own ancestor chain.
#[derive(Clone)]
pub struct TypeHandle(Arc<TypeInfo>);

struct TypeInfo {
    id: Uuid,
    name: String,
    bases: Vec<TypeHandle>,
    /// Linearized ancestors, most specific first, excluding the type itself
    ancestors: Vec<TypeHandle>,
}

impl TypeHandle {
    /// Declare a root type with no supertypes
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(TypeInfo {
            id: Uuid::new_v4(),
            name: name.into(),
            bases: Vec::new(),
            ancestors: Vec::new(),
        }))
    }

    /// Declare a type deriving from `bases`, in declaration order
    ///
    /// The ancestor chain is the C3 linearization of the bases. Fails with
    /// [`ComponentError::NoAncestors`] when no consistent order exists, which
    /// includes listing the same base twice.
    pub fn derive(name: impl Into<String>, bases: &[TypeHandle]) -> Result<Self> {
        let name = name.into();
        let ancestors = linearize(&name, bases)?;
        Ok(Self(Arc::new(TypeInfo {
            id: Uuid::new_v4(),
            name,
            bases: bases.to_vec(),
            ancestors,
        })))
    }

    /// Declared type name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Unique id of this declaration
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    /// Direct supertypes, in declaration order
    pub fn bases(&self) -> &[TypeHandle] {
        &self.0.bases
    }

    /// The type followed by its ancestors, most specific first
    pub fn linearization(&self) -> impl Iterator<Item = &TypeHandle> {
        std::iter::once(self).chain(self.0.ancestors.iter())
    }

    /// Names of [`linearization`](Self::linearization)
    pub fn ancestor_names(&self) -> Vec<String> {
        self.linearization().map(|t| t.name().to_string()).collect()
    }

    /// Whether `other` appears in this type's linearization
    pub fn is_subtype_of(&self, other: &TypeHandle) -> bool {
        self.linearization().any(|t| t == other)
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle").field(&self.0.name).finish()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// C3 merge of the bases' linearizations followed by the base list itself
fn linearize(name: &str, bases: &[TypeHandle]) -> Result<Vec<TypeHandle>> {
    let mut sequences: Vec<Vec<TypeHandle>> = bases
        .iter()
        .map(|base| base.linearization().cloned().collect())
        .collect();
    sequences.push(bases.to_vec());

    let mut merged = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(merged);
        }

        // A good head appears in no other sequence's tail
        let head = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|t| t == *candidate))
            })
            .cloned();

        let Some(head) = head else {
            let pending: Vec<&str> = sequences.iter().map(|seq| seq[0].name()).collect();
            return Err(ComponentError::NoAncestors {
                identity: name.to_string(),
                reason: format!(
                    "cannot create a consistent ancestor order for bases {:?}",
                    pending
                ),
            });
        };

        for seq in sequences.iter_mut() {
            if seq[0] == head {
                seq.remove(0);
            }
        }
        merged.push(head);
    }
}
