//! Typed instances

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::TypeHandle;

/// A value tagged with the declared type it is an instance of
///
/// Instances are what component constructors produce and what callers pass
/// as query context. Clones share the same payload and the same id.
#[derive(Clone)]
pub struct Instance {
    id: Uuid,
    ty: TypeHandle,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap `value` as an instance of `ty`
    pub fn new<T: Any + Send + Sync>(ty: TypeHandle, value: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            ty,
            value: Arc::new(value),
        }
    }

    /// An instance of `ty` with no payload
    pub fn of(ty: TypeHandle) -> Self {
        Self::new(ty, ())
    }

    /// Runtime type of this instance
    pub fn type_handle(&self) -> &TypeHandle {
        &self.ty
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Borrow the payload as `T`, if that is what it holds
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Whether both handles refer to the same instance
    pub fn same_instance(&self, other: &Instance) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.ty.name())
            .field("id", &self.id)
            .finish()
    }
}
