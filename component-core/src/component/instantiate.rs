//! Instantiation adapter

use crate::error::Result;
use crate::identity::{Identity, Instance};
use crate::registry::RegistrationEntry;

use super::Component;

/// A resolution result: the component itself, or a value it constructed
#[derive(Debug, Clone)]
pub enum Resolved {
    Component(Component),
    Instance(Instance),
}

impl Resolved {
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Resolved::Component(component) => Some(component),
            Resolved::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Resolved::Instance(instance) => Some(instance),
            Resolved::Component(_) => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Resolved::Instance(instance) => Some(instance),
            Resolved::Component(_) => None,
        }
    }

    /// Label of the component, or the type name of the constructed value
    pub fn label(&self) -> &str {
        match self {
            Resolved::Component(component) => component.label(),
            Resolved::Instance(instance) => instance.type_handle().name(),
        }
    }
}

/// A resolved component together with the name it was registered under
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub resolved: Resolved,
    pub name: String,
}

impl From<&RegistrationEntry> for ResolvedEntry {
    fn from(entry: &RegistrationEntry) -> Self {
        Self {
            resolved: Resolved::Component(entry.component.clone()),
            name: entry.name.clone(),
        }
    }
}

/// Construct every entry's component with `context` as its arguments
///
/// An empty context means a no-argument construction. The first failing
/// constructor aborts the whole list.
pub fn instantiate(entries: &[RegistrationEntry], context: &[Identity]) -> Result<Vec<ResolvedEntry>> {
    entries
        .iter()
        .map(|entry| {
            let instance = entry.component.construct(context)?;
            Ok(ResolvedEntry {
                resolved: Resolved::Instance(instance),
                name: entry.name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::TypeHandle;

    fn counting_component(ty: TypeHandle) -> Component {
        let made = ty.clone();
        Component::of_type(ty).with_constructor(move |args: &[Identity]| {
            Ok(Instance::new(made.clone(), args.len()))
        })
    }

    #[test]
    fn test_instantiate_with_context_arguments() {
        let bowl = TypeHandle::new("Bowl");
        let entries = vec![RegistrationEntry::new(counting_component(bowl.clone()), "big")];

        let dog = TypeHandle::new("Dog");
        let resolved = instantiate(&entries, &[Instance::of(dog).into()]).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "big");
        let instance = resolved[0].resolved.as_instance().unwrap();
        assert_eq!(instance.type_handle(), &bowl);
        assert_eq!(instance.downcast_ref::<usize>(), Some(&1));
    }

    #[test]
    fn test_instantiate_without_context_passes_no_arguments() {
        let entries = vec![RegistrationEntry::new(
            counting_component(TypeHandle::new("Bowl")),
            "",
        )];
        let resolved = instantiate(&entries, &[]).unwrap();
        let instance = resolved[0].resolved.as_instance().unwrap();
        assert_eq!(instance.downcast_ref::<usize>(), Some(&0));
    }

    #[test]
    fn test_instantiate_propagates_constructor_errors() {
        let entries = vec![RegistrationEntry::new(
            Component::of_type(TypeHandle::new("Bowl")),
            "",
        )];
        assert!(instantiate(&entries, &[]).is_err());
    }
}
