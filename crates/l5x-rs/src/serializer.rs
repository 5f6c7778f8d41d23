// crates/l5x-rs/src/serializer.rs

//! The component registry.
//!
//! Maps each component kind to the element name it serializes to and the
//! container element holding it. Deserializing an arbitrary component node
//! goes through this table instead of guessing from the node's shape.

use crate::component::LogixComponent;
use crate::components::{
    AddOnInstruction, DataType, DataTypeMember, LocalTag, Module, Parameter, Program, Routine,
    Tag, Task,
};
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::xml::Element;
use log::trace;

/// Every kind of named component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    DataType,
    DataTypeMember,
    Module,
    AddOnInstruction,
    Tag,
    LocalTag,
    Parameter,
    Program,
    Routine,
    Task,
}

struct Registration {
    kind: ComponentKind,
    element: &'static str,
    container: &'static str,
}

const fn register<T: LogixComponent>(kind: ComponentKind) -> Registration {
    Registration {
        kind,
        element: T::ELEMENT,
        container: T::CONTAINER,
    }
}

const REGISTRY: &[Registration] = &[
    register::<DataType>(ComponentKind::DataType),
    register::<DataTypeMember>(ComponentKind::DataTypeMember),
    register::<Module>(ComponentKind::Module),
    register::<AddOnInstruction>(ComponentKind::AddOnInstruction),
    register::<Tag>(ComponentKind::Tag),
    register::<LocalTag>(ComponentKind::LocalTag),
    register::<Parameter>(ComponentKind::Parameter),
    register::<Program>(ComponentKind::Program),
    register::<Routine>(ComponentKind::Routine),
    register::<Task>(ComponentKind::Task),
];

impl ComponentKind {
    pub const ALL: &'static [ComponentKind] = &[
        ComponentKind::DataType,
        ComponentKind::DataTypeMember,
        ComponentKind::Module,
        ComponentKind::AddOnInstruction,
        ComponentKind::Tag,
        ComponentKind::LocalTag,
        ComponentKind::Parameter,
        ComponentKind::Program,
        ComponentKind::Routine,
        ComponentKind::Task,
    ];

    fn registration(&self) -> &'static Registration {
        // Every kind is registered; covered by `test_every_kind_registered`.
        REGISTRY
            .iter()
            .find(|r| r.kind == *self)
            .unwrap_or(&REGISTRY[0])
    }

    /// Element name of a single component.
    pub fn element(&self) -> &'static str {
        self.registration().element
    }

    /// Element name of the container holding components of this kind.
    pub fn container(&self) -> &'static str {
        self.registration().container
    }

    pub fn from_element(name: &str) -> Option<ComponentKind> {
        REGISTRY.iter().find(|r| r.element == name).map(|r| r.kind)
    }

    pub fn from_container(name: &str) -> Option<ComponentKind> {
        REGISTRY.iter().find(|r| r.container == name).map(|r| r.kind)
    }

    /// The kind registered for `T`.
    pub fn of<T: LogixComponent>() -> Option<ComponentKind> {
        ComponentKind::from_element(T::ELEMENT)
    }
}

/// A deserialized component of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyComponent {
    DataType(DataType),
    DataTypeMember(DataTypeMember),
    Module(Module),
    AddOnInstruction(AddOnInstruction),
    Tag(Tag),
    LocalTag(LocalTag),
    Parameter(Parameter),
    Program(Program),
    Routine(Routine),
    Task(Task),
}

impl AnyComponent {
    /// Deserializes `element` as the component kind registered for its name.
    pub fn deserialize(element: Element) -> Result<AnyComponent, L5xError> {
        let kind = ComponentKind::from_element(&element.name()).ok_or_else(|| {
            L5xError::Unsupported {
                element: element.name(),
                detail: "not a component element".into(),
            }
        })?;
        trace!("Deserializing <{}> as {:?}", element.name(), kind);
        Ok(match kind {
            ComponentKind::DataType => AnyComponent::DataType(DataType::deserialize(element)?),
            ComponentKind::DataTypeMember => {
                AnyComponent::DataTypeMember(DataTypeMember::deserialize(element)?)
            }
            ComponentKind::Module => AnyComponent::Module(Module::deserialize(element)?),
            ComponentKind::AddOnInstruction => {
                AnyComponent::AddOnInstruction(AddOnInstruction::deserialize(element)?)
            }
            ComponentKind::Tag => AnyComponent::Tag(Tag::deserialize(element)?),
            ComponentKind::LocalTag => AnyComponent::LocalTag(LocalTag::deserialize(element)?),
            ComponentKind::Parameter => AnyComponent::Parameter(Parameter::deserialize(element)?),
            ComponentKind::Program => AnyComponent::Program(Program::deserialize(element)?),
            ComponentKind::Routine => AnyComponent::Routine(Routine::deserialize(element)?),
            ComponentKind::Task => AnyComponent::Task(Task::deserialize(element)?),
        })
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            AnyComponent::DataType(_) => ComponentKind::DataType,
            AnyComponent::DataTypeMember(_) => ComponentKind::DataTypeMember,
            AnyComponent::Module(_) => ComponentKind::Module,
            AnyComponent::AddOnInstruction(_) => ComponentKind::AddOnInstruction,
            AnyComponent::Tag(_) => ComponentKind::Tag,
            AnyComponent::LocalTag(_) => ComponentKind::LocalTag,
            AnyComponent::Parameter(_) => ComponentKind::Parameter,
            AnyComponent::Program(_) => ComponentKind::Program,
            AnyComponent::Routine(_) => ComponentKind::Routine,
            AnyComponent::Task(_) => ComponentKind::Task,
        }
    }

    /// The backing node.
    pub fn element(&self) -> &Element {
        match self {
            AnyComponent::DataType(c) => c.element(),
            AnyComponent::DataTypeMember(c) => c.element(),
            AnyComponent::Module(c) => c.element(),
            AnyComponent::AddOnInstruction(c) => c.element(),
            AnyComponent::Tag(c) => c.element(),
            AnyComponent::LocalTag(c) => c.element(),
            AnyComponent::Parameter(c) => c.element(),
            AnyComponent::Program(c) => c.element(),
            AnyComponent::Routine(c) => c.element(),
            AnyComponent::Task(c) => c.element(),
        }
    }

    pub fn name(&self) -> Result<String, L5xError> {
        crate::element::get_required_value(self.element(), "Name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_registered() {
        for kind in ComponentKind::ALL {
            assert!(
                REGISTRY.iter().any(|r| r.kind == *kind),
                "{:?} is not registered",
                kind
            );
        }
        assert_eq!(REGISTRY.len(), ComponentKind::ALL.len());
    }

    #[test]
    fn test_element_names_are_unique() {
        let elements: HashSet<_> = REGISTRY.iter().map(|r| r.element).collect();
        assert_eq!(elements.len(), REGISTRY.len());
    }

    #[test]
    fn test_lookup_both_ways() {
        assert_eq!(ComponentKind::Tag.container(), "Tags");
        assert_eq!(ComponentKind::AddOnInstruction.element(), "AddOnInstructionDefinition");
        assert_eq!(ComponentKind::from_container("Routines"), Some(ComponentKind::Routine));
        assert_eq!(ComponentKind::of::<Program>(), Some(ComponentKind::Program));
        assert_eq!(ComponentKind::from_element("Rung"), None);
    }

    #[test]
    fn test_deserialize_dispatches_on_element_name() {
        let element = Element::parse(r#"<Task Name="Main" Type="CONTINUOUS"/>"#).unwrap();
        let component = AnyComponent::deserialize(element).unwrap();
        assert_eq!(component.kind(), ComponentKind::Task);
        assert_eq!(component.name().unwrap(), "Main");

        let rung = Element::parse(r#"<Rung Number="0"/>"#).unwrap();
        assert!(matches!(
            AnyComponent::deserialize(rung),
            Err(L5xError::Unsupported { .. })
        ));
    }
}
