// crates/l5x-rs/src/components/mod.rs

//! Typed views over the L5X component elements.
//!
//! Every type here is a thin handle over its backing element; properties are
//! read from and written to the element on each call.

mod aoi;
mod controller;
mod data_type;
mod module;
mod program;
mod routine;
mod tag;
mod task;

pub use aoi::AddOnInstruction;
pub use controller::Controller;
pub use data_type::{DataType, DataTypeMember};
pub use module::{Module, Port};
pub use program::Program;
pub use routine::{Routine, Rung};
pub use tag::{LocalTag, LogixTag, Parameter, Tag};
pub use task::Task;

use crate::component::validate_name;
use crate::error::L5xError;
use crate::xml::Element;

/// Declares an element-backed type and its [`LogixElement`](crate::LogixElement) impl.
macro_rules! element_type {
    ($(#[$meta:meta])* $name:ident => $element:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            element: $crate::xml::Element,
        }

        impl $crate::element::LogixElement for $name {
            const ELEMENT: &'static str = $element;

            fn element(&self) -> &$crate::xml::Element {
                &self.element
            }

            fn deserialize(element: $crate::xml::Element) -> Result<Self, $crate::error::L5xError> {
                $crate::element::expect_element(&element, Self::ELEMENT)?;
                Ok($name { element })
            }
        }
    };
}

/// Declares an element-backed component stored in the named container.
macro_rules! component_type {
    ($(#[$meta:meta])* $name:ident => $element:literal in $container:literal) => {
        $crate::components::element_type!($(#[$meta])* $name => $element);

        impl $crate::component::LogixComponent for $name {
            const CONTAINER: &'static str = $container;
        }
    };
}

pub(crate) use {component_type, element_type};

/// A fresh component node with a validated `Name`.
pub(crate) fn new_component(element: &str, name: &str) -> Result<Element, L5xError> {
    validate_name(name)?;
    Ok(Element::new(element).with_attribute("Name", name))
}
