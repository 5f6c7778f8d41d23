// crates/l5x-rs/src/element.rs

//! The element wrapper: typed accessors over a backing [`Element`].
//!
//! Every accessor takes the attribute or child element name explicitly and
//! reads or writes the backing node directly. Nothing is cached, so a value set
//! through one view is visible through every other view of the same node.

use crate::container::LogixContainer;
use crate::component::LogixComponent;
use crate::error::L5xError;
use crate::values::L5xValue;
use crate::xml::Element;

/// Name of the description child element. It is always the first child.
pub const DESCRIPTION: &str = "Description";

/// A typed view over a backing element.
pub trait LogixElement: Sized {
    /// The L5X element name this type serializes to.
    const ELEMENT: &'static str;

    /// The backing node.
    fn element(&self) -> &Element;

    /// Wraps an existing node, checking that it has the expected name.
    fn deserialize(element: Element) -> Result<Self, L5xError>;

    /// The node representing this value. For element-backed types this is the
    /// live backing node; containers deep copy it when it is already attached.
    fn serialize(&self) -> Element {
        self.element().clone()
    }

    /// Reads an attribute; `None` when absent.
    fn get_value<T: L5xValue>(&self, name: &str) -> Result<Option<T>, L5xError> {
        get_value(self.element(), name)
    }

    /// Reads an attribute that the schema requires.
    fn get_required_value<T: L5xValue>(&self, name: &str) -> Result<T, L5xError> {
        get_required_value(self.element(), name)
    }

    /// Reads the text or CDATA content of a child element.
    fn get_property<T: L5xValue>(&self, name: &str) -> Result<Option<T>, L5xError> {
        get_property(self.element(), name)
    }

    /// Wraps a named child element as a nested typed view.
    fn get_complex<T: LogixElement>(&self, name: &str) -> Result<Option<T>, L5xError> {
        self.element().element(name).map(T::deserialize).transpose()
    }

    /// Wraps the named container child element. Containers are structural
    /// and their absence is an error.
    fn get_container<T: LogixComponent>(&self) -> Result<LogixContainer<T>, L5xError> {
        get_container(self.element())
    }

    /// Adds, updates or (with `None`) removes an attribute.
    fn set_value<T: L5xValue>(&self, name: &str, value: Option<&T>) {
        set_value(self.element(), name, value)
    }

    /// Adds, updates or (with `None`) removes a text child element.
    fn set_property<T: L5xValue>(&self, name: &str, value: Option<&T>) {
        set_property(self.element(), name, value)
    }

    /// Replaces (or adds) a nested element with the serialized form of `value`.
    fn set_complex<T: LogixElement>(&self, value: Option<&T>) -> Result<(), L5xError> {
        let existing = self.element().element(T::ELEMENT);
        match (existing, value) {
            (Some(old), Some(new)) => {
                old.replace_with(new.serialize())?;
            }
            (None, Some(new)) => {
                self.element().append(new.serialize());
            }
            (Some(old), None) => {
                old.remove();
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Replaces (or adds) the named container element wholesale.
    fn set_container<T: LogixComponent>(&self, container: &LogixContainer<T>) -> Result<(), L5xError> {
        set_container(self.element(), container)
    }

    fn description(&self) -> Result<Option<String>, L5xError> {
        self.get_property(DESCRIPTION)
    }

    fn set_description(&self, description: Option<&str>) {
        let value = description.map(str::to_string);
        self.set_property(DESCRIPTION, value.as_ref());
    }
}

/// Verifies that `element` is named `expected` before it is wrapped.
pub(crate) fn expect_element(element: &Element, expected: &str) -> Result<(), L5xError> {
    if element.is_named(expected) {
        Ok(())
    } else {
        Err(L5xError::Unsupported {
            element: element.name(),
            detail: format!("expected a '{}' element", expected),
        })
    }
}

pub(crate) fn convert<T: L5xValue>(element: &Element, name: &str, text: &str) -> Result<T, L5xError> {
    T::parse_l5x(text).map_err(|reason| L5xError::Conversion {
        element: element.name(),
        property: name.to_string(),
        value: text.to_string(),
        reason,
    })
}

pub fn get_value<T: L5xValue>(element: &Element, name: &str) -> Result<Option<T>, L5xError> {
    element
        .attribute(name)
        .map(|text| convert(element, name, &text))
        .transpose()
}

pub fn get_required_value<T: L5xValue>(element: &Element, name: &str) -> Result<T, L5xError> {
    get_value(element, name)?.ok_or_else(|| L5xError::MissingAttribute {
        element: element.name(),
        attribute: name.to_string(),
    })
}

pub fn get_property<T: L5xValue>(element: &Element, name: &str) -> Result<Option<T>, L5xError> {
    match element.element(name) {
        Some(child) => {
            let text = child.text().unwrap_or_default();
            convert(element, name, &text).map(Some)
        }
        None => Ok(None),
    }
}

pub fn get_container<T: LogixComponent>(element: &Element) -> Result<LogixContainer<T>, L5xError> {
    let child = element
        .element(T::CONTAINER)
        .ok_or_else(|| L5xError::MissingElement {
            element: element.name(),
            child: T::CONTAINER.to_string(),
        })?;
    Ok(LogixContainer::from_element(child))
}

pub fn set_value<T: L5xValue>(element: &Element, name: &str, value: Option<&T>) {
    match value {
        Some(v) => element.set_attribute(name, v.to_l5x()),
        None => {
            element.remove_attribute(name);
        }
    }
}

pub fn set_property<T: L5xValue>(element: &Element, name: &str, value: Option<&T>) {
    match (element.element(name), value) {
        (Some(child), Some(v)) => child.set_cdata(v.to_l5x()),
        (None, Some(v)) => {
            let child = Element::new(name);
            child.set_cdata(v.to_l5x());
            if name == DESCRIPTION {
                element.prepend(child);
            } else {
                element.append(child);
            }
        }
        (Some(child), None) => {
            child.remove();
        }
        (None, None) => {}
    }
}

pub fn set_container<T: LogixComponent>(
    element: &Element,
    container: &LogixContainer<T>,
) -> Result<(), L5xError> {
    let replacement = container.serialize();
    match element.element(T::CONTAINER) {
        Some(existing) => {
            existing.replace_with(replacement)?;
        }
        None => {
            element.append(replacement);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Dimensions, ExternalAccess};

    fn tag() -> Element {
        Element::parse(
            r#"<Tag Name="Test" DataType="DINT" Dimensions="5" ExternalAccess="Read/Write" Constant="bogus">
                 <Comments/>
               </Tag>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_get_value_absent_is_none() {
        let e = tag();
        assert_eq!(get_value::<String>(&e, "Radix").unwrap(), None);
        assert_eq!(get_value::<Dimensions>(&e, "Dimensions").unwrap().unwrap().len(), 5);
        assert_eq!(
            get_value::<ExternalAccess>(&e, "ExternalAccess").unwrap(),
            Some(ExternalAccess::ReadWrite)
        );
    }

    #[test]
    fn test_get_required_value_missing_names_property() {
        let e = tag();
        let err = get_required_value::<String>(&e, "Usage").unwrap_err();
        assert!(matches!(
            err,
            L5xError::MissingAttribute { ref element, ref attribute } if element == "Tag" && attribute == "Usage"
        ));
    }

    #[test]
    fn test_conversion_error_is_tagged() {
        let e = tag();
        let err = get_value::<bool>(&e, "Constant").unwrap_err();
        assert!(matches!(err, L5xError::Conversion { ref property, .. } if property == "Constant"));
    }

    #[test]
    fn test_set_value_add_update_remove() {
        let e = tag();
        set_value(&e, "Radix", Some(&"Decimal".to_string()));
        assert_eq!(e.attribute("Radix").as_deref(), Some("Decimal"));
        set_value(&e, "Radix", Some(&"Hex".to_string()));
        assert_eq!(e.attribute("Radix").as_deref(), Some("Hex"));
        set_value::<String>(&e, "Radix", None);
        assert!(!e.has_attribute("Radix"));
    }

    #[test]
    fn test_description_is_first_child() {
        let e = tag();
        set_property(&e, DESCRIPTION, Some(&"Conveyor speed".to_string()));
        assert_eq!(e.first_element().unwrap().name(), DESCRIPTION);
        assert_eq!(
            get_property::<String>(&e, DESCRIPTION).unwrap().as_deref(),
            Some("Conveyor speed")
        );
        set_property::<String>(&e, DESCRIPTION, None);
        assert!(e.element(DESCRIPTION).is_none());
    }
}
