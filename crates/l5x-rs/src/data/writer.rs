// crates/l5x-rs/src/data/writer.rs

//! Writing data values as L5X elements.

use super::array::ArrayType;
use super::atomic::{AtomicKind, AtomicType};
use super::registry::{DataFormat, PARAMETER_STRUCTURES};
use super::string::{self, StringType};
use super::structure::StructureType;
use super::{LogixType, Member};
use crate::error::L5xError;
use crate::xml::Element;
use log::trace;

/// Wraps `value` in a data element (`Data` or `DefaultData`) with the format
/// matching its kind. Returns `None` for null values.
pub fn serialize_data(value: &LogixType, element_name: &str) -> Result<Option<Element>, L5xError> {
    let Some(format) = DataFormat::of(value) else {
        return Ok(None);
    };
    trace!("Serializing {} as {} data", value.type_name(), format);
    let data = Element::new(element_name).with_attribute("Format", format.as_str());
    match (format, value) {
        (DataFormat::String, LogixType::String(s)) => {
            data.set_attribute("Length", s.len().to_string());
            data.set_cdata(s.to_literal());
        }
        (DataFormat::Alarm | DataFormat::Message, LogixType::Structure(s)) => {
            data.append(parameters(s)?);
        }
        _ => {
            data.append(serialize_value(value)?);
        }
    }
    Ok(Some(data))
}

/// The decorated root element for `value` (`DataValue`, `Array` or `Structure`).
pub fn serialize_value(value: &LogixType) -> Result<Element, L5xError> {
    match value {
        LogixType::Null => Err(L5xError::InvalidArgument("null data cannot be serialized")),
        LogixType::Atomic(a) => Ok(atomic("DataValue", None, a, true)),
        LogixType::Array(a) => array("Array", None, a),
        LogixType::Structure(s) => structure("Structure", None, s),
        LogixType::String(s) => Ok(string_structure("Structure", None, s)),
    }
}

fn member(member: &Member) -> Result<Element, L5xError> {
    let name = Some(member.name());
    match member.value() {
        LogixType::Null => Err(L5xError::InvalidArgument("null member cannot be serialized")),
        LogixType::Atomic(a) => Ok(atomic("DataValueMember", name, a, false)),
        LogixType::Array(a) => array("ArrayMember", name, a),
        LogixType::Structure(s) => structure("StructureMember", name, s),
        LogixType::String(s) => Ok(string_structure("StructureMember", name, s)),
    }
}

fn named(element_name: &str, name: Option<&str>) -> Element {
    let element = Element::new(element_name);
    if let Some(name) = name {
        element.set_attribute("Name", name);
    }
    element
}

fn atomic(element_name: &str, name: Option<&str>, value: &AtomicType, root: bool) -> Element {
    let element = named(element_name, name).with_attribute("DataType", value.kind().as_str());
    // BOOL members carry no radix.
    if root || value.kind() != AtomicKind::Bool {
        element.set_attribute("Radix", value.radix().as_str());
    }
    element.with_attribute("Value", value.format())
}

fn array(element_name: &str, name: Option<&str>, value: &ArrayType) -> Result<Element, L5xError> {
    let element = named(element_name, name)
        .with_attribute("DataType", value.data_type())
        .with_attribute("Dimensions", value.dimensions().to_string());
    if let Some(first) = value.elements().first().and_then(|m| m.value().as_atomic()) {
        if first.kind() != AtomicKind::Bool {
            element.set_attribute("Radix", first.radix().as_str());
        }
    }
    for item in value.elements() {
        let entry = Element::new("Element").with_attribute("Index", item.name());
        match item.value() {
            LogixType::Null => {
                return Err(L5xError::InvalidArgument("null array element cannot be serialized"));
            }
            LogixType::Atomic(a) => entry.set_attribute("Value", a.format()),
            LogixType::Structure(s) => {
                entry.append(structure("Structure", None, s)?);
            }
            LogixType::String(s) => {
                entry.append(string_structure("Structure", None, s));
            }
            LogixType::Array(_) => {
                return Err(L5xError::Unsupported {
                    element: "Element".into(),
                    detail: "arrays of arrays are written with multiple dimensions".into(),
                });
            }
        }
        element.append(entry);
    }
    Ok(element)
}

fn structure(element_name: &str, name: Option<&str>, value: &StructureType) -> Result<Element, L5xError> {
    let element = named(element_name, name).with_attribute("DataType", value.name());
    for m in value.members() {
        element.append(member(m)?);
    }
    Ok(element)
}

fn string_structure(element_name: &str, name: Option<&str>, value: &StringType) -> Element {
    let len = AtomicType::from_i32(i32::try_from(value.len()).unwrap_or(i32::MAX));
    let data = Element::new("DataValueMember")
        .with_attribute("Name", string::DATA)
        .with_attribute("DataType", value.name())
        .with_attribute("Radix", "ASCII");
    data.set_cdata(value.to_literal());
    named(element_name, name)
        .with_attribute("DataType", value.name())
        .with_child(atomic("DataValueMember", Some(string::LEN), &len, false))
        .with_child(data)
}

fn parameters(value: &StructureType) -> Result<Element, L5xError> {
    let layout = PARAMETER_STRUCTURES
        .iter()
        .find(|p| p.data_type.eq_ignore_ascii_case(value.name()))
        .ok_or_else(|| L5xError::Unsupported {
            element: value.name().to_string(),
            detail: "not an alarm or message structure".into(),
        })?;
    let element = Element::new(layout.element);
    for m in value.members() {
        let text = match m.value() {
            LogixType::String(s) => s.text().to_string(),
            LogixType::Atomic(a) => a.format(),
            _ => {
                return Err(L5xError::TypeMismatch {
                    expected: "a parameter value".into(),
                    found: m.value().type_name(),
                });
            }
        };
        element.set_attribute(m.name(), text);
    }
    Ok(element)
}
