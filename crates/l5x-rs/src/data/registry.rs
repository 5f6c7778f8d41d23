// crates/l5x-rs/src/data/registry.rs

//! Reading data values out of L5X elements.
//!
//! Dispatch is by element name first and by the `Format` attribute of
//! `Data`/`DefaultData` second. Structures whose `DataType` is registered are
//! merged into that type's template so they come back with the full member
//! layout and the template's kinds and radixes.

use super::array::ArrayType;
use super::atomic::{AtomicKind, AtomicType};
use super::radix::Radix;
use super::string::{self, StringType};
use super::structure::StructureType;
use super::{LogixType, Member};
use crate::element::get_required_value;
use crate::error::L5xError;
use crate::values::{Dimensions, L5xValue, l5x_enum};
use crate::xml::Element;
use core::fmt;
use core::str::FromStr;
use log::{trace, warn};
use std::collections::BTreeMap;
use std::sync::OnceLock;

l5x_enum! {
    /// The `Format` attribute of a `Data` element.
    pub enum DataFormat {
        L5k => "L5K",
        Decorated => "Decorated",
        String => "String",
        Alarm => "Alarm",
        Message => "Message",
    }
}

impl DataFormat {
    /// The format a value is written in, or `None` for null data.
    pub fn of(value: &LogixType) -> Option<DataFormat> {
        match value {
            LogixType::Null => None,
            LogixType::String(_) => Some(DataFormat::String),
            LogixType::Structure(s) => Some(
                parameter_structure_by_type(s.name())
                    .map(|p| p.format)
                    .unwrap_or(DataFormat::Decorated),
            ),
            _ => Some(DataFormat::Decorated),
        }
    }
}

/// Attribute-only parameter elements carried by the Alarm and Message formats.
pub(crate) struct ParameterStructure {
    pub element: &'static str,
    pub data_type: &'static str,
    pub format: DataFormat,
}

pub(crate) const PARAMETER_STRUCTURES: &[ParameterStructure] = &[
    ParameterStructure {
        element: "AlarmDigitalParameters",
        data_type: "ALARM_DIGITAL",
        format: DataFormat::Alarm,
    },
    ParameterStructure {
        element: "AlarmAnalogParameters",
        data_type: "ALARM_ANALOG",
        format: DataFormat::Alarm,
    },
    ParameterStructure {
        element: "MessageParameters",
        data_type: "MESSAGE",
        format: DataFormat::Message,
    },
];

pub(crate) fn parameter_structure_by_type(data_type: &str) -> Option<&'static ParameterStructure> {
    PARAMETER_STRUCTURES
        .iter()
        .find(|p| p.data_type.eq_ignore_ascii_case(data_type))
}

fn parameter_structure_by_element(name: &str) -> Option<&'static ParameterStructure> {
    PARAMETER_STRUCTURES.iter().find(|p| p.element == name)
}

/// Templates for data types that deserialize into a known shape.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    templates: BTreeMap<String, LogixType>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> TypeRegistry {
        TypeRegistry {
            templates: BTreeMap::new(),
        }
    }

    /// The shared registry of predefined types: `STRING`, `TIMER`, `COUNTER`, `CONTROL`.
    pub fn builtin() -> &'static TypeRegistry {
        static BUILTIN: OnceLock<TypeRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = TypeRegistry::new();
            for template in predefined_templates() {
                registry.insert(template);
            }
            registry
        })
    }

    /// Adds or replaces the template for its type name.
    pub fn register(&mut self, template: LogixType) -> Result<(), L5xError> {
        if matches!(template, LogixType::Null | LogixType::Atomic(_) | LogixType::Array(_)) {
            return Err(L5xError::InvalidArgument(
                "only structure and string templates can be registered",
            ));
        }
        self.insert(template);
        Ok(())
    }

    fn insert(&mut self, template: LogixType) {
        self.templates
            .insert(template.type_name().to_ascii_uppercase(), template);
    }

    pub fn contains(&self, data_type: &str) -> bool {
        self.templates.contains_key(&data_type.to_ascii_uppercase())
    }

    pub fn template(&self, data_type: &str) -> Option<&LogixType> {
        self.templates.get(&data_type.to_ascii_uppercase())
    }

    /// Registered type names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates.values().map(|t| match t {
            LogixType::Structure(s) => s.name(),
            LogixType::String(s) => s.name(),
            _ => "",
        })
    }

    /// A default value of `data_type`: zero for atomics, the template for
    /// registered types.
    pub fn instantiate(&self, data_type: &str) -> Option<LogixType> {
        match AtomicKind::from_str(data_type) {
            Ok(kind) => Some(LogixType::Atomic(AtomicType::default_of(kind))),
            Err(_) => self.template(data_type).cloned(),
        }
    }

    /// Reads the data value represented by `element`.
    ///
    /// Components (`Tag`, `LocalTag`, `Parameter`) yield their first data
    /// child in a supported format, or [`LogixType::Null`] when there is none.
    pub fn deserialize(&self, element: &Element) -> Result<LogixType, L5xError> {
        let name = element.name();
        trace!("Deserializing data from <{}>", name);
        match name.as_str() {
            "Tag" | "LocalTag" | "Parameter" => self.component_data(element),
            "Data" | "DefaultData" => self.data(element),
            "DataValue" | "DataValueMember" => self.atomic(element),
            "Array" | "ArrayMember" => self.array(element),
            "Structure" | "StructureMember" => self.structure(element),
            "Element" => {
                let data_type = element
                    .parent()
                    .and_then(|p| p.attribute("DataType"))
                    .ok_or_else(|| L5xError::Unsupported {
                        element: name.clone(),
                        detail: "array element outside an array".into(),
                    })?;
                self.array_element(element, &data_type)
            }
            other => match parameter_structure_by_element(other) {
                Some(parameters) => self.parameters(element, parameters),
                None => Err(L5xError::Unsupported {
                    element: name.clone(),
                    detail: "not a data element".into(),
                }),
            },
        }
    }

    fn component_data(&self, element: &Element) -> Result<LogixType, L5xError> {
        let candidates = element
            .elements()
            .into_iter()
            .filter(|e| e.is_named("Data") || e.is_named("DefaultData"));
        for data in candidates {
            let Some(format) = data.attribute("Format") else {
                continue;
            };
            match format.parse::<DataFormat>() {
                Ok(DataFormat::L5k) => continue,
                Ok(_) => return self.data(&data),
                Err(_) => {
                    warn!(
                        "Skipping data in unsupported format '{}' on <{}>",
                        format,
                        element.name()
                    );
                }
            }
        }
        Ok(LogixType::Null)
    }

    fn data(&self, element: &Element) -> Result<LogixType, L5xError> {
        let format: DataFormat = get_required_value(element, "Format")?;
        trace!("Data format {}", format);
        match format {
            DataFormat::Decorated => {
                let child = element
                    .first_element()
                    .ok_or_else(|| L5xError::MissingElement {
                        element: element.name(),
                        child: "DataValue".into(),
                    })?;
                self.deserialize(&child)
            }
            DataFormat::String => self.string_data(element),
            DataFormat::Alarm | DataFormat::Message => {
                let child = element
                    .elements()
                    .into_iter()
                    .find_map(|e| parameter_structure_by_element(&e.name()).map(|p| (e, p)));
                match child {
                    Some((child, parameters)) => self.parameters(&child, parameters),
                    None => Err(L5xError::MissingElement {
                        element: element.name(),
                        child: format!("{} parameters", format),
                    }),
                }
            }
            DataFormat::L5k => Err(L5xError::Unsupported {
                element: element.name(),
                detail: "the L5K data format is not supported".into(),
            }),
        }
    }

    fn string_data(&self, element: &Element) -> Result<LogixType, L5xError> {
        let data_type = element
            .parent()
            .and_then(|p| p.attribute("DataType"))
            .unwrap_or_else(|| string::STRING.to_string());
        let text = StringType::parse_literal(&element.text().unwrap_or_default())?;
        self.string_value(&data_type, &text)
    }

    fn string_value(&self, data_type: &str, text: &str) -> Result<LogixType, L5xError> {
        match self.template(data_type) {
            Some(LogixType::String(template)) => Ok(LogixType::String(template.with_text(text)?)),
            _ => Ok(LogixType::String(StringType::with_type(
                data_type,
                string::DEFAULT_CAPACITY.max(text.chars().count()),
                text,
            )?)),
        }
    }

    fn atomic(&self, element: &Element) -> Result<LogixType, L5xError> {
        let data_type: String = get_required_value(element, "DataType")?;
        let Ok(kind) = AtomicKind::from_str(&data_type) else {
            if element.attribute("Radix").as_deref() == Some(Radix::Ascii.as_str()) {
                let text = StringType::parse_literal(&element.text().unwrap_or_default())?;
                return self.string_value(&data_type, &text);
            }
            return Err(L5xError::Unsupported {
                element: element.name(),
                detail: format!("'{}' is not an atomic data type", data_type),
            });
        };
        let value: String = get_required_value(element, "Value")?;
        let atomic = AtomicType::parse(kind, &value)?;
        if let Some(declared) = element.attribute("Radix") {
            if declared.parse::<Radix>().ok() != Some(atomic.radix()) {
                warn!(
                    "Declared radix '{}' disagrees with value '{}' of <{}>; using {}",
                    declared,
                    value,
                    element.name(),
                    atomic.radix()
                );
            }
        }
        Ok(LogixType::Atomic(atomic))
    }

    fn array(&self, element: &Element) -> Result<LogixType, L5xError> {
        let data_type: String = get_required_value(element, "DataType")?;
        let dimensions: Dimensions = get_required_value(element, "Dimensions")?;
        let elements = element
            .elements_named("Element")
            .iter()
            .map(|e| {
                let index: String = get_required_value(e, "Index")?;
                Ok(Member::new(&index, self.array_element(e, &data_type)?))
            })
            .collect::<Result<Vec<_>, L5xError>>()?;
        if elements.len() != dimensions.len() {
            warn!(
                "Array of {} declares {} elements but contains {}",
                data_type,
                dimensions.len(),
                elements.len()
            );
        }
        Ok(LogixType::Array(ArrayType::from_elements(
            &data_type, dimensions, elements,
        )))
    }

    fn array_element(&self, element: &Element, data_type: &str) -> Result<LogixType, L5xError> {
        if let Some(value) = element.attribute("Value") {
            let kind = AtomicKind::from_str(data_type).map_err(|_| L5xError::Unsupported {
                element: element.name(),
                detail: format!("'{}' is not an atomic data type", data_type),
            })?;
            return Ok(LogixType::Atomic(AtomicType::parse(kind, &value)?));
        }
        match element.first_element() {
            Some(child) => self.deserialize(&child),
            None => Err(L5xError::Unsupported {
                element: element.name(),
                detail: "array element has neither a value nor a structure".into(),
            }),
        }
    }

    fn structure(&self, element: &Element) -> Result<LogixType, L5xError> {
        let data_type: String = get_required_value(element, "DataType")?;
        let parsed = match self.string_structure(element, &data_type)? {
            Some(text) => self.string_value(&data_type, &text)?,
            None => {
                let members = element
                    .elements()
                    .iter()
                    .map(|child| {
                        let name: String = get_required_value(child, "Name")?;
                        Ok(Member::new(&name, self.deserialize(child)?))
                    })
                    .collect::<Result<Vec<_>, L5xError>>()?;
                LogixType::Structure(StructureType::new(&data_type, members)?)
            }
        };
        match self.template(&data_type) {
            Some(template) => template.set(&parsed),
            None => Ok(parsed),
        }
    }

    /// A structure is a string when it has an ASCII `DATA` member typed as the
    /// structure itself.
    fn string_structure(&self, element: &Element, data_type: &str) -> Result<Option<String>, L5xError> {
        let data = element.elements_named("DataValueMember").into_iter().find(|m| {
            m.attribute("Name").as_deref() == Some(string::DATA)
                && m.attribute("DataType")
                    .is_some_and(|t| t.eq_ignore_ascii_case(data_type))
                && m.attribute("Radix").as_deref() == Some(Radix::Ascii.as_str())
        });
        data.map(|d| StringType::parse_literal(&d.text().unwrap_or_default()))
            .transpose()
    }

    fn parameters(&self, element: &Element, parameters: &ParameterStructure) -> Result<LogixType, L5xError> {
        let members = element
            .attributes()
            .into_iter()
            .map(|(name, value)| Member::new(&name, LogixType::String(StringType::new(&value))))
            .collect();
        Ok(LogixType::Structure(StructureType::new(parameters.data_type, members)?))
    }
}

impl Default for TypeRegistry {
    /// A registry holding the predefined types.
    fn default() -> Self {
        TypeRegistry::builtin().clone()
    }
}

fn atomic_member(name: &str, kind: AtomicKind) -> Member {
    Member::new(name, LogixType::Atomic(AtomicType::default_of(kind)))
}

fn predefined_structure(name: &str, members: &[(&str, AtomicKind)]) -> LogixType {
    let members = members
        .iter()
        .map(|(n, k)| atomic_member(n, *k))
        .collect();
    StructureType::new(name, members)
        .map(LogixType::Structure)
        .unwrap_or_default()
}

fn predefined_templates() -> Vec<LogixType> {
    use AtomicKind::{Bool, Dint};
    vec![
        LogixType::String(StringType::default()),
        predefined_structure(
            "TIMER",
            &[("PRE", Dint), ("ACC", Dint), ("EN", Bool), ("TT", Bool), ("DN", Bool)],
        ),
        predefined_structure(
            "COUNTER",
            &[
                ("PRE", Dint),
                ("ACC", Dint),
                ("CU", Bool),
                ("CD", Bool),
                ("DN", Bool),
                ("OV", Bool),
                ("UN", Bool),
            ],
        ),
        predefined_structure(
            "CONTROL",
            &[
                ("LEN", Dint),
                ("POS", Dint),
                ("EN", Bool),
                ("EU", Bool),
                ("DN", Bool),
                ("EM", Bool),
                ("ER", Bool),
                ("UL", Bool),
                ("IN", Bool),
                ("FD", Bool),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> LogixType {
        TypeRegistry::builtin()
            .deserialize(&Element::parse(xml).unwrap())
            .unwrap()
    }

    #[test]
    fn test_builtin_templates() {
        let registry = TypeRegistry::builtin();
        assert!(registry.contains("timer"));
        assert!(registry.contains("STRING"));
        let counter = registry.instantiate("COUNTER").unwrap();
        assert_eq!(counter.members().len(), 7);
        assert_eq!(
            registry.instantiate("REAL"),
            Some(LogixType::Atomic(AtomicType::from_f32(0.0)))
        );
        assert!(registry.instantiate("MyUdt").is_none());
    }

    #[test]
    fn test_tag_with_decorated_data() {
        let value = parse(
            r#"<Tag Name="Count" DataType="DINT">
                 <Data Format="L5K"><![CDATA[42]]></Data>
                 <Data Format="Decorated"><DataValue DataType="DINT" Radix="Decimal" Value="42"/></Data>
               </Tag>"#,
        );
        assert_eq!(value, LogixType::Atomic(AtomicType::from_i32(42)));
    }

    #[test]
    fn test_tag_without_data_is_null() {
        let value = parse(r#"<Tag Name="A" TagType="Alias" AliasFor="B"/>"#);
        assert!(value.is_null());
    }

    #[test]
    fn test_declared_radix_does_not_override_value_text() {
        let value = parse(r#"<DataValueMember Name="PRE" DataType="DINT" Radix="Hex" Value="42"/>"#);
        assert_eq!(value, LogixType::Atomic(AtomicType::from_i32(42)));
        assert_eq!(value.as_atomic().map(AtomicType::radix), Some(Radix::Decimal));

        let value = parse(r#"<DataValue DataType="INT" Radix="Decimal" Value="16#00ff"/>"#);
        assert_eq!(value.as_atomic().map(AtomicType::radix), Some(Radix::Hex));
        assert_eq!(value.as_atomic().and_then(|a| a.value().as_integer()), Some(255));
    }

    #[test]
    fn test_timer_merged_into_template() {
        let value = parse(
            r#"<Structure DataType="TIMER">
                 <DataValueMember Name="PRE" DataType="DINT" Radix="Decimal" Value="5000"/>
                 <DataValueMember Name="DN" DataType="BOOL" Value="1"/>
               </Structure>"#,
        );
        assert_eq!(value.members().len(), 5);
        assert_eq!(
            value.member("PRE").unwrap().value(),
            &LogixType::Atomic(AtomicType::from_i32(5000))
        );
        assert_eq!(
            value.member("DN").unwrap().value(),
            &LogixType::Atomic(AtomicType::from_bool(true))
        );
    }

    #[test]
    fn test_string_data_format() {
        let value = parse(
            r#"<Tag Name="Msg" DataType="STRING">
                 <Data Format="String" Length="5"><![CDATA['hello']]></Data>
               </Tag>"#,
        );
        let string = value.as_string().unwrap();
        assert_eq!(string.text(), "hello");
        assert_eq!(string.capacity(), 82);
    }

    #[test]
    fn test_string_structure_heuristic() {
        let value = parse(
            r#"<Structure DataType="MyString">
                 <DataValueMember Name="LEN" DataType="DINT" Radix="Decimal" Value="2"/>
                 <DataValueMember Name="DATA" DataType="MyString" Radix="ASCII"><![CDATA['ok']]></DataValueMember>
               </Structure>"#,
        );
        assert_eq!(value.as_string().map(StringType::text), Some("ok"));
        assert_eq!(value.type_name(), "MyString");
    }

    #[test]
    fn test_array_of_structures() {
        let value = parse(
            r#"<Array DataType="Point" Dimensions="2">
                 <Element Index="[0]"><Structure DataType="Point">
                   <DataValueMember Name="X" DataType="REAL" Radix="Float" Value="1.5"/>
                 </Structure></Element>
                 <Element Index="[1]"><Structure DataType="Point">
                   <DataValueMember Name="X" DataType="REAL" Radix="Float" Value="2.5"/>
                 </Structure></Element>
               </Array>"#,
        );
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(
            value.member("[1].X").unwrap().value(),
            &LogixType::Atomic(AtomicType::from_f32(2.5))
        );
    }

    #[test]
    fn test_alarm_parameters() {
        let value = parse(
            r#"<Data Format="Alarm">
                 <AlarmDigitalParameters Severity="500" ProgTime="DT#1970-01-01-00:00:00.000_000Z" InFault="false"/>
               </Data>"#,
        );
        assert_eq!(value.type_name(), "ALARM_DIGITAL");
        assert_eq!(
            value.member("Severity").unwrap().value().as_string().map(StringType::text),
            Some("500")
        );
        assert_eq!(DataFormat::of(&value), Some(DataFormat::Alarm));
    }

    #[test]
    fn test_unsupported_inputs() {
        let registry = TypeRegistry::builtin();
        let l5k = Element::parse(r#"<Data Format="L5K"><![CDATA[0]]></Data>"#).unwrap();
        assert!(matches!(registry.deserialize(&l5k), Err(L5xError::Unsupported { .. })));
        let other = Element::parse(r#"<Rung Number="0"/>"#).unwrap();
        assert!(matches!(registry.deserialize(&other), Err(L5xError::Unsupported { .. })));
        let missing = Element::parse(r#"<DataValue DataType="DINT"/>"#).unwrap();
        assert!(matches!(
            registry.deserialize(&missing),
            Err(L5xError::MissingAttribute { .. })
        ));
    }
}
