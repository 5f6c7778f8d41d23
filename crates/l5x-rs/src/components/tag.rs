// crates/l5x-rs/src/components/tag.rs

use super::{component_type, new_component};
use crate::component::{LogixComponent, names_equal};
use crate::data::{ArrayType, ChangeObserver, LogixType, Member, Radix, TypeRegistry, serialize_data};
use crate::element::{LogixElement, get_value};
use crate::error::L5xError;
use crate::values::{Dimensions, ExternalAccess, TagType, TagUsage};
use crate::xml::Element;
use core::mem::discriminant;
use log::debug;

component_type! {
    /// A controller or program scoped tag.
    Tag => "Tag" in "Tags"
}

component_type! {
    /// A local tag of an Add-On Instruction.
    LocalTag => "LocalTag" in "LocalTags"
}

component_type! {
    /// A parameter of an Add-On Instruction.
    Parameter => "Parameter" in "Parameters"
}

/// A component that carries a data value.
///
/// The value is read from the first data child in a supported format. Setting
/// a value runs the set cascade against the current value and, when anything
/// changed, rewrites every data child (stale `L5K` data included).
pub trait LogixTag: LogixComponent {
    /// `Data` for tags, `DefaultData` for AOI parameters and local tags.
    const DATA_ELEMENT: &'static str;

    fn data_type(&self) -> Result<String, L5xError> {
        self.get_required_value("DataType")
    }

    /// Array dimensions; empty for scalars.
    fn dimensions(&self) -> Result<Dimensions, L5xError> {
        Ok(self.get_value("Dimensions")?.unwrap_or_default())
    }

    fn radix(&self) -> Result<Option<Radix>, L5xError> {
        self.get_value("Radix")
    }

    fn external_access(&self) -> Result<Option<ExternalAccess>, L5xError> {
        self.get_value("ExternalAccess")
    }

    fn set_external_access(&self, access: Option<ExternalAccess>) {
        self.set_value("ExternalAccess", access.as_ref())
    }

    /// The current value, [`LogixType::Null`] when the element has no data.
    ///
    /// Only the predefined types are known here: a user structure comes back
    /// with its parsed members and a user string type (e.g. `STRING_20`) with
    /// the default capacity. Use [`value_with`](Self::value_with) and the
    /// `*_with` setters with the project registry from
    /// [`L5X::type_registry`](crate::L5X::type_registry) for the declared layout.
    fn value(&self) -> Result<LogixType, L5xError> {
        self.value_with(TypeRegistry::builtin())
    }

    /// The current value, merging structures into the templates of `registry`.
    fn value_with(&self, registry: &TypeRegistry) -> Result<LogixType, L5xError> {
        registry.deserialize(self.element())
    }

    /// Sets the whole value. Returns whether it changed.
    fn set_data(&self, value: &LogixType) -> Result<bool, L5xError> {
        self.set_data_with(value, TypeRegistry::builtin())
    }

    /// Sets the whole value against the templates of `registry`.
    fn set_data_with(&self, value: &LogixType, registry: &TypeRegistry) -> Result<bool, L5xError> {
        self.set_data_observed_with(value, registry, &mut |_: &str| {})
    }

    fn set_data_observed(
        &self,
        value: &LogixType,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        self.set_data_observed_with(value, TypeRegistry::builtin(), observer)
    }

    fn set_data_observed_with(
        &self,
        value: &LogixType,
        registry: &TypeRegistry,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let (current, readable) = writable_value(self.element(), registry)?;
        if !readable {
            check_declared_type(self.element(), &current, value)?;
        }
        let mut root = Member::new(&self.name()?, current);
        let changed = root.set_observed(value, observer)?;
        if !changed && readable {
            return Ok(false);
        }
        if !self.element().has_attribute("DataType") {
            write_type_attributes(self.element(), root.value());
        }
        write_data(self.element(), Self::DATA_ELEMENT, root.value())?;
        Ok(true)
    }

    /// The nested member at `path`, e.g. `PRE` or `Items[2].Speed`.
    fn member(&self, path: &str) -> Result<Option<Member>, L5xError> {
        Ok(self.value()?.member(path))
    }

    /// Sets the nested member at `path`. Returns whether anything changed.
    fn set_member(&self, path: &str, value: &LogixType) -> Result<bool, L5xError> {
        self.set_member_with(path, value, TypeRegistry::builtin())
    }

    fn set_member_with(
        &self,
        path: &str,
        value: &LogixType,
        registry: &TypeRegistry,
    ) -> Result<bool, L5xError> {
        self.set_member_observed_with(path, value, registry, &mut |_: &str| {})
    }

    fn set_member_observed(
        &self,
        path: &str,
        value: &LogixType,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        self.set_member_observed_with(path, value, TypeRegistry::builtin(), observer)
    }

    fn set_member_observed_with(
        &self,
        path: &str,
        value: &LogixType,
        registry: &TypeRegistry,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let (current, readable) = writable_value(self.element(), registry)?;
        let mut root = Member::new(&self.name()?, current);
        let changed = root.set_member(path, value, observer)?;
        if !changed && readable {
            return Ok(false);
        }
        write_data(self.element(), Self::DATA_ELEMENT, root.value())?;
        Ok(true)
    }
}

/// The value a setter starts from, and whether it was read from the data.
///
/// Data that cannot be read (none at all, `L5K` only or an unknown format)
/// falls back to a default of the declared `DataType`, so a set keeps the
/// declared kind. Alias tags have no data of their own and are refused.
fn writable_value(element: &Element, registry: &TypeRegistry) -> Result<(LogixType, bool), L5xError> {
    if get_value::<TagType>(element, "TagType")? == Some(TagType::Alias) {
        return Err(L5xError::Unsupported {
            element: element.name(),
            detail: format!(
                "alias '{}' has no data of its own",
                element.attribute("Name").unwrap_or_default()
            ),
        });
    }
    let current = registry.deserialize(element)?;
    if !current.is_null() {
        return Ok((current, true));
    }
    Ok((declared_value(element, registry)?.unwrap_or(LogixType::Null), false))
}

/// A default value of the declared `DataType`, `Dimensions` and `Radix`, or
/// `None` when the type is not declared or not known to `registry`.
fn declared_value(element: &Element, registry: &TypeRegistry) -> Result<Option<LogixType>, L5xError> {
    let Some(data_type) = element.attribute("DataType") else {
        return Ok(None);
    };
    let Some(value) = registry.instantiate(&data_type) else {
        return Ok(None);
    };
    let value = match (value, get_value::<Radix>(element, "Radix")?) {
        (LogixType::Atomic(atomic), Some(radix)) if radix.supports(atomic.kind()) => {
            LogixType::Atomic(atomic.with_radix(radix)?)
        }
        (value, _) => value,
    };
    let dimensions: Dimensions = get_value(element, "Dimensions")?.unwrap_or_default();
    if dimensions.is_empty() {
        Ok(Some(value))
    } else {
        Ok(Some(LogixType::Array(ArrayType::filled(dimensions, &value)?)))
    }
}

/// Checks a value set over unreadable data against the declared slot: same
/// kind as the declared default, or the same type name when the declared type
/// is unknown.
fn check_declared_type(element: &Element, slot: &LogixType, value: &LogixType) -> Result<(), L5xError> {
    let mismatch = |expected: String| L5xError::TypeMismatch {
        expected,
        found: value.type_name(),
    };
    if !slot.is_null() {
        if discriminant(slot) != discriminant(value) {
            return Err(mismatch(slot.type_name()));
        }
        return Ok(());
    }
    let Some(declared) = element.attribute("DataType") else {
        return Ok(());
    };
    let found = match value {
        LogixType::Array(array) => array.data_type().to_string(),
        other => other.type_name(),
    };
    if !names_equal(&declared, &found) {
        return Err(mismatch(declared));
    }
    Ok(())
}

impl LogixTag for Tag {
    const DATA_ELEMENT: &'static str = "Data";
}

impl LogixTag for LocalTag {
    const DATA_ELEMENT: &'static str = "DefaultData";
}

impl LogixTag for Parameter {
    const DATA_ELEMENT: &'static str = "DefaultData";
}

/// Writes `DataType`, `Dimensions` and `Radix` describing `value`.
fn write_type_attributes(element: &Element, value: &LogixType) {
    if value.is_null() {
        return;
    }
    element.set_attribute("DataType", value.type_name());
    match value {
        LogixType::Array(array) => {
            element.set_attribute("Dimensions", array.dimensions().to_string());
            match array.at(0).and_then(LogixType::as_atomic) {
                Some(first) => element.set_attribute("Radix", first.radix().as_str()),
                None => {
                    element.remove_attribute("Radix");
                }
            }
        }
        LogixType::Atomic(atomic) => {
            element.remove_attribute("Dimensions");
            element.set_attribute("Radix", atomic.radix().as_str());
        }
        _ => {
            element.remove_attribute("Dimensions");
            element.remove_attribute("Radix");
        }
    }
}

/// Replaces every `data_element` child of `element` with the serialized
/// `value`, keeping the position of the first one.
pub(crate) fn write_data(element: &Element, data_element: &str, value: &LogixType) -> Result<(), L5xError> {
    let existing = element.elements_named(data_element);
    let replacement = serialize_data(value, data_element)?;
    match (existing.first(), replacement) {
        (Some(first), Some(new)) => {
            first.add_before_self(new)?;
        }
        (None, Some(new)) => {
            element.append(new);
        }
        (_, None) => {}
    }
    for old in &existing {
        old.remove();
    }
    debug!(
        "Rewrote {} data of <{}> '{}'",
        data_element,
        element.name(),
        element.attribute("Name").unwrap_or_default()
    );
    Ok(())
}

/// A component node with the type attributes and data of `value`.
fn tag_element(
    element_name: &str,
    data_element: &str,
    name: &str,
    value: &LogixType,
) -> Result<Element, L5xError> {
    if value.is_null() {
        return Err(L5xError::InvalidArgument("a new tag requires a value"));
    }
    let element = new_component(element_name, name)?;
    element.set_attribute("TagType", TagType::Base.as_str());
    write_type_attributes(&element, value);
    write_data(&element, data_element, value)?;
    Ok(element)
}

impl Tag {
    /// A base tag holding `value`.
    pub fn new(name: &str, value: &LogixType) -> Result<Tag, L5xError> {
        let element = tag_element(Self::ELEMENT, Self::DATA_ELEMENT, name, value)?;
        element.set_attribute("Constant", "false");
        element.set_attribute("ExternalAccess", ExternalAccess::ReadWrite.as_str());
        Tag::deserialize(element)
    }

    /// An alias tag referring to `target` (e.g. `Local:1:I.Data.0`).
    pub fn alias(name: &str, target: &str) -> Result<Tag, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("TagType", TagType::Alias.as_str())
            .with_attribute("AliasFor", target);
        Tag::deserialize(element)
    }

    pub fn tag_type(&self) -> Result<Option<TagType>, L5xError> {
        self.get_value("TagType")
    }

    pub fn constant(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Constant")?.unwrap_or(false))
    }

    pub fn set_constant(&self, constant: bool) {
        self.set_value("Constant", Some(&constant))
    }

    pub fn usage(&self) -> Result<Option<TagUsage>, L5xError> {
        self.get_value("Usage")
    }

    pub fn set_usage(&self, usage: Option<TagUsage>) {
        self.set_value("Usage", usage.as_ref())
    }

    pub fn alias_for(&self) -> Result<Option<String>, L5xError> {
        self.get_value("AliasFor")
    }

    /// Scope of the tag: the program name, or `None` for controller tags
    /// and detached tags.
    pub fn scope(&self) -> Option<String> {
        let program = self.element().parent()?.parent()?;
        if program.is_named("Program") {
            program.attribute("Name")
        } else {
            None
        }
    }
}

impl LocalTag {
    pub fn new(name: &str, value: &LogixType) -> Result<LocalTag, L5xError> {
        let element = new_component(Self::ELEMENT, name)?;
        write_type_attributes(&element, value);
        element.set_attribute("ExternalAccess", ExternalAccess::ReadWrite.as_str());
        write_data(&element, Self::DATA_ELEMENT, value)?;
        LocalTag::deserialize(element)
    }
}

impl Parameter {
    /// A parameter of the given usage. `InOut` parameters are references and
    /// carry no default data.
    pub fn new(name: &str, usage: TagUsage, value: &LogixType) -> Result<Parameter, L5xError> {
        let element = if usage == TagUsage::InOut {
            let element = new_component(Self::ELEMENT, name)?;
            element.set_attribute("TagType", TagType::Base.as_str());
            write_type_attributes(&element, value);
            element
        } else {
            tag_element(Self::ELEMENT, Self::DATA_ELEMENT, name, value)?
        };
        element.set_attribute("Usage", usage.as_str());
        element.set_attribute("Required", (usage != TagUsage::Output).to_string());
        element.set_attribute("Visible", "true");
        Parameter::deserialize(element)
    }

    pub fn usage(&self) -> Result<TagUsage, L5xError> {
        self.get_required_value("Usage")
    }

    pub fn required(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Required")?.unwrap_or(false))
    }

    pub fn set_required(&self, required: bool) {
        self.set_value("Required", Some(&required))
    }

    pub fn visible(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Visible")?.unwrap_or(false))
    }

    pub fn set_visible(&self, visible: bool) {
        self.set_value("Visible", Some(&visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AtomicType, StringType};

    fn counter_tag() -> Tag {
        let element = Element::parse(
            r#"<Tag Name="Parts" TagType="Base" DataType="COUNTER" Constant="false" ExternalAccess="Read/Write">
                 <Description><![CDATA[Part counter]]></Description>
                 <Data Format="L5K"><![CDATA[[0,5,0]]]></Data>
                 <Data Format="Decorated">
                   <Structure DataType="COUNTER">
                     <DataValueMember Name="PRE" DataType="DINT" Radix="Decimal" Value="5"/>
                     <DataValueMember Name="ACC" DataType="DINT" Radix="Decimal" Value="0"/>
                   </Structure>
                 </Data>
               </Tag>"#,
        )
        .unwrap();
        Tag::deserialize(element).unwrap()
    }

    #[test]
    fn test_new_tag_writes_decorated_data() {
        let tag = Tag::new("Speed", &AtomicType::from_f32(1.5).into()).unwrap();
        assert_eq!(tag.data_type().unwrap(), "REAL");
        assert_eq!(tag.radix().unwrap(), Some(Radix::Float));
        assert_eq!(tag.value().unwrap(), LogixType::from(AtomicType::from_f32(1.5)));
        assert_eq!(tag.external_access().unwrap(), Some(ExternalAccess::ReadWrite));
        assert!(!tag.constant().unwrap());
    }

    #[test]
    fn test_new_tag_rejects_bad_name() {
        let value = AtomicType::from_i32(0).into();
        assert!(matches!(Tag::new("1st", &value), Err(L5xError::InvalidName { .. })));
    }

    #[test]
    fn test_value_merges_predefined_template() {
        let tag = counter_tag();
        let value = tag.value().unwrap();
        assert_eq!(value.members().len(), 7);
        assert_eq!(
            tag.member("pre").unwrap().map(Member::into_value),
            Some(AtomicType::from_i32(5).into())
        );
    }

    #[test]
    fn test_set_member_rewrites_data_and_drops_l5k() {
        let tag = counter_tag();
        assert!(tag.set_member("ACC", &AtomicType::from_i16(3).into()).unwrap());
        let data = tag.element().elements_named("Data");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].attribute("Format").as_deref(), Some("Decorated"));
        assert_eq!(
            tag.member("ACC").unwrap().map(Member::into_value),
            Some(AtomicType::from_i32(3).into())
        );
        // Description stays first.
        assert_eq!(tag.element().first_element().unwrap().name(), "Description");
    }

    #[test]
    fn test_unchanged_set_leaves_document_alone() {
        let tag = counter_tag();
        let before = tag.element().deep_clone();
        assert!(!tag.set_member("PRE", &AtomicType::from_i32(5).into()).unwrap());
        assert_eq!(tag.element(), &before);
    }

    #[test]
    fn test_set_data_rejects_mismatched_kind() {
        let tag = counter_tag();
        let err = tag.set_data(&AtomicType::from_i32(1).into()).unwrap_err();
        assert!(matches!(err, L5xError::TypeMismatch { .. }));
    }

    #[test]
    fn test_observer_sees_tag_level_change() {
        let tag = Tag::new("Msg", &StringType::new("a").into()).unwrap();
        let mut seen = Vec::new();
        let mut observer = |path: &str| seen.push(path.to_string());
        tag.set_data_observed(&StringType::new("b").into(), &mut observer).unwrap();
        assert_eq!(seen, ["Msg"]);
        assert_eq!(tag.value().unwrap().as_string().map(StringType::text), Some("b"));
    }

    #[test]
    fn test_alias_tag_has_no_value() {
        let tag = Tag::alias("Start", "Local:1:I.Data.0").unwrap();
        assert_eq!(tag.tag_type().unwrap(), Some(TagType::Alias));
        assert_eq!(tag.alias_for().unwrap().as_deref(), Some("Local:1:I.Data.0"));
        assert!(tag.value().unwrap().is_null());
    }

    #[test]
    fn test_set_on_alias_is_refused() {
        let tag = Tag::alias("Start", "Local:1:I.Data.0").unwrap();
        let err = tag.set_data(&AtomicType::from_bool(true).into()).unwrap_err();
        assert!(matches!(err, L5xError::Unsupported { .. }));
        assert!(tag.element().element("Data").is_none());
        assert!(!tag.element().has_attribute("DataType"));
    }

    #[test]
    fn test_unreadable_data_keeps_declared_kind() {
        let element = Element::parse(
            r#"<Tag Name="Delay" TagType="Base" DataType="TIMER"><Data Format="L5K"><![CDATA[[0,0,0]]]></Data></Tag>"#,
        )
        .unwrap();
        let tag = Tag::deserialize(element).unwrap();
        assert!(matches!(
            tag.set_data(&StringType::new("soon").into()),
            Err(L5xError::TypeMismatch { .. })
        ));
        assert_eq!(tag.data_type().unwrap(), "TIMER");

        assert!(tag.set_member("PRE", &AtomicType::from_i32(250).into()).unwrap());
        assert_eq!(tag.value().unwrap().members().len(), 5);
        assert_eq!(
            tag.member("PRE").unwrap().map(Member::into_value),
            Some(AtomicType::from_i32(250).into())
        );
    }

    #[test]
    fn test_unknown_declared_type_must_match() {
        let element = Element::parse(r#"<Tag Name="Recipe" TagType="Base" DataType="Batch"/>"#).unwrap();
        let tag = Tag::deserialize(element).unwrap();
        let err = tag.set_data(&AtomicType::from_i32(1).into()).unwrap_err();
        assert!(matches!(err, L5xError::TypeMismatch { ref expected, .. } if expected == "Batch"));
        assert!(tag.element().element("Data").is_none());
    }

    #[test]
    fn test_set_with_registry_enforces_string_capacity() {
        let mut registry = TypeRegistry::default();
        registry
            .register(StringType::with_type("STRING_4", 4, "").unwrap().into())
            .unwrap();
        let tag = Tag::new("Code", &StringType::with_type("STRING_4", 4, "AB").unwrap().into()).unwrap();

        assert!(matches!(
            tag.set_data_with(&StringType::new("ABCDE").into(), &registry),
            Err(L5xError::ValueOutOfRange { .. })
        ));
        assert!(tag.set_data_with(&StringType::new("ABCD").into(), &registry).unwrap());
        let value = tag.value_with(&registry).unwrap();
        assert_eq!(value.as_string().map(StringType::capacity), Some(4));
        assert_eq!(value.as_string().map(StringType::text), Some("ABCD"));
    }

    #[test]
    fn test_parameter_uses_default_data() {
        let parameter = Parameter::new("Setpoint", TagUsage::Input, &AtomicType::from_f32(0.0).into()).unwrap();
        assert!(parameter.element().element("DefaultData").is_some());
        assert_eq!(parameter.usage().unwrap(), TagUsage::Input);
        assert!(parameter.required().unwrap());
        let in_out = Parameter::new("Ref", TagUsage::InOut, &AtomicType::from_i32(0).into()).unwrap();
        assert!(in_out.value().unwrap().is_null());
        assert_eq!(in_out.data_type().unwrap(), "DINT");
    }
}
