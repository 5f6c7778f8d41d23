// crates/l5x-rs/tests/robustness.rs

//! Error handling and edge cases: malformed documents, missing structure and
//! data the library cannot interpret must produce errors or empty values,
//! never panics.

use l5x_rs::components::{LogixTag, Tag};
use l5x_rs::data::{AtomicType, LogixType, StringType};
use l5x_rs::{L5X, L5xError, LogixComponent, LogixElement};

/// A minimal valid project used as a base for corrupted test cases.
const MINIMAL_VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<RSLogix5000Content SchemaRevision="1.0" SoftwareRevision="33.01" TargetName="Test" TargetType="Controller" ContainsContext="false">
  <Controller Use="Target" Name="Test" ProcessorType="1756-L83E" MajorRev="33" MinorRev="1">
    <DataTypes/>
    <Modules/>
    <AddOnInstructionDefinitions/>
    <Tags>
      <Tag Name="Count" TagType="Base" DataType="DINT" Radix="Decimal" Constant="false" ExternalAccess="Read/Write">
        <Data Format="Decorated">
          <DataValue DataType="DINT" Radix="Decimal" Value="5"/>
        </Data>
      </Tag>
    </Tags>
    <Programs/>
    <Tasks/>
  </Controller>
</RSLogix5000Content>"#;

fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Replaces the `Count` tag of the minimal project with `tag`.
fn with_tag(tag: &str) -> String {
    let start = MINIMAL_VALID_XML.find("<Tag ").unwrap();
    let end = MINIMAL_VALID_XML.find("</Tags>").unwrap();
    format!("{}{}\n    {}", &MINIMAL_VALID_XML[..start], tag, &MINIMAL_VALID_XML[end..])
}

#[test]
fn test_minimal_document_parses() {
    let content = L5X::parse(MINIMAL_VALID_XML).unwrap();
    let count = content.tags().unwrap().get("Count").unwrap();
    assert_eq!(count.value().unwrap(), LogixType::from(AtomicType::from_i32(5)));
}

#[test]
fn test_malformed_xml() {
    let mismatched = MINIMAL_VALID_XML.replace("</Tags>", "</Tagz>");
    assert!(matches!(L5X::parse(&mismatched), Err(L5xError::Xml(_))));

    let truncated = &MINIMAL_VALID_XML[..MINIMAL_VALID_XML.find("<Programs/>").unwrap()];
    assert!(L5X::parse(truncated).is_err());

    assert!(L5X::parse("").is_err());
    assert!(L5X::parse("not xml at all").is_err());
}

#[test]
fn test_unknown_entity() {
    let xml = with_tag(r#"<Tag Name="Bad" DataType="DINT"><Description>&bogus;</Description></Tag>"#);
    assert!(matches!(L5X::parse(&xml), Err(L5xError::Unsupported { .. })));
}

#[test]
fn test_wrong_root_element() {
    let xml = r#"<Project><Controller Name="X"/></Project>"#;
    assert!(matches!(L5X::parse(xml), Err(L5xError::Unsupported { .. })));
}

#[test]
fn test_missing_controller() {
    let xml = r#"<RSLogix5000Content SchemaRevision="1.0"></RSLogix5000Content>"#;
    let err = L5X::parse(xml).unwrap_err();
    assert!(matches!(err, L5xError::MissingElement { ref child, .. } if child == "Controller"));
}

#[test]
fn test_missing_container_is_an_error() {
    let xml = MINIMAL_VALID_XML.replace("<Tasks/>", "");
    let content = L5X::parse(&xml).unwrap();
    assert!(content.tags().is_ok());
    let err = content.tasks().unwrap_err();
    assert!(matches!(err, L5xError::MissingElement { ref child, .. } if child == "Tasks"));
}

#[test]
fn test_invalid_attribute_value() {
    let xml = MINIMAL_VALID_XML.replace(r#"Constant="false""#, r#"Constant="maybe""#);
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Count").unwrap();
    let err = tag.constant().unwrap_err();
    assert!(matches!(
        err,
        L5xError::Conversion { ref property, ref value, .. }
            if property == "Constant" && value == "maybe"
    ));
    // Unrelated properties still read.
    assert_eq!(tag.data_type().unwrap(), "DINT");
}

#[test]
fn test_missing_required_attribute() {
    let xml = with_tag(r#"<Tag TagType="Base" DataType="DINT"/>"#);
    let content = L5X::parse(&xml).unwrap();
    let tag = content.tags().unwrap().at(0).unwrap();
    assert!(matches!(
        tag.name(),
        Err(L5xError::MissingAttribute { ref attribute, .. }) if attribute == "Name"
    ));
}

#[test]
fn test_invalid_atomic_value() {
    let xml = MINIMAL_VALID_XML.replace(r#"Value="5""#, r#"Value="five""#);
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Count").unwrap();
    assert!(tag.value().is_err());
}

#[test]
fn test_unknown_data_format_reads_as_null() {
    init_logger();
    let xml = with_tag(
        r#"<Tag Name="Odd" TagType="Base" DataType="DINT"><Data Format="Mystery">1</Data></Tag>"#,
    );
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Odd").unwrap();
    assert!(tag.value().unwrap().is_null());
}

#[test]
fn test_l5k_only_tag_reads_as_null() {
    let xml = with_tag(
        r#"<Tag Name="Legacy" TagType="Base" DataType="DINT"><Data Format="L5K"><![CDATA[12]]></Data></Tag>"#,
    );
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Legacy").unwrap();
    assert!(tag.value().unwrap().is_null());

    // Setting a value replaces the stale L5K data.
    assert!(tag.set_data(&AtomicType::from_i32(12).into()).unwrap());
    let data = tag.element().elements_named("Data");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].attribute("Format").as_deref(), Some("Decorated"));
}

#[test]
fn test_l5k_only_tag_keeps_declared_type() {
    let xml = with_tag(
        r#"<Tag Name="Legacy" TagType="Base" DataType="DINT"><Data Format="L5K"><![CDATA[12]]></Data></Tag>"#,
    );
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Legacy").unwrap();
    let err = tag.set_data(&StringType::new("hello").into()).unwrap_err();
    assert!(matches!(err, L5xError::TypeMismatch { ref expected, .. } if expected == "DINT"));
    assert_eq!(tag.data_type().unwrap(), "DINT");
    assert_eq!(tag.element().elements_named("Data")[0].attribute("Format").as_deref(), Some("L5K"));

    // Writing the declared value unchanged still replaces the L5K data.
    assert!(tag.set_data(&AtomicType::from_i32(0).into()).unwrap());
    assert_eq!(tag.value().unwrap(), LogixType::from(AtomicType::from_i32(0)));
}

#[test]
fn test_alias_tag_has_no_data_to_set() {
    let xml = with_tag(r#"<Tag Name="Speed" TagType="Alias" AliasFor="Count"/>"#);
    let tag = L5X::parse(&xml).unwrap().tags().unwrap().get("Speed").unwrap();
    assert!(matches!(
        tag.set_data(&AtomicType::from_i32(1).into()),
        Err(L5xError::Unsupported { .. })
    ));
    assert!(tag.element().elements_named("Data").is_empty());
    assert!(!tag.element().has_attribute("DataType"));
}

#[test]
fn test_invalid_names_are_rejected() {
    for name in ["", "9Lives", "has space", "a-b"] {
        assert!(
            matches!(
                Tag::new(name, &AtomicType::from_i32(0).into()),
                Err(L5xError::InvalidName { .. })
            ),
            "{:?} should be rejected",
            name
        );
    }
    let content = L5X::parse(MINIMAL_VALID_XML).unwrap();
    let tag = content.tags().unwrap().get("Count").unwrap();
    assert!(tag.set_name(&"x".repeat(41)).is_err());
    assert_eq!(tag.name().unwrap(), "Count");
}

#[test]
fn test_lookup_failures() {
    let content = L5X::parse(MINIMAL_VALID_XML).unwrap();
    let tags = content.tags().unwrap();
    assert!(matches!(tags.get("Missing"), Err(L5xError::NotFound { .. })));
    assert!(tags.find("Missing").unwrap().is_none());
    assert!(matches!(tags.at(1), Err(L5xError::IndexOutOfRange { index: 1, len: 1 })));
    assert!(content.find::<Tag>("Missing").unwrap().is_none());
}
