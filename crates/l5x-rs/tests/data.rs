// crates/l5x-rs/tests/data.rs

use l5x_rs::components::{LogixTag, Tag};
use l5x_rs::data::{AtomicType, LogixType, StringType};
use l5x_rs::{L5X, L5xError, LogixElement};
use std::fs;
use std::path::PathBuf;

fn load_test_file(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

fn plant() -> L5X {
    L5X::parse(&load_test_file("Plant.L5X")).expect("Failed to parse Plant.L5X")
}

fn tag(content: &L5X, name: &str) -> Tag {
    content.tags().unwrap().get(name).unwrap()
}

#[test]
fn test_user_structure_without_registry_keeps_parsed_members() {
    let content = plant();
    let filler = tag(&content, "Filler").value().unwrap();
    assert_eq!(filler.type_name(), "Line");
    assert_eq!(filler.members().len(), 3);
    let label = filler.member("Label").unwrap().into_value();
    assert_eq!(label.as_string().map(|s| s.text()), Some("Line 3"));
    assert_eq!(label.as_string().map(|s| s.capacity()), Some(82));
}

#[test]
fn test_user_structure_with_project_registry() {
    let content = plant();
    let registry = content.type_registry().unwrap();
    assert!(registry.contains("Line"));

    let filler = tag(&content, "Filler").value_with(&registry).unwrap();
    assert_eq!(filler.members().len(), 4);
    assert_eq!(
        filler.member("Inlet.Position").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_f32(87.5)))
    );
    assert_eq!(
        filler.member("Inlet.Open").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_bool(true)))
    );
    // Members absent from the data come from the template.
    assert_eq!(
        filler.member("Outlet.Travel.PRE").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_i32(0)))
    );
    assert_eq!(
        filler.member("Counts[2]").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_i32(30)))
    );
    let label = filler.member("Label").unwrap().into_value();
    assert_eq!(label.as_string().map(|s| s.capacity()), Some(20));
}

#[test]
fn test_set_atomic_rewrites_data() {
    let content = plant();
    let count = tag(&content, "Count");
    assert!(count.set_data(&AtomicType::from_i16(7).into()).unwrap());

    let data = count.element().elements_named("Data");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].attribute("Format").as_deref(), Some("Decorated"));
    let value = data[0].first_element().unwrap();
    assert_eq!(value.attribute("DataType").as_deref(), Some("DINT"));
    assert_eq!(value.attribute("Value").as_deref(), Some("7"));
    assert_eq!(count.element().first_element().unwrap().name(), "Description");
    assert_eq!(count.value().unwrap(), LogixType::from(AtomicType::from_i32(7)));
}

#[test]
fn test_set_array_element() {
    let content = plant();
    let speeds = tag(&content, "Speeds");
    assert!(speeds.set_member("[2]", &AtomicType::from_f64(9.25).into()).unwrap());
    let value = speeds.value().unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.at(2), Some(&LogixType::from(AtomicType::from_f32(9.25))));
    assert_eq!(array.at(0), Some(&LogixType::from(AtomicType::from_f32(1.5))));
}

#[test]
fn test_observer_reports_each_level() {
    let content = plant();
    let timer = tag(&content, "CycleTimer");
    let mut seen = Vec::new();
    let mut observer = |path: &str| seen.push(path.to_string());
    timer
        .set_member_observed("PRE", &AtomicType::from_i32(500).into(), &mut observer)
        .unwrap();
    assert_eq!(seen, ["CycleTimer.PRE", "CycleTimer"]);
}

#[test]
fn test_unknown_member_path() {
    let content = plant();
    let timer = tag(&content, "CycleTimer");
    let err = timer
        .set_member("Preset", &AtomicType::from_i32(1).into())
        .unwrap_err();
    assert!(matches!(err, L5xError::NotFound { ref name, .. } if name == "Preset"));
}

#[test]
fn test_rejected_set_leaves_document_untouched() {
    let content = plant();
    let before = content.to_xml_string().unwrap();

    let greeting = tag(&content, "Greeting");
    let too_long = "x".repeat(100);
    assert!(matches!(
        greeting.set_data(&StringType::new(&too_long).into()),
        Err(L5xError::ValueOutOfRange { .. })
    ));
    let count = tag(&content, "Count");
    assert!(matches!(
        count.set_data(&StringType::new("7").into()),
        Err(L5xError::TypeMismatch { .. })
    ));
    assert!(matches!(
        count.set_data(&AtomicType::from_i64(i64::MAX).into()),
        Err(L5xError::ValueOutOfRange { .. })
    ));

    assert_eq!(content.to_xml_string().unwrap(), before);
}

#[test]
fn test_partial_structure_update() {
    let content = plant();
    let filler = tag(&content, "Filler");
    assert!(filler.set_member("Inlet.Position", &AtomicType::from_f32(50.0).into()).unwrap());
    let value = filler.value().unwrap();
    assert_eq!(
        value.member("Inlet.Position").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_f32(50.0)))
    );
    assert_eq!(
        value.member("Inlet.Open").map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_bool(true)))
    );
    assert_eq!(
        value.member("Label").unwrap().into_value().as_string().map(|s| s.text().to_string()),
        Some("Line 3".to_string())
    );
}

#[test]
fn test_alarm_parameters_write_back() {
    let content = plant();
    let alarm = tag(&content, "HighLevel");
    assert!(alarm.set_member("Severity", &StringType::new("500").into()).unwrap());
    let data = alarm.element().element("Data").unwrap();
    assert_eq!(data.attribute("Format").as_deref(), Some("Alarm"));
    let parameters = data.element("AlarmDigitalParameters").unwrap();
    assert_eq!(parameters.attribute("Severity").as_deref(), Some("500"));
    assert_eq!(parameters.attribute("AckRequired").as_deref(), Some("true"));
}

#[test]
fn test_edits_survive_save_and_reload() {
    let content = plant();
    tag(&content, "Count")
        .set_data(&AtomicType::from_i32(1234).into())
        .unwrap();
    tag(&content, "Greeting")
        .set_data(&StringType::new("It's $5").into())
        .unwrap();
    tag(&content, "CycleTimer")
        .set_member("DN", &AtomicType::from_bool(true).into())
        .unwrap();

    let reloaded = L5X::parse(&content.to_xml_string().unwrap()).unwrap();
    assert_eq!(reloaded, content);
    assert_eq!(
        tag(&reloaded, "Count").value().unwrap(),
        LogixType::from(AtomicType::from_i32(1234))
    );
    let greeting = tag(&reloaded, "Greeting").value().unwrap();
    assert_eq!(greeting.as_string().map(|s| s.text()), Some("It's $5"));
    assert_eq!(
        tag(&reloaded, "CycleTimer").member("DN").unwrap().map(|m| m.into_value()),
        Some(LogixType::from(AtomicType::from_bool(true)))
    );
}

#[test]
fn test_latin1_text_survives_save_and_reload() {
    let content = plant();
    tag(&content, "Greeting")
        .set_data(&StringType::new("Café").into())
        .unwrap();
    let written = content.to_xml_string().unwrap();
    assert!(written.contains("'Caf$E9'"));

    let reloaded = L5X::parse(&written).unwrap();
    let greeting = tag(&reloaded, "Greeting").value().unwrap();
    assert_eq!(greeting.as_string().map(|s| s.text()), Some("Café"));
    assert_eq!(greeting.as_string().map(|s| s.len()), Some(4));
}

#[test]
fn test_project_registry_enforces_user_string_capacity() {
    let content = plant();
    let registry = content.type_registry().unwrap();
    let filler = tag(&content, "Filler");

    assert!(matches!(
        filler.set_member_with("Label", &StringType::new(&"x".repeat(21)).into(), &registry),
        Err(L5xError::ValueOutOfRange { .. })
    ));
    assert!(filler
        .set_member_with("Label", &StringType::new(&"x".repeat(20)).into(), &registry)
        .unwrap());
    let label = filler.value_with(&registry).unwrap().member("Label").unwrap().into_value();
    assert_eq!(label.as_string().map(|s| s.capacity()), Some(20));
}
