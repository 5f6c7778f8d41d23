// crates/l5x-rs/src/content.rs

//! The document façade: loading, saving and typed access to an L5X project.

use crate::component::{LogixComponent, names_equal};
use crate::components::{AddOnInstruction, Controller, DataType, Module, Program, Tag, Task};
use crate::config::SaveOptions;
use crate::container::LogixContainer;
use crate::data::TypeRegistry;
use crate::element::{LogixElement, expect_element};
use crate::error::L5xError;
use crate::values::{L5xValue, LogixDateTime, Revision};
use crate::xml::{self, Element};
use log::debug;
use std::fs;
use std::path::Path;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Options Logix Designer writes for a full project export.
const DEFAULT_EXPORT_OPTIONS: &str =
    "NoRawData L5KData DecoratedData ForceProtectedEncoding AllProjDocTrans";

/// An L5X document rooted at `RSLogix5000Content`.
///
/// Every accessor reads through to the element tree, so edits made through
/// any component handle are part of the next [`L5X::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct L5X {
    root: Element,
}

impl LogixElement for L5X {
    const ELEMENT: &'static str = "RSLogix5000Content";

    fn element(&self) -> &Element {
        &self.root
    }

    fn deserialize(element: Element) -> Result<Self, L5xError> {
        expect_element(&element, Self::ELEMENT)?;
        if element.element(Controller::ELEMENT).is_none() {
            return Err(L5xError::MissingElement {
                element: element.name(),
                child: Controller::ELEMENT.to_string(),
            });
        }
        Ok(L5X { root: element })
    }
}

fn format_software_revision(revision: Revision) -> String {
    format!("{}.{:02}", revision.major, revision.minor)
}

fn now() -> LogixDateTime {
    let now = OffsetDateTime::now_utc();
    LogixDateTime(PrimitiveDateTime::new(now.date(), now.time()))
}

impl L5X {
    /// A new project containing an empty controller.
    pub fn new(controller: &str, processor_type: &str, revision: Revision) -> Result<L5X, L5xError> {
        let controller = Controller::new(controller, processor_type, revision)?;
        let root = Element::new(Self::ELEMENT)
            .with_attribute("SchemaRevision", "1.0")
            .with_attribute("SoftwareRevision", format_software_revision(revision))
            .with_attribute("TargetName", controller.name()?)
            .with_attribute("TargetType", "Controller")
            .with_attribute("ContainsContext", "false")
            .with_attribute("ExportDate", now().to_l5x())
            .with_attribute("ExportOptions", DEFAULT_EXPORT_OPTIONS);
        root.append(controller.serialize());
        L5X::deserialize(root)
    }

    /// Parses L5X text.
    pub fn parse(xml: &str) -> Result<L5X, L5xError> {
        let content = L5X::deserialize(xml::parse(xml)?)?;
        debug!(
            "Parsed L5X content for target '{}'",
            content.target_name()?.unwrap_or_default()
        );
        Ok(content)
    }

    /// Reads and parses an L5X file.
    pub fn load(path: impl AsRef<Path>) -> Result<L5X, L5xError> {
        let path = path.as_ref();
        debug!("Loading L5X file {}", path.display());
        let xml = fs::read_to_string(path)?;
        L5X::parse(&xml)
    }

    /// Writes the document with the default [`SaveOptions`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), L5xError> {
        self.save_with(path, &SaveOptions::default())
    }

    pub fn save_with(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<(), L5xError> {
        let path = path.as_ref();
        let xml = self.to_xml_string_with(options)?;
        fs::write(path, xml)?;
        debug!("Saved L5X file {}", path.display());
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String, L5xError> {
        self.to_xml_string_with(&SaveOptions::default())
    }

    pub fn to_xml_string_with(&self, options: &SaveOptions) -> Result<String, L5xError> {
        xml::write(&self.root, options)
    }

    // --- Root attributes ---

    pub fn schema_revision(&self) -> Result<Option<String>, L5xError> {
        self.get_value("SchemaRevision")
    }

    /// Version of the software that exported the file.
    pub fn software_revision(&self) -> Result<Option<Revision>, L5xError> {
        self.get_value("SoftwareRevision")
    }

    pub fn set_software_revision(&self, revision: Revision) {
        self.set_value("SoftwareRevision", Some(&format_software_revision(revision)))
    }

    /// Name of the exported component; the controller name for project exports.
    pub fn target_name(&self) -> Result<Option<String>, L5xError> {
        self.get_value("TargetName")
    }

    /// Kind of the exported component, e.g. `Controller` or `AddOnInstructionDefinition`.
    pub fn target_type(&self) -> Result<Option<String>, L5xError> {
        self.get_value("TargetType")
    }

    /// Whether the controller is only present as context for a partial export.
    pub fn contains_context(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("ContainsContext")?.unwrap_or(false))
    }

    pub fn export_date(&self) -> Result<Option<LogixDateTime>, L5xError> {
        self.get_value("ExportDate")
    }

    pub fn set_export_date(&self, date: Option<LogixDateTime>) {
        self.set_value("ExportDate", date.as_ref())
    }

    pub fn export_options(&self) -> Result<Vec<String>, L5xError> {
        let options: Option<String> = self.get_value("ExportOptions")?;
        Ok(options
            .map(|o| o.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }

    // --- Controller content ---

    pub fn controller(&self) -> Result<Controller, L5xError> {
        let element = self
            .root
            .element(Controller::ELEMENT)
            .ok_or_else(|| L5xError::MissingElement {
                element: Self::ELEMENT.to_string(),
                child: Controller::ELEMENT.to_string(),
            })?;
        Controller::deserialize(element)
    }

    pub fn data_types(&self) -> Result<LogixContainer<DataType>, L5xError> {
        self.controller()?.data_types()
    }

    pub fn modules(&self) -> Result<LogixContainer<Module>, L5xError> {
        self.controller()?.modules()
    }

    pub fn add_on_instructions(&self) -> Result<LogixContainer<AddOnInstruction>, L5xError> {
        self.controller()?.add_on_instructions()
    }

    /// Controller scoped tags.
    pub fn tags(&self) -> Result<LogixContainer<Tag>, L5xError> {
        self.controller()?.tags()
    }

    pub fn programs(&self) -> Result<LogixContainer<Program>, L5xError> {
        self.controller()?.programs()
    }

    pub fn tasks(&self) -> Result<LogixContainer<Task>, L5xError> {
        self.controller()?.tasks()
    }

    /// Tags visible in `program` scope, or controller scope for `None`.
    pub fn tags_in_scope(&self, program: Option<&str>) -> Result<LogixContainer<Tag>, L5xError> {
        match program {
            None => self.tags(),
            Some(name) => self
                .programs()?
                .find(name)?
                .ok_or_else(|| L5xError::NotFound {
                    name: name.to_string(),
                    container: Program::CONTAINER.to_string(),
                })?
                .tags(),
        }
    }

    /// The first component of kind `T` named `name` anywhere in the
    /// document, controller scope before program scope.
    pub fn find<T: LogixComponent>(&self, name: &str) -> Result<Option<T>, L5xError> {
        let found = self.root.descendants().into_iter().find(|e| {
            e.is_named(T::ELEMENT)
                && e.parent().is_some_and(|p| p.is_named(T::CONTAINER))
                && e.attribute("Name").is_some_and(|n| names_equal(&n, name))
        });
        found.map(T::deserialize).transpose()
    }

    /// Every component of kind `T` in document order.
    pub fn find_all<T: LogixComponent>(&self) -> Result<Vec<T>, L5xError> {
        self.root
            .descendants()
            .into_iter()
            .filter(|e| e.is_named(T::ELEMENT) && e.parent().is_some_and(|p| p.is_named(T::CONTAINER)))
            .map(T::deserialize)
            .collect()
    }

    /// Built-in types plus the templates of the project's user-defined types.
    pub fn type_registry(&self) -> Result<TypeRegistry, L5xError> {
        self.controller()?.type_registry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LogixTag;
    use crate::data::{AtomicType, LogixType};

    #[test]
    fn test_new_project_round_trips() {
        let content = L5X::new("Plant", "1756-L83E", Revision::new(33, 1)).unwrap();
        assert_eq!(content.target_name().unwrap().as_deref(), Some("Plant"));
        assert_eq!(content.target_type().unwrap().as_deref(), Some("Controller"));
        assert_eq!(
            content.element().attribute("SoftwareRevision").as_deref(),
            Some("33.01")
        );
        assert_eq!(content.software_revision().unwrap(), Some(Revision::new(33, 1)));
        assert!(content.export_date().unwrap().is_some());
        assert!(content.export_options().unwrap().contains(&"DecoratedData".to_string()));

        content
            .tags()
            .unwrap()
            .add(&Tag::new("Count", &AtomicType::from_i32(7).into()).unwrap())
            .unwrap();
        let reparsed = L5X::parse(&content.to_xml_string().unwrap()).unwrap();
        assert_eq!(reparsed, content);
        assert_eq!(
            reparsed.tags().unwrap().get("Count").unwrap().value().unwrap(),
            LogixType::from(AtomicType::from_i32(7))
        );
    }

    #[test]
    fn test_wrong_root() {
        assert!(matches!(
            L5X::parse("<Controller Name=\"X\"/>"),
            Err(L5xError::Unsupported { .. })
        ));
        assert!(matches!(
            L5X::parse("<RSLogix5000Content/>"),
            Err(L5xError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_find_across_scopes() {
        let content = L5X::new("Plant", "1756-L83E", Revision::new(33, 0)).unwrap();
        let program = Program::new("Filler").unwrap();
        program
            .tags()
            .unwrap()
            .add(&Tag::new("Level", &AtomicType::from_f32(0.0).into()).unwrap())
            .unwrap();
        content.programs().unwrap().add(&program).unwrap();

        let level: Tag = content.find("level").unwrap().unwrap();
        assert_eq!(level.scope().as_deref(), Some("Filler"));
        assert!(content.find::<Tag>("Missing").unwrap().is_none());
        assert_eq!(content.find_all::<Tag>().unwrap().len(), 1);
        assert_eq!(content.tags_in_scope(Some("Filler")).unwrap().count(), 1);
        assert!(content.tags_in_scope(None).unwrap().is_empty());
        assert!(matches!(
            content.tags_in_scope(Some("Nope")),
            Err(L5xError::NotFound { .. })
        ));
    }
}
