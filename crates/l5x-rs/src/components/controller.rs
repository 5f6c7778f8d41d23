// crates/l5x-rs/src/components/controller.rs

use super::{AddOnInstruction, DataType, Module, Program, Tag, Task, element_type};
use crate::component::{LogixComponent, validate_name};
use crate::container::LogixContainer;
use crate::data::TypeRegistry;
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::{LogixDateTime, Revision};
use crate::xml::Element;
use log::{debug, warn};

element_type! {
    /// The controller: owner of every top level container in a project.
    Controller => "Controller"
}

impl Controller {
    /// An empty controller with every container present.
    pub fn new(name: &str, processor_type: &str, revision: Revision) -> Result<Controller, L5xError> {
        validate_name(name)?;
        let element = Element::new(Self::ELEMENT)
            .with_attribute("Use", "Target")
            .with_attribute("Name", name)
            .with_attribute("ProcessorType", processor_type)
            .with_attribute("MajorRev", revision.major.to_string())
            .with_attribute("MinorRev", revision.minor.to_string());
        for container in [
            DataType::CONTAINER,
            Module::CONTAINER,
            AddOnInstruction::CONTAINER,
            Tag::CONTAINER,
            Program::CONTAINER,
            Task::CONTAINER,
        ] {
            element.append(Element::new(container));
        }
        Controller::deserialize(element)
    }

    pub fn name(&self) -> Result<String, L5xError> {
        self.get_required_value("Name")
    }

    pub fn set_name(&self, name: &str) -> Result<(), L5xError> {
        validate_name(name)?;
        self.set_value("Name", Some(&name.to_string()));
        Ok(())
    }

    /// Catalog number of the processor, e.g. `1756-L83E`.
    pub fn processor_type(&self) -> Result<Option<String>, L5xError> {
        self.get_value("ProcessorType")
    }

    pub fn set_processor_type(&self, processor_type: &str) {
        self.set_value("ProcessorType", Some(&processor_type.to_string()))
    }

    /// Firmware revision from `MajorRev`/`MinorRev`.
    pub fn revision(&self) -> Result<Revision, L5xError> {
        Ok(Revision::new(
            self.get_required_value("MajorRev")?,
            self.get_value("MinorRev")?.unwrap_or(0),
        ))
    }

    pub fn set_revision(&self, revision: Revision) {
        self.set_value("MajorRev", Some(&revision.major));
        self.set_value("MinorRev", Some(&revision.minor));
    }

    pub fn project_creation_date(&self) -> Result<Option<LogixDateTime>, L5xError> {
        self.get_value("ProjectCreationDate")
    }

    pub fn last_modified_date(&self) -> Result<Option<LogixDateTime>, L5xError> {
        self.get_value("LastModifiedDate")
    }

    pub fn set_last_modified_date(&self, date: Option<LogixDateTime>) {
        self.set_value("LastModifiedDate", date.as_ref())
    }

    /// Communication path used to go online, e.g. `AB_ETHIP-1\192.168.1.10\Backplane\0`.
    pub fn comm_path(&self) -> Result<Option<String>, L5xError> {
        self.get_value("CommPath")
    }

    pub fn set_comm_path(&self, path: Option<&str>) {
        let path = path.map(str::to_string);
        self.set_value("CommPath", path.as_ref())
    }

    pub fn data_types(&self) -> Result<LogixContainer<DataType>, L5xError> {
        self.get_container()
    }

    pub fn modules(&self) -> Result<LogixContainer<Module>, L5xError> {
        self.get_container()
    }

    pub fn add_on_instructions(&self) -> Result<LogixContainer<AddOnInstruction>, L5xError> {
        self.get_container()
    }

    pub fn tags(&self) -> Result<LogixContainer<Tag>, L5xError> {
        self.get_container()
    }

    pub fn programs(&self) -> Result<LogixContainer<Program>, L5xError> {
        self.get_container()
    }

    pub fn tasks(&self) -> Result<LogixContainer<Task>, L5xError> {
        self.get_container()
    }

    /// The built-in types plus a template for every user-defined type.
    ///
    /// Types are registered once all the types they depend on are known, so
    /// declaration order in the document does not matter. Types that never
    /// resolve (a missing or cyclic dependency) are skipped with a warning.
    pub fn type_registry(&self) -> Result<TypeRegistry, L5xError> {
        let mut registry = TypeRegistry::default();
        let mut pending = self.data_types()?.to_vec()?;
        while !pending.is_empty() {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for data_type in pending {
                if data_type.dependencies()?.iter().all(|d| registry.contains(d)) {
                    let template = data_type.template(&registry)?;
                    registry.register(template)?;
                } else {
                    unresolved.push(data_type);
                }
            }
            if unresolved.len() == before {
                for data_type in &unresolved {
                    warn!(
                        "Data type '{}' has unresolved dependencies and was not registered",
                        data_type.name()?
                    );
                }
                break;
            }
            pending = unresolved;
        }
        debug!("Built type registry with {} types", registry.names().count());
        Ok(registry)
    }
}
