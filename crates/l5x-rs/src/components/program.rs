// crates/l5x-rs/src/components/program.rs

use super::{Routine, Tag, component_type, new_component};
use crate::component::LogixComponent;
use crate::container::LogixContainer;
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::ProgramType;
use crate::xml::Element;

component_type! {
    /// A program: scoped tags plus the routines that use them.
    Program => "Program" in "Programs"
}

impl Program {
    pub fn new(name: &str) -> Result<Program, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("Type", ProgramType::Normal.as_str())
            .with_attribute("TestEdits", "false")
            .with_attribute("Disabled", "false")
            .with_attribute("UseAsFolder", "false")
            .with_child(Element::new(Tag::CONTAINER))
            .with_child(Element::new(Routine::CONTAINER));
        Program::deserialize(element)
    }

    pub fn program_type(&self) -> Result<ProgramType, L5xError> {
        Ok(self.get_value("Type")?.unwrap_or(ProgramType::Normal))
    }

    pub fn test_edits(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("TestEdits")?.unwrap_or(false))
    }

    pub fn main_routine_name(&self) -> Result<Option<String>, L5xError> {
        self.get_value("MainRoutineName")
    }

    pub fn set_main_routine_name(&self, name: Option<&str>) {
        let name = name.map(str::to_string);
        self.set_value("MainRoutineName", name.as_ref())
    }

    pub fn fault_routine_name(&self) -> Result<Option<String>, L5xError> {
        self.get_value("FaultRoutineName")
    }

    pub fn set_fault_routine_name(&self, name: Option<&str>) {
        let name = name.map(str::to_string);
        self.set_value("FaultRoutineName", name.as_ref())
    }

    pub fn disabled(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Disabled")?.unwrap_or(false))
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.set_value("Disabled", Some(&disabled))
    }

    pub fn use_as_folder(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("UseAsFolder")?.unwrap_or(false))
    }

    pub fn tags(&self) -> Result<LogixContainer<Tag>, L5xError> {
        self.get_container()
    }

    pub fn set_tags(&self, tags: &LogixContainer<Tag>) -> Result<(), L5xError> {
        self.set_container(tags)
    }

    pub fn routines(&self) -> Result<LogixContainer<Routine>, L5xError> {
        self.get_container()
    }

    pub fn set_routines(&self, routines: &LogixContainer<Routine>) -> Result<(), L5xError> {
        self.set_container(routines)
    }

    /// The routine named by `MainRoutineName`, if both exist.
    pub fn main_routine(&self) -> Result<Option<Routine>, L5xError> {
        match self.main_routine_name()? {
            Some(name) => self.routines()?.find(&name),
            None => Ok(None),
        }
    }
}
