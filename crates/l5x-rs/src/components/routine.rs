// crates/l5x-rs/src/components/routine.rs

use super::{component_type, element_type, new_component};
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::{RoutineType, RungType};
use crate::xml::Element;
use log::debug;

component_type! {
    /// A routine: ladder rungs, structured text or a graphical diagram.
    Routine => "Routine" in "Routines"
}

element_type! {
    /// A ladder rung.
    Rung => "Rung"
}

const RLL_CONTENT: &str = "RLLContent";
const ST_CONTENT: &str = "STContent";
const LINE: &str = "Line";

fn content_element(routine_type: RoutineType) -> Option<&'static str> {
    match routine_type {
        RoutineType::Rll => Some(RLL_CONTENT),
        RoutineType::St => Some(ST_CONTENT),
        RoutineType::Fbd => Some("FBDContent"),
        RoutineType::Sfc => Some("SFCContent"),
        RoutineType::Typeless => None,
    }
}

impl Routine {
    /// An empty routine with the content element for its language.
    pub fn new(name: &str, routine_type: RoutineType) -> Result<Routine, L5xError> {
        let element =
            new_component(Self::ELEMENT, name)?.with_attribute("Type", routine_type.as_str());
        if let Some(content) = content_element(routine_type) {
            element.append(Element::new(content));
        }
        Routine::deserialize(element)
    }

    pub fn routine_type(&self) -> Result<RoutineType, L5xError> {
        self.get_required_value("Type")
    }

    fn content(&self, expected: RoutineType) -> Result<Element, L5xError> {
        let routine_type = self.routine_type()?;
        if routine_type != expected {
            return Err(L5xError::TypeMismatch {
                expected: format!("a {} routine", expected),
                found: routine_type.to_string(),
            });
        }
        let name = content_element(expected).unwrap_or(RLL_CONTENT);
        Ok(match self.element().element(name) {
            Some(content) => content,
            None => self.element().append(Element::new(name)),
        })
    }

    /// Ladder rungs in document order. Fails for non-RLL routines.
    pub fn rungs(&self) -> Result<Vec<Rung>, L5xError> {
        self.content(RoutineType::Rll)?
            .elements_named(Rung::ELEMENT)
            .into_iter()
            .map(Rung::deserialize)
            .collect()
    }

    /// Appends a rung and returns it, numbered after the last one.
    pub fn add_rung(&self, text: &str, comment: Option<&str>) -> Result<Rung, L5xError> {
        let content = self.content(RoutineType::Rll)?;
        let number = content.elements_named(Rung::ELEMENT).len() as u32;
        let rung = Rung::new(number, text);
        rung.set_comment(comment);
        let attached = content.append(rung.serialize());
        debug!(
            "Added rung {} to routine '{}'",
            number,
            self.element().attribute("Name").unwrap_or_default()
        );
        Rung::deserialize(attached)
    }

    /// Removes rung `number` and renumbers the rungs after it.
    pub fn remove_rung(&self, number: u32) -> Result<bool, L5xError> {
        let rungs = self.rungs()?;
        let Some(position) = rungs
            .iter()
            .position(|r| r.number().is_ok_and(|n| n == number))
        else {
            return Ok(false);
        };
        rungs[position].element().remove();
        for (index, rung) in rungs.iter().enumerate().skip(position + 1) {
            rung.set_number(index as u32 - 1);
        }
        Ok(true)
    }

    /// Structured text lines in order. Fails for non-ST routines.
    pub fn lines(&self) -> Result<Vec<String>, L5xError> {
        Ok(self
            .content(RoutineType::St)?
            .elements_named(LINE)
            .iter()
            .map(|line| line.text().unwrap_or_default())
            .collect())
    }

    /// Replaces the structured text with `lines`, numbered from zero.
    pub fn set_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<(), L5xError> {
        let content = self.content(RoutineType::St)?;
        content.clear_children();
        for (number, text) in lines.iter().enumerate() {
            let line = Element::new(LINE).with_attribute("Number", number.to_string());
            line.set_cdata(text.as_ref());
            content.append(line);
        }
        Ok(())
    }
}

impl Rung {
    pub fn new(number: u32, text: &str) -> Rung {
        let element = Element::new(Self::ELEMENT)
            .with_attribute("Number", number.to_string())
            .with_attribute("Type", RungType::Normal.as_str());
        let text_element = Element::new("Text");
        text_element.set_cdata(text);
        element.append(text_element);
        Rung { element }
    }

    pub fn number(&self) -> Result<u32, L5xError> {
        self.get_required_value("Number")
    }

    pub fn set_number(&self, number: u32) {
        self.set_value("Number", Some(&number))
    }

    pub fn rung_type(&self) -> Result<RungType, L5xError> {
        Ok(self.get_value("Type")?.unwrap_or(RungType::Normal))
    }

    /// The rung logic in neutral text, e.g. `XIC(Start)OTE(Run);`.
    pub fn text(&self) -> Result<String, L5xError> {
        Ok(self.get_property("Text")?.unwrap_or_default())
    }

    pub fn set_text(&self, text: &str) {
        self.set_property("Text", Some(&text.to_string()))
    }

    pub fn comment(&self) -> Result<Option<String>, L5xError> {
        self.get_property("Comment")
    }

    /// Sets or removes the rung comment; it is kept before the text.
    pub fn set_comment(&self, comment: Option<&str>) {
        match (self.element().element("Comment"), comment) {
            (Some(existing), Some(text)) => existing.set_cdata(text),
            (None, Some(text)) => {
                let element = Element::new("Comment");
                element.set_cdata(text);
                self.element().prepend(element);
            }
            (Some(existing), None) => {
                existing.remove();
            }
            (None, None) => {}
        }
    }
}
