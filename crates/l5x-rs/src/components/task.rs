// crates/l5x-rs/src/components/task.rs

use super::{component_type, new_component};
use crate::component::names_equal;
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::TaskType;
use crate::xml::Element;

component_type! {
    /// A task: the scheduling unit that runs programs.
    Task => "Task" in "Tasks"
}

const SCHEDULED_PROGRAMS: &str = "ScheduledPrograms";
const SCHEDULED_PROGRAM: &str = "ScheduledProgram";

impl Task {
    /// A task with the default priority (10) and watchdog (500 ms).
    /// Periodic tasks start at a 10 ms rate.
    pub fn new(name: &str, task_type: TaskType) -> Result<Task, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("Type", task_type.as_str());
        if task_type == TaskType::Periodic {
            element.set_attribute("Rate", "10");
        }
        element.set_attribute("Priority", "10");
        element.set_attribute("Watchdog", "500");
        element.set_attribute("DisableUpdateOutputs", "false");
        element.set_attribute("InhibitTask", "false");
        element.append(Element::new(SCHEDULED_PROGRAMS));
        Task::deserialize(element)
    }

    pub fn task_type(&self) -> Result<TaskType, L5xError> {
        self.get_required_value("Type")
    }

    pub fn set_task_type(&self, task_type: TaskType) {
        self.set_value("Type", Some(&task_type))
    }

    pub fn priority(&self) -> Result<Option<u8>, L5xError> {
        self.get_value("Priority")
    }

    /// Priorities run from 1 (highest) to 15.
    pub fn set_priority(&self, priority: u8) -> Result<(), L5xError> {
        if !(1..=15).contains(&priority) {
            return Err(L5xError::InvalidArgument("task priority must be between 1 and 15"));
        }
        self.set_value("Priority", Some(&priority));
        Ok(())
    }

    /// Period in milliseconds.
    pub fn rate(&self) -> Result<Option<f64>, L5xError> {
        self.get_value("Rate")
    }

    pub fn set_rate(&self, rate: Option<f64>) {
        self.set_value("Rate", rate.as_ref())
    }

    /// Watchdog in milliseconds.
    pub fn watchdog(&self) -> Result<Option<f64>, L5xError> {
        self.get_value("Watchdog")
    }

    pub fn set_watchdog(&self, watchdog: f64) {
        self.set_value("Watchdog", Some(&watchdog))
    }

    pub fn inhibited(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("InhibitTask")?.unwrap_or(false))
    }

    pub fn set_inhibited(&self, inhibited: bool) {
        self.set_value("InhibitTask", Some(&inhibited))
    }

    pub fn disable_update_outputs(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("DisableUpdateOutputs")?.unwrap_or(false))
    }

    pub fn set_disable_update_outputs(&self, disable: bool) {
        self.set_value("DisableUpdateOutputs", Some(&disable))
    }

    fn scheduled(&self) -> Vec<Element> {
        self.element()
            .element(SCHEDULED_PROGRAMS)
            .map(|list| list.elements_named(SCHEDULED_PROGRAM))
            .unwrap_or_default()
    }

    /// Names of the programs this task runs, in execution order.
    pub fn scheduled_programs(&self) -> Vec<String> {
        self.scheduled()
            .iter()
            .filter_map(|p| p.attribute("Name"))
            .collect()
    }

    pub fn is_scheduled(&self, program: &str) -> bool {
        self.scheduled_programs().iter().any(|p| names_equal(p, program))
    }

    /// Appends `program` to the schedule. Scheduling a program twice is an error.
    pub fn schedule(&self, program: &str) -> Result<(), L5xError> {
        if self.is_scheduled(program) {
            return Err(L5xError::NameCollision {
                name: program.to_string(),
                container: SCHEDULED_PROGRAMS.into(),
            });
        }
        let list = match self.element().element(SCHEDULED_PROGRAMS) {
            Some(list) => list,
            None => self.element().append(Element::new(SCHEDULED_PROGRAMS)),
        };
        list.append(Element::new(SCHEDULED_PROGRAM).with_attribute("Name", program));
        Ok(())
    }

    /// Removes `program` from the schedule; false when it was not scheduled.
    pub fn unschedule(&self, program: &str) -> bool {
        match self
            .scheduled()
            .into_iter()
            .find(|p| p.attribute("Name").is_some_and(|n| names_equal(&n, program)))
        {
            Some(entry) => entry.remove(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_periodic_task() {
        let task = Task::new("Fast", TaskType::Periodic).unwrap();
        assert_eq!(task.task_type().unwrap(), TaskType::Periodic);
        assert_eq!(task.rate().unwrap(), Some(10.0));
        assert_eq!(task.priority().unwrap(), Some(10));
        assert!(!task.inhibited().unwrap());
        assert!(task.scheduled_programs().is_empty());
    }

    #[test]
    fn test_continuous_task_has_no_rate() {
        let task = Task::new("MainTask", TaskType::Continuous).unwrap();
        assert_eq!(task.rate().unwrap(), None);
    }

    #[test]
    fn test_priority_range() {
        let task = Task::new("Fast", TaskType::Periodic).unwrap();
        task.set_priority(1).unwrap();
        assert!(matches!(task.set_priority(16), Err(L5xError::InvalidArgument(_))));
        assert_eq!(task.priority().unwrap(), Some(1));
    }

    #[test]
    fn test_schedule_and_unschedule() {
        let task = Task::new("MainTask", TaskType::Continuous).unwrap();
        task.schedule("MainProgram").unwrap();
        task.schedule("Filler").unwrap();
        assert!(matches!(
            task.schedule("mainprogram"),
            Err(L5xError::NameCollision { .. })
        ));
        assert_eq!(task.scheduled_programs(), ["MainProgram", "Filler"]);
        assert!(task.unschedule("FILLER"));
        assert!(!task.unschedule("Filler"));
        assert_eq!(task.scheduled_programs(), ["MainProgram"]);
    }

    #[test]
    fn test_parsed_task() {
        let element = Element::parse(
            r#"<Task Name="Slow" Type="PERIODIC" Rate="100" Priority="12" Watchdog="500" DisableUpdateOutputs="false" InhibitTask="true">
                 <ScheduledPrograms>
                   <ScheduledProgram Name="Alarms"/>
                 </ScheduledPrograms>
               </Task>"#,
        )
        .unwrap();
        let task = Task::deserialize(element).unwrap();
        assert!(task.inhibited().unwrap());
        assert_eq!(task.rate().unwrap(), Some(100.0));
        assert!(task.is_scheduled("alarms"));
    }
}
