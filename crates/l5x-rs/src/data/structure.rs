// crates/l5x-rs/src/data/structure.rs

use super::{LogixType, Member};
use crate::component::names_equal;
use crate::error::L5xError;

/// A named structure with ordered members.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureType {
    name: String,
    members: Vec<Member>,
}

impl StructureType {
    /// Builds a structure, rejecting duplicate member names.
    pub fn new(name: &str, members: Vec<Member>) -> Result<StructureType, L5xError> {
        let mut structure = StructureType {
            name: name.to_string(),
            members: Vec::with_capacity(members.len()),
        };
        for member in members {
            structure.add_member(member)?;
        }
        Ok(structure)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<Member> {
        &mut self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| names_equal(m.name(), name))
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), L5xError> {
        if self.member(member.name()).is_some() {
            return Err(L5xError::NameCollision {
                name: member.name().to_string(),
                container: self.name.clone(),
            });
        }
        self.members.push(member);
        Ok(())
    }

    /// The value of member `name`.
    pub fn get(&self, name: &str) -> Option<&LogixType> {
        self.member(name).map(Member::value)
    }
}
