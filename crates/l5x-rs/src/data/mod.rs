// crates/l5x-rs/src/data/mod.rs

//! Tag data values.
//!
//! A [`LogixType`] is a value tree: atomics at the leaves; arrays, structures
//! and strings as interior nodes. Values are immutable. Setting a value into
//! a slot produces a new tree; [`Member::set`] swaps it in and reports whether
//! anything changed, notifying a [`ChangeObserver`] once per changed level.
//!
//! Reading values from `Data` elements is the job of [`TypeRegistry::deserialize`];
//! writing them back is the job of [`serialize_data`].

mod array;
mod atomic;
mod radix;
mod registry;
mod string;
mod structure;
mod writer;

pub use array::ArrayType;
pub use atomic::{AtomicKind, AtomicType, AtomicValue};
pub use radix::Radix;
pub use registry::{DataFormat, TypeRegistry};
pub use string::StringType;
pub use structure::StructureType;
pub use writer::{serialize_data, serialize_value};

use crate::component::names_equal;
use crate::error::L5xError;
use std::borrow::Cow;

/// A data value of any Logix type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LogixType {
    /// No data, e.g. an alias tag or a tag whose data was never exported.
    #[default]
    Null,
    Atomic(AtomicType),
    Array(ArrayType),
    Structure(StructureType),
    String(StringType),
}

impl LogixType {
    /// Data type name: the atomic kind, structure or string type name, or
    /// the element type for arrays.
    pub fn type_name(&self) -> String {
        match self {
            LogixType::Null => "NULL".to_string(),
            LogixType::Atomic(a) => a.kind().to_string(),
            LogixType::Array(a) => a.data_type().to_string(),
            LogixType::Structure(s) => s.name().to_string(),
            LogixType::String(s) => s.name().to_string(),
        }
    }

    fn describe(&self) -> String {
        match self {
            LogixType::Array(a) => format!("{}[{}]", a.data_type(), a.len()),
            other => other.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogixType::Null)
    }

    pub fn as_atomic(&self) -> Option<&AtomicType> {
        match self {
            LogixType::Atomic(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            LogixType::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureType> {
        match self {
            LogixType::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringType> {
        match self {
            LogixType::String(s) => Some(s),
            _ => None,
        }
    }

    /// Direct members. Strings synthesize `LEN` and `DATA`; atomics have none.
    pub fn members(&self) -> Cow<'_, [Member]> {
        match self {
            LogixType::Null | LogixType::Atomic(_) => Cow::Borrowed(&[]),
            LogixType::Array(a) => Cow::Borrowed(a.elements()),
            LogixType::Structure(s) => Cow::Borrowed(s.members()),
            LogixType::String(s) => Cow::Owned(s.members()),
        }
    }

    /// Looks up a nested member by dotted path, e.g. `Sub.Values[2].PRE`.
    /// Names compare case-insensitively.
    pub fn member(&self, path: &str) -> Option<Member> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;
        let mut current = self.clone();
        for segment in parents {
            current = find_member(&current, segment)?.value;
        }
        find_member(&current, last)
    }

    /// Sets `incoming` into a slot currently holding `self`, returning the
    /// resulting value. `self` is left unchanged.
    pub fn set(&self, incoming: &LogixType) -> Result<LogixType, L5xError> {
        self.merge(incoming, "", &mut NoObserver)
    }

    fn merge(
        &self,
        incoming: &LogixType,
        path: &str,
        observer: &mut dyn ChangeObserver,
    ) -> Result<LogixType, L5xError> {
        match (self, incoming) {
            (LogixType::Null, _) => Ok(incoming.clone()),
            (_, LogixType::Null) => Err(self.mismatch(incoming)),
            (LogixType::Atomic(current), LogixType::Atomic(new)) => {
                Ok(LogixType::Atomic(current.assign(new)?))
            }
            (LogixType::Atomic(_), _) => Err(self.mismatch(incoming)),
            (LogixType::String(current), LogixType::String(new)) => {
                Ok(LogixType::String(current.with_text(new.text())?))
            }
            (LogixType::String(current), LogixType::Structure(_) | LogixType::Array(_)) => {
                let members = incoming.members();
                let len = members
                    .iter()
                    .find(|m| names_equal(m.name(), string::LEN))
                    .and_then(|m| m.value.as_atomic())
                    .and_then(|a| a.value().as_integer())
                    .and_then(|l| usize::try_from(l).ok());
                let text = members
                    .iter()
                    .find(|m| names_equal(m.name(), string::DATA))
                    .and_then(|m| StringType::text_from_data(&m.value, len));
                match text {
                    Some(text) => Ok(LogixType::String(current.with_text(&text)?)),
                    None => Ok(self.clone()),
                }
            }
            (LogixType::String(_), LogixType::Atomic(_)) => Err(self.mismatch(incoming)),
            (LogixType::Array(_) | LogixType::Structure(_), LogixType::Atomic(_)) => {
                Err(self.mismatch(incoming))
            }
            (LogixType::Array(_) | LogixType::Structure(_), _) => {
                let incoming_members = incoming.members();
                let mut result = self.clone();
                for member in result.members_mut().iter_mut() {
                    let Some(source) = incoming_members.iter().find(|m| names_equal(m.name(), member.name()))
                    else {
                        continue;
                    };
                    let child_path = join_path(path, &member.name);
                    member.assign(&source.value, &child_path, observer)?;
                }
                Ok(result)
            }
        }
    }

    fn members_mut(&mut self) -> &mut [Member] {
        match self {
            LogixType::Array(a) => a.elements_mut(),
            LogixType::Structure(s) => s.members_mut(),
            _ => &mut [],
        }
    }

    fn mismatch(&self, incoming: &LogixType) -> L5xError {
        L5xError::TypeMismatch {
            expected: self.describe(),
            found: incoming.describe(),
        }
    }
}

impl From<AtomicType> for LogixType {
    fn from(value: AtomicType) -> Self {
        LogixType::Atomic(value)
    }
}

impl From<ArrayType> for LogixType {
    fn from(value: ArrayType) -> Self {
        LogixType::Array(value)
    }
}

impl From<StructureType> for LogixType {
    fn from(value: StructureType) -> Self {
        LogixType::Structure(value)
    }
}

impl From<StringType> for LogixType {
    fn from(value: StringType) -> Self {
        LogixType::String(value)
    }
}

/// A named slot holding a value: a structure member or an array element.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    value: LogixType,
}

impl Member {
    pub fn new(name: &str, value: LogixType) -> Member {
        Member {
            name: name.to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &LogixType {
        &self.value
    }

    pub fn into_value(self) -> LogixType {
        self.value
    }

    /// Sets `incoming` into this slot. Returns `true` when the stored value
    /// changed; a failed set leaves the slot untouched.
    pub fn set(&mut self, incoming: &LogixType) -> Result<bool, L5xError> {
        self.set_observed(incoming, &mut NoObserver)
    }

    /// Like [`Member::set`], notifying `observer` with the dotted path of
    /// every member whose value changed, innermost first.
    pub fn set_observed(
        &mut self,
        incoming: &LogixType,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let path = self.name.clone();
        self.assign(incoming, &path, observer)
    }

    /// Sets the nested member at `path` (relative to this member) and reports
    /// every changed level up to and including this one.
    pub fn set_member(
        &mut self,
        path: &str,
        incoming: &LogixType,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let segments = split_path(path);
        let root = self.name.clone();
        self.assign_at(&segments, incoming, &root, observer)
    }

    fn assign_at(
        &mut self,
        segments: &[String],
        incoming: &LogixType,
        path: &str,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.assign(incoming, path, observer);
        };
        let owner = self.name.clone();
        let child = self
            .value
            .members_mut()
            .iter_mut()
            .find(|m| segment_matches(m.name(), segment))
            .ok_or_else(|| L5xError::NotFound {
                name: segment.clone(),
                container: owner,
            })?;
        let child_path = join_path(path, &child.name);
        let changed = child.assign_at(rest, incoming, &child_path, observer)?;
        if changed {
            observer.data_changed(path);
        }
        Ok(changed)
    }

    fn assign(
        &mut self,
        incoming: &LogixType,
        path: &str,
        observer: &mut dyn ChangeObserver,
    ) -> Result<bool, L5xError> {
        let updated = self.value.merge(incoming, path, observer)?;
        if updated == self.value {
            return Ok(false);
        }
        self.value = updated;
        observer.data_changed(path);
        Ok(true)
    }
}

/// Receives a notification for each member whose value changed during a set.
pub trait ChangeObserver {
    fn data_changed(&mut self, path: &str);
}

impl<F: FnMut(&str)> ChangeObserver for F {
    fn data_changed(&mut self, path: &str) {
        self(path)
    }
}

struct NoObserver;

impl ChangeObserver for NoObserver {
    fn data_changed(&mut self, _path: &str) {}
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if child.starts_with('[') {
        format!("{}{}", parent, child)
    } else {
        format!("{}.{}", parent, child)
    }
}

/// Splits `A.B[1,2].C` into `A`, `B`, `[1,2]`, `C`.
fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_index = false;
    for c in path.chars() {
        match c {
            '.' if !in_index => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                in_index = true;
                current.push(c);
            }
            ']' => {
                current.push(c);
                segments.push(std::mem::take(&mut current));
                in_index = false;
            }
            c if c.is_whitespace() => {}
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn segment_matches(name: &str, segment: &str) -> bool {
    if segment.starts_with('[') {
        array::normalize_index(name) == array::normalize_index(segment)
    } else {
        names_equal(name, segment)
    }
}

fn find_member(value: &LogixType, segment: &str) -> Option<Member> {
    value
        .members()
        .iter()
        .find(|m| segment_matches(m.name(), segment))
        .cloned()
}
