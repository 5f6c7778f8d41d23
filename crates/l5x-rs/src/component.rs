// crates/l5x-rs/src/component.rs

//! Named components and the Logix naming rule.

use crate::element::LogixElement;
use crate::error::L5xError;
use core::fmt;

/// Maximum length of a component name.
pub const MAX_NAME_LENGTH: usize = 40;

/// A validated component name.
///
/// 1 to 40 characters; the first is an ASCII letter or underscore, the rest are
/// ASCII letters, digits or underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: &str) -> Result<Self, L5xError> {
        validate_name(name)?;
        Ok(ComponentName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Logix names are case-insensitive.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks `name` against the Logix naming rule.
pub fn validate_name(name: &str) -> Result<(), L5xError> {
    let invalid = |reason| {
        Err(L5xError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("name is empty"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return invalid("must start with a letter or underscore");
        }
        _ => {}
    }
    if name.len() > MAX_NAME_LENGTH {
        return invalid("must not exceed 40 characters");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return invalid("may only contain letters, digits and underscores");
    }
    Ok(())
}

/// Case-insensitive name comparison used for uniqueness checks.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A uniquely named entity stored in a [`LogixContainer`](crate::LogixContainer).
pub trait LogixComponent: LogixElement {
    /// Element name of the container holding components of this kind.
    const CONTAINER: &'static str;

    fn name(&self) -> Result<String, L5xError> {
        self.get_required_value("Name")
    }

    /// Renames the component in place after validating the new name.
    ///
    /// An attached component is checked against its siblings of the same kind.
    fn set_name(&self, name: &str) -> Result<(), L5xError> {
        validate_name(name)?;
        let element = self.element();
        if let Some(parent) = element.parent() {
            let taken = parent.elements_named(Self::ELEMENT).iter().any(|sibling| {
                !sibling.ptr_eq(element)
                    && sibling.attribute("Name").is_some_and(|n| names_equal(&n, name))
            });
            if taken {
                return Err(L5xError::NameCollision {
                    name: name.to_string(),
                    container: Self::CONTAINER.to_string(),
                });
            }
        }
        self.set_value("Name", Some(&name.to_string()));
        Ok(())
    }
}
