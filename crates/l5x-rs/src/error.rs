// crates/l5x-rs/src/error.rs

use core::fmt;
use quick_xml::errors::serialize::DeError;
use std::io;

/// Errors that can occur while reading, editing or writing L5X content.
#[derive(Debug)]
pub enum L5xError {
    /// An error from the underlying `quick-xml` reader or writer.
    Xml(quick_xml::Error),

    /// An error from the `quick-xml` serde deserializer (catalog database).
    CatalogParsing(DeError),

    /// A file could not be read or written.
    Io(io::Error),

    /// A required input to a public operation was absent or empty.
    InvalidArgument(&'static str),

    /// A component or member name does not follow the Logix naming rule.
    InvalidName { name: String, reason: &'static str },

    /// An add or rename targeted a name already used in the same scope.
    NameCollision { name: String, container: String },

    /// A required lookup by name found nothing.
    NotFound { name: String, container: String },

    /// A positional access was outside the collection.
    IndexOutOfRange { index: usize, len: usize },

    /// An element lacks an attribute the schema guarantees for its kind.
    MissingAttribute { element: String, attribute: String },

    /// An element lacks a child element the schema guarantees for its kind.
    MissingElement { element: String, child: String },

    /// An element name or format value is not recognized for deserialization.
    Unsupported { element: String, detail: String },

    /// A string value could not be converted into the requested type.
    Conversion {
        element: String,
        property: String,
        value: String,
        reason: String,
    },

    /// A value of one kind was assigned into a slot of an incompatible kind.
    TypeMismatch { expected: String, found: String },

    /// A value does not fit the target data type.
    ValueOutOfRange { data_type: String, value: String },
}

impl From<quick_xml::Error> for L5xError {
    fn from(e: quick_xml::Error) -> Self {
        L5xError::Xml(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for L5xError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        L5xError::Xml(quick_xml::Error::from(e))
    }
}

impl From<quick_xml::escape::EscapeError> for L5xError {
    fn from(e: quick_xml::escape::EscapeError) -> Self {
        L5xError::Xml(quick_xml::Error::from(e))
    }
}

impl From<DeError> for L5xError {
    fn from(e: DeError) -> Self {
        L5xError::CatalogParsing(e)
    }
}

impl From<io::Error> for L5xError {
    fn from(e: io::Error) -> Self {
        L5xError::Io(e)
    }
}

impl fmt::Display for L5xError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            L5xError::Xml(e) => write!(f, "XML error: {}", e),
            L5xError::CatalogParsing(e) => write!(f, "Catalog parsing error: {}", e),
            L5xError::Io(e) => write!(f, "I/O error: {}", e),
            L5xError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            L5xError::InvalidName { name, reason } => {
                write!(f, "Invalid name '{}': {}", name, reason)
            }
            L5xError::NameCollision { name, container } => {
                write!(f, "Name '{}' already exists in {}", name, container)
            }
            L5xError::NotFound { name, container } => {
                write!(f, "'{}' not found in {}", name, container)
            }
            L5xError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} is out of range for length {}", index, len)
            }
            L5xError::MissingAttribute { element, attribute } => write!(
                f,
                "Element '{}' is missing required property '{}'",
                element, attribute
            ),
            L5xError::MissingElement { element, child } => write!(
                f,
                "Element '{}' is missing required child element '{}'",
                element, child
            ),
            L5xError::Unsupported { element, detail } => write!(
                f,
                "Element '{}' is not supported for deserialization: {}",
                element, detail
            ),
            L5xError::Conversion {
                element,
                property,
                value,
                reason,
            } => write!(
                f,
                "Failed to convert '{}' of {}@{}: {}",
                value, element, property, reason
            ),
            L5xError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {} but got {}", expected, found)
            }
            L5xError::ValueOutOfRange { data_type, value } => {
                write!(f, "Value '{}' is out of range for {}", value, data_type)
            }
        }
    }
}

impl std::error::Error for L5xError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            L5xError::Xml(e) => Some(e),
            L5xError::CatalogParsing(e) => Some(e),
            L5xError::Io(e) => Some(e),
            _ => None,
        }
    }
}
