// crates/l5x-rs/src/lib.rs

#![doc = "Reads, edits and writes Rockwell Automation L5X (Logix project XML) files."]
#![doc = ""]
#![doc = "Every typed object is a thin view over a node of the parsed element tree;"]
#![doc = "reading a property parses the backing attribute and writing one updates it in place."]
#![doc = ""]
#![doc = "It provides:"]
#![doc = "- [`L5X`]: load, save and navigate a project."]
#![doc = "- [`LogixContainer`]: name-unique collections of tags, programs, routines and more."]
#![doc = "- [`data::LogixType`]: tag values with radix-aware parsing and the member set cascade."]
#![doc = "- [`catalog`]: module identity lookup by catalog number."]

// --- Crate Modules ---

pub mod catalog;
mod component;
pub mod components;
mod config;
mod container;
mod content;
pub mod data;
mod element;
mod error;
mod serializer;
pub mod values;
pub mod xml;

// --- Public API Re-exports ---

pub use component::{ComponentName, LogixComponent, MAX_NAME_LENGTH, names_equal, validate_name};
pub use config::{CATALOG_PATH_ENV, CatalogSource, SaveOptions};
pub use container::LogixContainer;
pub use content::L5X;
pub use element::{DESCRIPTION, LogixElement};
pub use error::L5xError;
pub use serializer::{AnyComponent, ComponentKind};
