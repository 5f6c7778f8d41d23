// crates/l5x-rs/src/config.rs

//! Configuration knobs for writing documents and locating the module catalog.

use std::env;
use std::path::PathBuf;

/// Environment variable naming a catalog database file on the host machine.
pub const CATALOG_PATH_ENV: &str = "L5X_CATALOG_PATH";

/// Controls how an element tree is written back to XML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Character used for indentation.
    pub indent_char: char,
    /// Number of `indent_char` per nesting level. Zero writes everything on one line.
    pub indent_size: usize,
    /// Emit `standalone="yes"` in the XML declaration.
    pub standalone: bool,
    /// Emit the `<?xml ...?>` declaration at all.
    pub declaration: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_size: 2,
            standalone: true,
            declaration: true,
        }
    }
}

impl SaveOptions {
    pub fn with_indent(mut self, indent_char: char, indent_size: usize) -> Self {
        self.indent_char = indent_char;
        self.indent_size = indent_size;
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Compact output without any inserted whitespace.
    pub fn compact() -> Self {
        Self::default().with_indent(' ', 0)
    }

    pub(crate) fn indent(&self, depth: usize) -> String {
        core::iter::repeat_n(self.indent_char, depth * self.indent_size).collect()
    }
}

/// Where the module catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// The small dataset compiled into the crate.
    #[default]
    Embedded,
    /// A catalog database file. Failing to read it is an error.
    File(PathBuf),
    /// A catalog database file, falling back to the embedded dataset when unavailable.
    HostOrEmbedded(PathBuf),
}

impl CatalogSource {
    /// Reads [`CATALOG_PATH_ENV`]; when set, the host file is preferred with the
    /// embedded dataset as fallback.
    pub fn from_env() -> Self {
        match env::var_os(CATALOG_PATH_ENV) {
            Some(path) if !path.is_empty() => CatalogSource::HostOrEmbedded(PathBuf::from(path)),
            _ => CatalogSource::Embedded,
        }
    }
}
