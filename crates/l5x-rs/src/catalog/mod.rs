// crates/l5x-rs/src/catalog/mod.rs

//! Module catalog: identity and port layout of hardware by catalog number.
//!
//! The crate embeds a small catalog covering common ControlLogix and
//! CompactLogix hardware. A larger database in the same format can be read
//! from the host machine, see [`CatalogSource`].

mod model;

use crate::config::CatalogSource;
use crate::error::L5xError;
use crate::values::Revision;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.xml");

/// A communication port as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPort {
    pub number: u16,
    pub port_type: String,
    pub upstream: bool,
}

/// Everything the catalog knows about one catalog number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub catalog_number: String,
    pub description: String,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_type_id: u16,
    pub product_type_name: String,
    pub product_code: u16,
    /// Firmware revisions in catalog order.
    pub revisions: Vec<Revision>,
    pub ports: Vec<CatalogPort>,
    pub categories: Vec<String>,
}

/// Lookup of hardware by catalog number.
pub trait ModuleCatalog {
    /// The entry for `catalog_number`, compared case-insensitively.
    fn lookup(&self, catalog_number: &str) -> Option<CatalogEntry>;
}

/// A catalog read from an XML database.
#[derive(Debug, Clone, Default)]
pub struct XmlCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl XmlCatalog {
    /// Parses a catalog database. Later entries replace earlier ones with the
    /// same catalog number.
    pub fn parse(xml: &str) -> Result<XmlCatalog, L5xError> {
        let file: model::CatalogFile = quick_xml::de::from_str(xml)?;
        let mut entries = BTreeMap::new();
        for entry in file.entries {
            let entry = CatalogEntry::from(entry);
            entries.insert(entry.catalog_number.to_ascii_uppercase(), entry);
        }
        debug!(
            "Loaded module catalog (version {}) with {} entries",
            file.version.as_deref().unwrap_or("unknown"),
            entries.len()
        );
        Ok(XmlCatalog { entries })
    }

    /// The catalog compiled into the crate.
    pub fn embedded() -> Result<XmlCatalog, L5xError> {
        XmlCatalog::parse(EMBEDDED_CATALOG)
    }

    pub fn from_file(path: &Path) -> Result<XmlCatalog, L5xError> {
        let xml = fs::read_to_string(path)?;
        XmlCatalog::parse(&xml)
    }

    /// Loads the catalog from `source`. For [`CatalogSource::HostOrEmbedded`]
    /// a missing or unreadable host file falls back to the embedded catalog.
    pub fn load(source: &CatalogSource) -> Result<XmlCatalog, L5xError> {
        match source {
            CatalogSource::Embedded => XmlCatalog::embedded(),
            CatalogSource::File(path) => XmlCatalog::from_file(path),
            CatalogSource::HostOrEmbedded(path) => match XmlCatalog::from_file(path) {
                Ok(catalog) => Ok(catalog),
                Err(e) => {
                    warn!(
                        "Module catalog at {} unavailable ({}), using embedded catalog",
                        path.display(),
                        e
                    );
                    XmlCatalog::embedded()
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn catalog_numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(|e| e.catalog_number.as_str())
    }

    /// Entries tagged with `category`, e.g. `Digital` or `Communication`.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .values()
            .filter(move |e| e.categories.iter().any(|c| c.eq_ignore_ascii_case(category)))
    }
}

impl ModuleCatalog for XmlCatalog {
    fn lookup(&self, catalog_number: &str) -> Option<CatalogEntry> {
        self.entries.get(&catalog_number.to_ascii_uppercase()).cloned()
    }
}

impl From<model::EntryModel> for CatalogEntry {
    fn from(entry: model::EntryModel) -> Self {
        CatalogEntry {
            catalog_number: entry.catalog_number,
            description: entry.description.unwrap_or_default(),
            vendor_id: entry.vendor_id,
            vendor_name: entry.vendor_name,
            product_type_id: entry.product_type_id,
            product_type_name: entry.product_type_name,
            product_code: entry.product_code,
            revisions: entry
                .revisions
                .into_iter()
                .map(|r| Revision::new(r.major, r.minor))
                .collect(),
            ports: entry
                .ports
                .into_iter()
                .map(|p| CatalogPort {
                    number: p.number,
                    port_type: p.port_type,
                    upstream: p.upstream,
                })
                .collect(),
            categories: entry.categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_embedded_catalog() {
        let catalog = XmlCatalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        let entry = catalog.lookup("1756-en2t").unwrap();
        assert_eq!(entry.catalog_number, "1756-EN2T");
        assert_eq!(entry.product_code, 166);
        assert_eq!(entry.revisions.iter().max(), Some(&Revision::new(11, 2)));
        assert_eq!(entry.ports.len(), 2);
        assert!(entry.ports[0].upstream);
        assert!(catalog.lookup("9999-NOPE").is_none());
    }

    #[test]
    fn test_categories() {
        let catalog = XmlCatalog::embedded().unwrap();
        let inputs: Vec<&str> = catalog
            .in_category("input")
            .map(|e| e.catalog_number.as_str())
            .collect();
        assert_eq!(inputs, ["1756-IB16", "1756-IF8"]);
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = XmlCatalog::parse(
            r#"<Catalog><Entry CatalogNumber="X-1"><Revision Major="2"/></Entry></Catalog>"#,
        )
        .unwrap();
        let entry = catalog.lookup("X-1").unwrap();
        assert_eq!(entry.description, "");
        assert_eq!(entry.revisions, [Revision::new(2, 0)]);
        assert!(entry.ports.is_empty());
    }

    #[test]
    fn test_malformed_catalog() {
        let result = XmlCatalog::parse(r#"<Catalog><Entry VendorId="1"/></Catalog>"#);
        assert!(matches!(result, Err(L5xError::CatalogParsing(_))));
    }

    #[test]
    fn test_host_file_fallback() {
        let missing = PathBuf::from("/nonexistent/l5x-catalog.xml");
        assert!(matches!(
            XmlCatalog::load(&CatalogSource::File(missing.clone())),
            Err(L5xError::Io(_))
        ));
        let catalog = XmlCatalog::load(&CatalogSource::HostOrEmbedded(missing)).unwrap();
        assert_eq!(catalog.len(), XmlCatalog::embedded().unwrap().len());
    }
}
