// crates/l5x-rs/src/catalog/model.rs

//! Serde model of a catalog database file.
//!
//! ```xml
//! <Catalog>
//!   <Entry CatalogNumber="1756-IB16" VendorId="1" ProductTypeId="7" ProductCode="23" ...>
//!     <Description>...</Description>
//!     <Revision Major="3" Minor="1"/>
//!     <Port Number="1" Type="ICP" Upstream="true"/>
//!     <Category>Digital</Category>
//!   </Entry>
//! </Catalog>
//! ```

use serde::Deserialize;

/// The `<Catalog>` root.
#[derive(Debug, Deserialize, Default)]
pub struct CatalogFile {
    #[serde(rename = "@Version", default)]
    pub version: Option<String>,

    #[serde(rename = "Entry", default)]
    pub entries: Vec<EntryModel>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EntryModel {
    #[serde(rename = "@CatalogNumber")] // Required
    pub catalog_number: String,
    #[serde(rename = "@VendorId", default)]
    pub vendor_id: u16,
    #[serde(rename = "@VendorName", default)]
    pub vendor_name: String,
    #[serde(rename = "@ProductTypeId", default)]
    pub product_type_id: u16,
    #[serde(rename = "@ProductTypeName", default)]
    pub product_type_name: String,
    #[serde(rename = "@ProductCode", default)]
    pub product_code: u16,

    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Revision", default)]
    pub revisions: Vec<RevisionModel>,
    #[serde(rename = "Port", default)]
    pub ports: Vec<PortModel>,
    #[serde(rename = "Category", default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RevisionModel {
    #[serde(rename = "@Major")]
    pub major: u16,
    #[serde(rename = "@Minor", default)]
    pub minor: u16,
}

#[derive(Debug, Deserialize, Default)]
pub struct PortModel {
    #[serde(rename = "@Number")]
    pub number: u16,
    #[serde(rename = "@Type")]
    pub port_type: String,
    #[serde(rename = "@Upstream", default)]
    pub upstream: bool,
}
