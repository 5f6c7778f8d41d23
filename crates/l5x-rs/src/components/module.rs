// crates/l5x-rs/src/components/module.rs

use super::{component_type, element_type, new_component};
use crate::catalog::ModuleCatalog;
use crate::component::{LogixComponent, names_equal};
use crate::container::LogixContainer;
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::Revision;
use crate::xml::Element;
use log::debug;

component_type! {
    /// An I/O module, communication adapter or the controller itself (`Local`).
    Module => "Module" in "Modules"
}

element_type! {
    /// A communication port of a module.
    Port => "Port"
}

const PORTS: &str = "Ports";

/// Name of the module representing the controller chassis slot.
pub const LOCAL_MODULE: &str = "Local";

impl Module {
    /// A bare module with no identity information.
    pub fn new(name: &str, catalog_number: &str) -> Result<Module, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("CatalogNumber", catalog_number)
            .with_attribute("ParentModule", LOCAL_MODULE)
            .with_attribute("ParentModPortId", "1")
            .with_attribute("Inhibited", "false")
            .with_attribute("MajorFault", "false");
        element.append(Element::new(PORTS));
        Module::deserialize(element)
    }

    /// A module filled in from the catalog entry for `catalog_number`:
    /// identity, latest revision and the catalog's port layout.
    pub fn from_catalog(
        name: &str,
        catalog_number: &str,
        catalog: &dyn ModuleCatalog,
    ) -> Result<Module, L5xError> {
        let entry = catalog
            .lookup(catalog_number)
            .ok_or_else(|| L5xError::NotFound {
                name: catalog_number.to_string(),
                container: "module catalog".into(),
            })?;
        let revision = entry.revisions.iter().max().copied().unwrap_or_default();
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("CatalogNumber", entry.catalog_number.as_str())
            .with_attribute("Vendor", entry.vendor_id.to_string())
            .with_attribute("ProductType", entry.product_type_id.to_string())
            .with_attribute("ProductCode", entry.product_code.to_string())
            .with_attribute("Major", revision.major.to_string())
            .with_attribute("Minor", revision.minor.to_string())
            .with_attribute("ParentModule", LOCAL_MODULE)
            .with_attribute("ParentModPortId", "1")
            .with_attribute("Inhibited", "false")
            .with_attribute("MajorFault", "false");
        if !entry.description.is_empty() {
            let description = Element::new(crate::element::DESCRIPTION);
            description.set_cdata(entry.description.as_str());
            element.append(description);
        }
        element.append(Element::new("EKey").with_attribute("State", "CompatibleModule"));
        let ports = element.append(Element::new(PORTS));
        for port in &entry.ports {
            ports.append(Port::new(port.number, &port.port_type, port.upstream).serialize());
        }
        debug!("Created module '{}' from catalog entry {}", name, catalog_number);
        Module::deserialize(element)
    }

    pub fn catalog_number(&self) -> Result<Option<String>, L5xError> {
        self.get_value("CatalogNumber")
    }

    pub fn vendor(&self) -> Result<Option<u16>, L5xError> {
        self.get_value("Vendor")
    }

    pub fn product_type(&self) -> Result<Option<u16>, L5xError> {
        self.get_value("ProductType")
    }

    pub fn product_code(&self) -> Result<Option<u16>, L5xError> {
        self.get_value("ProductCode")
    }

    /// `Major`.`Minor`; missing parts read as zero.
    pub fn revision(&self) -> Result<Revision, L5xError> {
        Ok(Revision::new(
            self.get_value("Major")?.unwrap_or(0),
            self.get_value("Minor")?.unwrap_or(0),
        ))
    }

    pub fn set_revision(&self, revision: Revision) {
        self.set_value("Major", Some(&revision.major));
        self.set_value("Minor", Some(&revision.minor));
    }

    pub fn parent_module(&self) -> Result<Option<String>, L5xError> {
        self.get_value("ParentModule")
    }

    pub fn parent_port_id(&self) -> Result<Option<u16>, L5xError> {
        self.get_value("ParentModPortId")
    }

    /// Attaches this module below `parent` on the parent's port `port_id`.
    pub fn set_parent(&self, parent: &str, port_id: u16) {
        self.set_value("ParentModule", Some(&parent.to_string()));
        self.set_value("ParentModPortId", Some(&port_id));
    }

    pub fn inhibited(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Inhibited")?.unwrap_or(false))
    }

    pub fn set_inhibited(&self, inhibited: bool) {
        self.set_value("Inhibited", Some(&inhibited))
    }

    pub fn major_fault(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("MajorFault")?.unwrap_or(false))
    }

    pub fn safety_enabled(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("SafetyEnabled")?.unwrap_or(false))
    }

    pub fn ports(&self) -> Result<Vec<Port>, L5xError> {
        match self.element().element(PORTS) {
            Some(ports) => ports
                .elements_named(Port::ELEMENT)
                .into_iter()
                .map(Port::deserialize)
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    pub fn port(&self, id: u16) -> Result<Option<Port>, L5xError> {
        for port in self.ports()? {
            if port.id()? == id {
                return Ok(Some(port));
            }
        }
        Ok(None)
    }

    /// Replaces the port list.
    pub fn set_ports(&self, ports: &[Port]) {
        let container = match self.element().element(PORTS) {
            Some(existing) => {
                existing.clear_children();
                existing
            }
            None => self.element().append(Element::new(PORTS)),
        };
        for port in ports {
            container.append(port.serialize());
        }
    }

    /// Modules whose `ParentModule` is this module, in document order.
    /// `Local` names itself as its parent and is skipped.
    pub fn children(&self, modules: &LogixContainer<Module>) -> Result<Vec<Module>, L5xError> {
        let name = self.name()?;
        let mut children = Vec::new();
        for module in modules.iter() {
            let module = module?;
            if names_equal(&module.name()?, &name) {
                continue;
            }
            if module.parent_module()?.is_some_and(|p| names_equal(&p, &name)) {
                children.push(module);
            }
        }
        Ok(children)
    }
}

impl Port {
    pub fn new(id: u16, port_type: &str, upstream: bool) -> Port {
        let element = Element::new(Self::ELEMENT)
            .with_attribute("Id", id.to_string())
            .with_attribute("Type", port_type)
            .with_attribute("Upstream", upstream.to_string());
        Port { element }
    }

    pub fn id(&self) -> Result<u16, L5xError> {
        self.get_required_value("Id")
    }

    pub fn port_type(&self) -> Result<String, L5xError> {
        self.get_required_value("Type")
    }

    /// Slot number or network address, depending on the port type.
    pub fn address(&self) -> Result<Option<String>, L5xError> {
        self.get_value("Address")
    }

    pub fn set_address(&self, address: Option<&str>) {
        let address = address.map(str::to_string);
        self.set_value("Address", address.as_ref())
    }

    pub fn upstream(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Upstream")?.unwrap_or(false))
    }
}
