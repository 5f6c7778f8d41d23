// crates/l5x-rs/src/components/data_type.rs

use super::{component_type, new_component};
use crate::component::LogixComponent;
use crate::container::LogixContainer;
use crate::data::{
    ArrayType, AtomicKind, LogixType, Member, Radix, StringType, StructureType,
    TypeRegistry,
};
use crate::element::LogixElement;
use crate::error::L5xError;
use crate::values::{DataTypeClass, DataTypeFamily, Dimensions, ExternalAccess};
use core::str::FromStr;

/// Data type of a BOOL member packed into a hidden SINT host.
const BIT: &str = "BIT";

component_type! {
    /// A user-defined data type.
    DataType => "DataType" in "DataTypes"
}

component_type! {
    /// A member of a user-defined data type.
    DataTypeMember => "Member" in "Members"
}

impl DataType {
    /// An empty user-defined type.
    pub fn new(name: &str) -> Result<DataType, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("Family", DataTypeFamily::NoFamily.as_str())
            .with_attribute("Class", DataTypeClass::User.as_str());
        element.append(crate::xml::Element::new(DataTypeMember::CONTAINER));
        DataType::deserialize(element)
    }

    pub fn family(&self) -> Result<DataTypeFamily, L5xError> {
        Ok(self.get_value("Family")?.unwrap_or(DataTypeFamily::NoFamily))
    }

    pub fn set_family(&self, family: DataTypeFamily) {
        self.set_value("Family", Some(&family))
    }

    pub fn class(&self) -> Result<DataTypeClass, L5xError> {
        Ok(self.get_value("Class")?.unwrap_or(DataTypeClass::User))
    }

    pub fn members(&self) -> Result<LogixContainer<DataTypeMember>, L5xError> {
        self.get_container()
    }

    pub fn set_members(&self, members: &LogixContainer<DataTypeMember>) -> Result<(), L5xError> {
        self.set_container(members)
    }

    /// Names of the non-atomic types this type's members refer to.
    pub fn dependencies(&self) -> Result<Vec<String>, L5xError> {
        let mut names: Vec<String> = Vec::new();
        for member in self.members()?.iter() {
            let data_type = member?.data_type()?;
            if AtomicKind::is_atomic(&data_type) || data_type.eq_ignore_ascii_case(BIT) {
                continue;
            }
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&data_type)) {
                names.push(data_type);
            }
        }
        Ok(names)
    }

    /// A default value of this type.
    ///
    /// Member types other than atomics must already be in `registry`. Hidden
    /// members (the SINT hosts of BOOL bit members) are left out. String
    /// family types become a [`StringType`] sized from their `DATA` member.
    pub fn template(&self, registry: &TypeRegistry) -> Result<LogixType, L5xError> {
        let name = self.name()?;
        let members = self.members()?.to_vec()?;

        if self.family()? == DataTypeFamily::StringFamily {
            let capacity = members
                .iter()
                .find(|m| m.name().is_ok_and(|n| n.eq_ignore_ascii_case("DATA")))
                .map(|m| m.dimension().map(|d| d.len()))
                .transpose()?
                .unwrap_or(0);
            return Ok(LogixType::String(StringType::with_type(&name, capacity, "")?));
        }

        let mut structure = StructureType::new(&name, Vec::new())?;
        for member in members.iter().filter(|m| !m.hidden().unwrap_or(false)) {
            let member_name = member.name()?;
            structure.add_member(Member::new(&member_name, member.default_value(registry)?))?;
        }
        Ok(LogixType::Structure(structure))
    }
}

impl DataTypeMember {
    pub fn new(name: &str, data_type: &str) -> Result<DataTypeMember, L5xError> {
        let element = new_component(Self::ELEMENT, name)?
            .with_attribute("DataType", data_type)
            .with_attribute("Dimension", "0");
        match AtomicKind::from_str(data_type) {
            Ok(kind) if kind != AtomicKind::Bool => {
                element.set_attribute("Radix", kind.default_radix().as_str())
            }
            _ => {}
        }
        element.set_attribute("Hidden", "false");
        element.set_attribute("ExternalAccess", ExternalAccess::ReadWrite.as_str());
        DataTypeMember::deserialize(element)
    }

    pub fn data_type(&self) -> Result<String, L5xError> {
        self.get_required_value("DataType")
    }

    pub fn set_data_type(&self, data_type: &str) {
        self.set_value("DataType", Some(&data_type.to_string()))
    }

    pub fn dimension(&self) -> Result<Dimensions, L5xError> {
        Ok(self.get_value("Dimension")?.unwrap_or_default())
    }

    pub fn set_dimension(&self, dimension: &Dimensions) {
        self.set_value("Dimension", Some(dimension))
    }

    pub fn radix(&self) -> Result<Option<Radix>, L5xError> {
        self.get_value("Radix")
    }

    pub fn set_radix(&self, radix: Option<Radix>) {
        self.set_value("Radix", radix.as_ref())
    }

    pub fn hidden(&self) -> Result<bool, L5xError> {
        Ok(self.get_value("Hidden")?.unwrap_or(false))
    }

    pub fn external_access(&self) -> Result<Option<ExternalAccess>, L5xError> {
        self.get_value("ExternalAccess")
    }

    /// The hidden SINT host of a BOOL bit member.
    pub fn target(&self) -> Result<Option<String>, L5xError> {
        self.get_value("Target")
    }

    pub fn bit_number(&self) -> Result<Option<u8>, L5xError> {
        self.get_value("BitNumber")
    }

    /// Binds a BOOL member to bit `bit` of the hidden host member `target`.
    pub fn set_bit(&self, target: &str, bit: u8) {
        self.set_value("Target", Some(&target.to_string()));
        self.set_value("BitNumber", Some(&bit));
    }

    /// The default value of this member: zero atomics in the declared radix,
    /// registry templates for other types, arrays filled with either.
    /// `BIT` members read as BOOL.
    pub fn default_value(&self, registry: &TypeRegistry) -> Result<LogixType, L5xError> {
        let mut data_type = self.data_type()?;
        if data_type.eq_ignore_ascii_case(BIT) {
            data_type = AtomicKind::Bool.as_str().to_string();
        }
        let mut value = registry
            .instantiate(&data_type)
            .ok_or_else(|| L5xError::NotFound {
                name: data_type.clone(),
                container: "DataTypes".into(),
            })?;
        if let (LogixType::Atomic(atomic), Some(radix)) = (&value, self.radix()?) {
            if radix.supports(atomic.kind()) {
                value = LogixType::Atomic(atomic.with_radix(radix)?);
            }
        }
        let dimension = self.dimension()?;
        if dimension.is_empty() {
            Ok(value)
        } else {
            Ok(LogixType::Array(ArrayType::filled(dimension, &value)?))
        }
    }
}
