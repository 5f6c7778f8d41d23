// crates/l5x-rs/src/data/array.rs

use super::atomic::{AtomicKind, AtomicType};
use super::{LogixType, Member};
use crate::error::L5xError;
use crate::values::Dimensions;

/// An array of values of one element type.
///
/// Elements are members named by their index (`[0]`, `[1,2]`) in row-major
/// order, so the set cascade joins arrays the same way it joins structures.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    data_type: String,
    dimensions: Dimensions,
    elements: Vec<Member>,
}

impl ArrayType {
    /// Builds an array from values laid out in row-major order.
    pub fn new(
        data_type: &str,
        dimensions: Dimensions,
        values: Vec<LogixType>,
    ) -> Result<ArrayType, L5xError> {
        if dimensions.is_empty() {
            return Err(L5xError::InvalidArgument("array dimensions must not be empty"));
        }
        if values.len() != dimensions.len() {
            return Err(L5xError::InvalidArgument(
                "array value count must match its dimensions",
            ));
        }
        if values.iter().any(|v| matches!(v, LogixType::Null)) {
            return Err(L5xError::InvalidArgument("array elements must not be null"));
        }
        let elements = dimensions
            .indices()
            .into_iter()
            .zip(values)
            .map(|(index, value)| Member::new(&index, value))
            .collect();
        Ok(ArrayType {
            data_type: data_type.to_string(),
            dimensions,
            elements,
        })
    }

    /// A one dimensional array of `values`.
    pub fn from_values(data_type: &str, values: Vec<LogixType>) -> Result<ArrayType, L5xError> {
        let dimensions = Dimensions::new(&[values.len()]).map_err(|_| {
            L5xError::InvalidArgument("array must have at least one element")
        })?;
        ArrayType::new(data_type, dimensions, values)
    }

    /// A one dimensional array of atomics.
    pub fn from_atomics(values: &[AtomicType]) -> Result<ArrayType, L5xError> {
        let kind = values
            .first()
            .map(AtomicType::kind)
            .ok_or(L5xError::InvalidArgument("array must have at least one element"))?;
        let converted = values
            .iter()
            .map(|v| AtomicType::default_of(kind).assign(v).map(LogixType::Atomic))
            .collect::<Result<Vec<_>, _>>()?;
        ArrayType::from_values(kind.as_str(), converted)
    }

    /// An array with every element set to `prototype`.
    pub fn filled(dimensions: Dimensions, prototype: &LogixType) -> Result<ArrayType, L5xError> {
        let values = vec![prototype.clone(); dimensions.len()];
        ArrayType::new(&prototype.type_name(), dimensions, values)
    }

    /// Rebuilds an array from parsed elements, keeping their index names.
    pub(crate) fn from_elements(
        data_type: &str,
        dimensions: Dimensions,
        elements: Vec<Member>,
    ) -> ArrayType {
        ArrayType {
            data_type: data_type.to_string(),
            dimensions,
            elements,
        }
    }

    /// Element type name.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Element kind when the elements are atomic.
    pub fn atomic_kind(&self) -> Option<AtomicKind> {
        self.data_type.parse().ok()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Member] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<Member> {
        &mut self.elements
    }

    /// Element at a flat row-major position.
    pub fn at(&self, position: usize) -> Option<&LogixType> {
        self.elements.get(position).map(Member::value)
    }

    /// Element by index text such as `[3]` or `[1,2]`.
    pub fn get(&self, index: &str) -> Option<&LogixType> {
        let wanted = normalize_index(index);
        self.elements
            .iter()
            .find(|m| normalize_index(m.name()) == wanted)
            .map(Member::value)
    }
}

/// Strips whitespace and adds brackets so `1, 2` and `[1,2]` compare equal.
pub(crate) fn normalize_index(index: &str) -> String {
    let compact: String = index.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('[') {
        compact
    } else {
        format!("[{}]", compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_count() {
        let dims = Dimensions::new(&[3]).unwrap();
        let values = vec![LogixType::from(AtomicType::from_i32(1)); 2];
        assert!(ArrayType::new("DINT", dims, values).is_err());
    }

    #[test]
    fn test_two_dimensional_indices() {
        let dims = Dimensions::new(&[2, 2]).unwrap();
        let values = (0..4).map(|i| AtomicType::from_i32(i).into()).collect();
        let array = ArrayType::new("DINT", dims, values).unwrap();
        assert_eq!(array.elements()[1].name(), "[0,1]");
        assert_eq!(
            array.get("1, 0").and_then(LogixType::as_atomic).map(|a| a.format()),
            Some("2".into())
        );
        assert_eq!(array.at(3), Some(&LogixType::from(AtomicType::from_i32(3))));
    }

    #[test]
    fn test_from_atomics_uses_first_kind() {
        let array = ArrayType::from_atomics(&[AtomicType::from_i8(1), AtomicType::from_i32(2)]).unwrap();
        assert_eq!(array.atomic_kind(), Some(AtomicKind::Sint));
        assert!(ArrayType::from_atomics(&[AtomicType::from_i8(1), AtomicType::from_i32(1000)]).is_err());
    }
}
