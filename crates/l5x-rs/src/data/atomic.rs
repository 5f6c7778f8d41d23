// crates/l5x-rs/src/data/atomic.rs

//! Scalar data values.

use super::radix::Radix;
use crate::error::L5xError;
use crate::values::{L5xValue, l5x_enum};
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

l5x_enum! {
    /// The atomic Logix data types.
    pub enum AtomicKind {
        Bool => "BOOL",
        Sint => "SINT",
        Int => "INT",
        Dint => "DINT",
        Lint => "LINT",
        Usint => "USINT",
        Uint => "UINT",
        Udint => "UDINT",
        Ulint => "ULINT",
        Real => "REAL",
        Lreal => "LREAL",
    }
}

impl AtomicKind {
    /// Width of the value in bits.
    pub fn bits(&self) -> u32 {
        match self {
            AtomicKind::Bool => 1,
            AtomicKind::Sint | AtomicKind::Usint => 8,
            AtomicKind::Int | AtomicKind::Uint => 16,
            AtomicKind::Dint | AtomicKind::Udint | AtomicKind::Real => 32,
            AtomicKind::Lint | AtomicKind::Ulint | AtomicKind::Lreal => 64,
        }
    }

    /// Width in bytes as used for ASCII rendering.
    pub fn bytes(&self) -> usize {
        (self.bits() as usize).div_ceil(8)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, AtomicKind::Real | AtomicKind::Lreal)
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            AtomicKind::Sint | AtomicKind::Int | AtomicKind::Dint | AtomicKind::Lint
        )
    }

    pub fn default_radix(&self) -> Radix {
        if self.is_float() {
            Radix::Float
        } else {
            Radix::Decimal
        }
    }

    /// The zero value of this kind.
    pub fn zero(&self) -> AtomicValue {
        AtomicValue::from_bits(*self, 0)
    }

    /// Whether `name` is an atomic type name.
    pub fn is_atomic(name: &str) -> bool {
        AtomicKind::from_str(name).is_ok()
    }
}

/// A scalar together with its concrete kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtomicValue {
    Bool(bool),
    Sint(i8),
    Int(i16),
    Dint(i32),
    Lint(i64),
    Usint(u8),
    Uint(u16),
    Udint(u32),
    Ulint(u64),
    Real(f32),
    Lreal(f64),
}

impl AtomicValue {
    pub fn kind(&self) -> AtomicKind {
        match self {
            AtomicValue::Bool(_) => AtomicKind::Bool,
            AtomicValue::Sint(_) => AtomicKind::Sint,
            AtomicValue::Int(_) => AtomicKind::Int,
            AtomicValue::Dint(_) => AtomicKind::Dint,
            AtomicValue::Lint(_) => AtomicKind::Lint,
            AtomicValue::Usint(_) => AtomicKind::Usint,
            AtomicValue::Uint(_) => AtomicKind::Uint,
            AtomicValue::Udint(_) => AtomicKind::Udint,
            AtomicValue::Ulint(_) => AtomicKind::Ulint,
            AtomicValue::Real(_) => AtomicKind::Real,
            AtomicValue::Lreal(_) => AtomicKind::Lreal,
        }
    }

    /// The integer value, or `None` for floating point kinds.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            AtomicValue::Bool(v) => Some(v as i128),
            AtomicValue::Sint(v) => Some(v as i128),
            AtomicValue::Int(v) => Some(v as i128),
            AtomicValue::Dint(v) => Some(v as i128),
            AtomicValue::Lint(v) => Some(v as i128),
            AtomicValue::Usint(v) => Some(v as i128),
            AtomicValue::Uint(v) => Some(v as i128),
            AtomicValue::Udint(v) => Some(v as i128),
            AtomicValue::Ulint(v) => Some(v as i128),
            AtomicValue::Real(_) | AtomicValue::Lreal(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            AtomicValue::Real(v) => v as f64,
            AtomicValue::Lreal(v) => v,
            other => other.as_integer().unwrap_or_default() as f64,
        }
    }

    /// The raw two's complement bit pattern, zero extended to 64 bits.
    pub fn to_bits(&self) -> u64 {
        match *self {
            AtomicValue::Bool(v) => v as u64,
            AtomicValue::Sint(v) => v as u8 as u64,
            AtomicValue::Int(v) => v as u16 as u64,
            AtomicValue::Dint(v) => v as u32 as u64,
            AtomicValue::Lint(v) => v as u64,
            AtomicValue::Usint(v) => v as u64,
            AtomicValue::Uint(v) => v as u64,
            AtomicValue::Udint(v) => v as u64,
            AtomicValue::Ulint(v) => v,
            AtomicValue::Real(v) => v.to_bits() as u64,
            AtomicValue::Lreal(v) => v.to_bits(),
        }
    }

    /// Reinterprets the low bits of `bits` as a value of `kind`.
    pub fn from_bits(kind: AtomicKind, bits: u64) -> AtomicValue {
        match kind {
            AtomicKind::Bool => AtomicValue::Bool(bits & 1 == 1),
            AtomicKind::Sint => AtomicValue::Sint(bits as u8 as i8),
            AtomicKind::Int => AtomicValue::Int(bits as u16 as i16),
            AtomicKind::Dint => AtomicValue::Dint(bits as u32 as i32),
            AtomicKind::Lint => AtomicValue::Lint(bits as i64),
            AtomicKind::Usint => AtomicValue::Usint(bits as u8),
            AtomicKind::Uint => AtomicValue::Uint(bits as u16),
            AtomicKind::Udint => AtomicValue::Udint(bits as u32),
            AtomicKind::Ulint => AtomicValue::Ulint(bits),
            AtomicKind::Real => AtomicValue::Real(f32::from_bits(bits as u32)),
            AtomicKind::Lreal => AtomicValue::Lreal(f64::from_bits(bits)),
        }
    }

    /// Builds a value of `kind` from an integer, failing when it does not fit.
    pub fn from_integer(kind: AtomicKind, value: i128) -> Result<AtomicValue, L5xError> {
        let out_of_range = || L5xError::ValueOutOfRange {
            data_type: kind.to_string(),
            value: value.to_string(),
        };
        Ok(match kind {
            AtomicKind::Bool => AtomicValue::Bool(value != 0),
            AtomicKind::Sint => AtomicValue::Sint(i8::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Int => AtomicValue::Int(i16::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Dint => AtomicValue::Dint(i32::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Lint => AtomicValue::Lint(i64::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Usint => AtomicValue::Usint(u8::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Uint => AtomicValue::Uint(u16::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Udint => AtomicValue::Udint(u32::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Ulint => AtomicValue::Ulint(u64::try_from(value).map_err(|_| out_of_range())?),
            AtomicKind::Real => AtomicValue::Real(value as f32),
            AtomicKind::Lreal => AtomicValue::Lreal(value as f64),
        })
    }

    /// Builds a value of `kind` from a float. Integer kinds round to the
    /// nearest integer and fail when the result does not fit.
    pub fn from_float(kind: AtomicKind, value: f64) -> Result<AtomicValue, L5xError> {
        match kind {
            AtomicKind::Real => Ok(AtomicValue::Real(value as f32)),
            AtomicKind::Lreal => Ok(AtomicValue::Lreal(value)),
            AtomicKind::Bool => Ok(AtomicValue::Bool(value != 0.0)),
            _ => {
                let rounded = value.round();
                // i128 comfortably covers every integer kind.
                if !rounded.is_finite() || rounded.abs() > 1.0e30 {
                    return Err(L5xError::ValueOutOfRange {
                        data_type: kind.to_string(),
                        value: value.to_string(),
                    });
                }
                AtomicValue::from_integer(kind, rounded as i128)
            }
        }
    }

    /// Converts this value into `kind`, keeping its numeric meaning.
    pub fn convert_to(&self, kind: AtomicKind) -> Result<AtomicValue, L5xError> {
        if self.kind() == kind {
            return Ok(*self);
        }
        match self.as_integer() {
            Some(i) => AtomicValue::from_integer(kind, i),
            None => AtomicValue::from_float(kind, self.as_f64()),
        }
    }

    /// Numeric comparison across kinds.
    pub fn compare(&self, other: &AtomicValue) -> Option<Ordering> {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// An atomic value with the radix it is displayed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomicType {
    value: AtomicValue,
    radix: Radix,
}

macro_rules! atomic_constructors {
    ($($fn_name:ident($typ:ty) => $variant:ident),* $(,)?) => {
        $(
            pub fn $fn_name(value: $typ) -> AtomicType {
                AtomicType::new(AtomicValue::$variant(value))
            }
        )*
    };
}

impl AtomicType {
    /// Wraps `value` with the default radix of its kind.
    pub fn new(value: AtomicValue) -> AtomicType {
        AtomicType {
            value,
            radix: value.kind().default_radix(),
        }
    }

    atomic_constructors! {
        from_bool(bool) => Bool,
        from_i8(i8) => Sint,
        from_i16(i16) => Int,
        from_i32(i32) => Dint,
        from_i64(i64) => Lint,
        from_u8(u8) => Usint,
        from_u16(u16) => Uint,
        from_u32(u32) => Udint,
        from_u64(u64) => Ulint,
        from_f32(f32) => Real,
        from_f64(f64) => Lreal,
    }

    /// The zero value of `kind`.
    pub fn default_of(kind: AtomicKind) -> AtomicType {
        AtomicType::new(kind.zero())
    }

    /// Returns a copy displayed in `radix`, if the radix applies to this kind.
    pub fn with_radix(self, radix: Radix) -> Result<AtomicType, L5xError> {
        if !radix.supports(self.kind()) {
            return Err(L5xError::TypeMismatch {
                expected: format!("a radix valid for {}", self.kind()),
                found: radix.to_string(),
            });
        }
        Ok(AtomicType { radix, ..self })
    }

    /// Parses value text for `kind`. The radix is inferred from the text.
    pub fn parse(kind: AtomicKind, text: &str) -> Result<AtomicType, L5xError> {
        let radix = Radix::infer(text, kind);
        let value = radix
            .parse(text, kind)
            .map_err(|reason| L5xError::Conversion {
                element: kind.to_string(),
                property: "Value".into(),
                value: text.to_string(),
                reason,
            })?;
        Ok(AtomicType { value, radix })
    }

    pub fn value(&self) -> AtomicValue {
        self.value
    }

    pub fn kind(&self) -> AtomicKind {
        self.value.kind()
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    /// The value text in this value's radix.
    pub fn format(&self) -> String {
        self.radix.format(&self.value)
    }

    /// Assigns `incoming` into a slot holding `self`: the result keeps this
    /// value's kind and radix and carries the converted scalar.
    pub fn assign(&self, incoming: &AtomicType) -> Result<AtomicType, L5xError> {
        Ok(AtomicType {
            value: incoming.value.convert_to(self.kind())?,
            radix: self.radix,
        })
    }

    pub fn compare(&self, other: &AtomicType) -> Option<Ordering> {
        self.value.compare(&other.value)
    }
}

impl PartialOrd for AtomicType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(AtomicKind::parse_l5x("DINT"), Ok(AtomicKind::Dint));
        assert_eq!(AtomicKind::Lreal.to_l5x(), "LREAL");
        assert!(AtomicKind::is_atomic("real"));
        assert!(!AtomicKind::is_atomic("TIMER"));
    }

    #[test]
    fn test_convert_keeps_target_kind() {
        let v = AtomicValue::Int(12).convert_to(AtomicKind::Dint).unwrap();
        assert_eq!(v, AtomicValue::Dint(12));
        let v = AtomicValue::Real(2.6).convert_to(AtomicKind::Sint).unwrap();
        assert_eq!(v, AtomicValue::Sint(3));
        let v = AtomicValue::Dint(5).convert_to(AtomicKind::Bool).unwrap();
        assert_eq!(v, AtomicValue::Bool(true));
    }

    #[test]
    fn test_convert_out_of_range_fails() {
        assert!(matches!(
            AtomicValue::Dint(70_000).convert_to(AtomicKind::Int),
            Err(L5xError::ValueOutOfRange { .. })
        ));
        assert!(AtomicValue::Sint(-1).convert_to(AtomicKind::Usint).is_err());
        assert!(AtomicValue::Lreal(f64::NAN).convert_to(AtomicKind::Dint).is_err());
    }

    #[test]
    fn test_bits_round_trip_signed() {
        let v = AtomicValue::Dint(-1);
        assert_eq!(v.to_bits(), 0xFFFF_FFFF);
        assert_eq!(AtomicValue::from_bits(AtomicKind::Dint, 0xFFFF_FFFF), v);
    }

    #[test]
    fn test_assign_preserves_kind_and_radix() {
        let slot = AtomicType::from_i32(0).with_radix(Radix::Hex).unwrap();
        let result = slot.assign(&AtomicType::from_i16(255)).unwrap();
        assert_eq!(result.kind(), AtomicKind::Dint);
        assert_eq!(result.radix(), Radix::Hex);
        assert_eq!(result.format(), "16#0000_00ff");
    }

    #[test]
    fn test_compare_across_kinds() {
        assert!(AtomicType::from_i32(5) > AtomicType::from_i8(4));
        assert!(AtomicType::from_f32(1.5) < AtomicType::from_i64(2));
    }

    #[test]
    fn test_float_radix_rejected_for_integers() {
        assert!(AtomicType::from_i32(1).with_radix(Radix::Float).is_err());
        assert!(AtomicType::from_f32(1.0).with_radix(Radix::Hex).is_err());
    }
}
