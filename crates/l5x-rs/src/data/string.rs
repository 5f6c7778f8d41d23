// crates/l5x-rs/src/data/string.rs

use super::array::ArrayType;
use super::atomic::{AtomicKind, AtomicType, AtomicValue};
use super::radix::{Radix, escape, unescape};
use super::{LogixType, Member};
use crate::error::L5xError;
use core::fmt;

/// Name of the predefined string type.
pub const STRING: &str = "STRING";
/// Character capacity of the predefined string type.
pub const DEFAULT_CAPACITY: usize = 82;
/// Member holding the character count.
pub const LEN: &str = "LEN";
/// Member holding the characters.
pub const DATA: &str = "DATA";

/// A string value of a named string type.
///
/// Each character stands for one byte of the stored string; lengths and
/// capacities count characters. Exposes synthesized `LEN` (DINT) and `DATA` (SINT array) members so the
/// set cascade can treat it like the structure it is stored as.
#[derive(Debug, Clone, PartialEq)]
pub struct StringType {
    name: String,
    text: String,
    capacity: usize,
}

impl StringType {
    /// A `STRING` holding `text`. Text longer than 82 characters is kept; the
    /// capacity grows to fit it.
    pub fn new(text: &str) -> StringType {
        StringType {
            name: STRING.to_string(),
            text: text.to_string(),
            capacity: DEFAULT_CAPACITY.max(text.chars().count()),
        }
    }

    /// A value of a custom string type with a fixed capacity.
    pub fn with_type(name: &str, capacity: usize, text: &str) -> Result<StringType, L5xError> {
        let value = StringType {
            name: name.to_string(),
            text: String::new(),
            capacity,
        };
        value.with_text(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A copy holding `text`, failing when it exceeds the capacity.
    pub fn with_text(&self, text: &str) -> Result<StringType, L5xError> {
        let len = text.chars().count();
        if len > self.capacity {
            return Err(L5xError::ValueOutOfRange {
                data_type: self.name.clone(),
                value: format!("{} characters (capacity {})", len, self.capacity),
            });
        }
        Ok(StringType {
            text: text.to_string(),
            ..self.clone()
        })
    }

    /// The `'quoted'` literal with `$` escapes, as stored in L5X.
    pub fn to_literal(&self) -> String {
        format!("'{}'", escape(&self.text))
    }

    /// Parses a `'quoted'` literal. Unquoted text is taken as is.
    pub fn parse_literal(literal: &str) -> Result<String, L5xError> {
        let trimmed = literal.trim();
        let inner = trimmed
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
            .unwrap_or(trimmed);
        unescape(inner).map_err(|reason| L5xError::Conversion {
            element: STRING.into(),
            property: DATA.into(),
            value: literal.to_string(),
            reason,
        })
    }

    /// `LEN` and `DATA` as they appear in the structure form.
    pub fn members(&self) -> Vec<Member> {
        let len = i32::try_from(self.len()).unwrap_or(i32::MAX);
        // Characters wider than a byte have no SINT form.
        let mut chars: Vec<LogixType> = self
            .text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .map(|b| LogixType::Atomic(ascii_sint(b as i8)))
            .collect();
        chars.resize(self.capacity, LogixType::Atomic(ascii_sint(0)));
        let data = ArrayType::from_values(AtomicKind::Sint.as_str(), chars)
            .map(LogixType::Array)
            .unwrap_or(LogixType::Null);
        vec![
            Member::new(LEN, LogixType::Atomic(AtomicType::from_i32(len))),
            Member::new(DATA, data),
        ]
    }

    /// Reads text back out of a `DATA` member: either a string literal or a
    /// SINT array terminated by `LEN` or the first zero.
    pub(crate) fn text_from_data(data: &LogixType, len: Option<usize>) -> Option<String> {
        match data {
            LogixType::String(s) => Some(s.text.clone()),
            LogixType::Array(array) => {
                let bytes: Vec<u8> = array
                    .elements()
                    .iter()
                    .map_while(|m| match &m.value {
                        LogixType::Atomic(a) => Some(a.value().to_bits() as u8),
                        _ => None,
                    })
                    .collect();
                let end = len
                    .unwrap_or_else(|| bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len()))
                    .min(bytes.len());
                Some(bytes[..end].iter().map(|b| *b as char).collect())
            }
            _ => None,
        }
    }
}

fn ascii_sint(value: i8) -> AtomicType {
    AtomicType::new(AtomicValue::Sint(value))
        .with_radix(Radix::Ascii)
        .unwrap_or_else(|_| AtomicType::from_i8(value))
}

impl Default for StringType {
    fn default() -> Self {
        StringType::new("")
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_enforced() {
        let s = StringType::with_type("STRING_20", 20, "short").unwrap();
        assert_eq!(s.capacity(), 20);
        let long = "x".repeat(21);
        assert!(matches!(s.with_text(&long), Err(L5xError::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_literal_escapes() {
        let s = StringType::new("it's $5\n");
        assert_eq!(s.to_literal(), "'it$'s $$5$N'");
        assert_eq!(StringType::parse_literal("'it$'s $$5$N'").unwrap(), "it's $5\n");
        assert_eq!(StringType::parse_literal("'$41$42'").unwrap(), "AB");
    }

    #[test]
    fn test_non_ascii_text_survives_literal_round_trip() {
        let text = StringType::parse_literal("'Café'").unwrap();
        assert_eq!(text, "Café");
        let s = StringType::new(&text);
        assert_eq!(s.len(), 4);
        assert_eq!(s.to_literal(), "'Caf$E9'");
        assert_eq!(StringType::parse_literal(&s.to_literal()).unwrap(), "Café");
        assert!(StringType::with_type("STRING_4", 4, "Café").is_ok());
    }

    #[test]
    fn test_synthesized_members() {
        let s = StringType::new("Hi");
        let members = s.members();
        assert_eq!(members[0].name(), LEN);
        assert_eq!(members[0].value().as_atomic().map(|a| a.format()), Some("2".into()));
        let data = members[1].value().as_array().unwrap();
        assert_eq!(data.len(), DEFAULT_CAPACITY);
        assert_eq!(data.elements()[0].value().as_atomic().unwrap().format(), "'H'");
    }

    #[test]
    fn test_text_from_sint_array() {
        let s = StringType::new("Hey");
        let data = s.members().remove(1);
        assert_eq!(StringType::text_from_data(data.value(), None).as_deref(), Some("Hey"));
        assert_eq!(StringType::text_from_data(data.value(), Some(2)).as_deref(), Some("He"));
    }
}
