// crates/l5x-rs/src/values.rs

//! String conversions for attribute values.
//!
//! Every type that can be stored in an L5X attribute implements [`L5xValue`].
//! The trait is the conversion registry: element helpers look up the
//! conversion through the requested type instead of through runtime reflection.

use core::fmt;
use core::str::FromStr;
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Conversion between an attribute string and a typed value.
pub trait L5xValue: Sized {
    /// Parses the attribute text. The error is a human readable reason.
    fn parse_l5x(text: &str) -> Result<Self, String>;

    /// Formats the value as attribute text.
    fn to_l5x(&self) -> String;
}

impl L5xValue for String {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn to_l5x(&self) -> String {
        self.clone()
    }
}

impl L5xValue for bool {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(true),
            t if t.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(format!("'{}' is not a boolean", other)),
        }
    }

    fn to_l5x(&self) -> String {
        if *self { "true".into() } else { "false".into() }
    }
}

macro_rules! l5x_value_from_str {
    ($($typ:ty),*) => {
        $(
            impl L5xValue for $typ {
                fn parse_l5x(text: &str) -> Result<Self, String> {
                    text.trim().parse::<$typ>().map_err(|e| e.to_string())
                }

                fn to_l5x(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

l5x_value_from_str!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

/// Declares an enum whose variants map one-to-one to fixed L5X literals.
macro_rules! l5x_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The literal used for this variant in L5X files.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!("'{}' is not a valid {}", s, stringify!($name)))
            }
        }

        impl L5xValue for $name {
            fn parse_l5x(text: &str) -> Result<Self, String> {
                text.parse()
            }

            fn to_l5x(&self) -> String {
                self.as_str().to_string()
            }
        }
    };
}

pub(crate) use l5x_enum;

l5x_enum! {
    /// External (HMI/OPC) access to a tag or member.
    pub enum ExternalAccess {
        ReadWrite => "Read/Write",
        ReadOnly => "Read Only",
        None => "None",
    }
}

l5x_enum! {
    /// Whether a tag holds its own data or refers to another tag.
    pub enum TagType {
        Base => "Base",
        Alias => "Alias",
        Produced => "Produced",
        Consumed => "Consumed",
    }
}

l5x_enum! {
    /// How a tag or parameter is used by its owner.
    pub enum TagUsage {
        Input => "Input",
        Output => "Output",
        InOut => "InOut",
        Local => "Local",
        Public => "Public",
        Static => "Static",
    }
}

l5x_enum! {
    /// Data type family; string types are flagged so the editor treats them as text.
    pub enum DataTypeFamily {
        NoFamily => "NoFamily",
        StringFamily => "StringFamily",
    }
}

l5x_enum! {
    pub enum DataTypeClass {
        Atomic => "Atomic",
        Predefined => "Predefined",
        ProductDefined => "ProductDefined",
        User => "User",
        IO => "IO",
    }
}

l5x_enum! {
    pub enum ProgramType {
        Normal => "Normal",
        EquipmentPhase => "EquipmentPhase",
        EquipmentSequence => "EquipmentSequence",
    }
}

l5x_enum! {
    /// Programming language of a routine.
    pub enum RoutineType {
        Rll => "RLL",
        St => "ST",
        Fbd => "FBD",
        Sfc => "SFC",
        Typeless => "Typeless",
    }
}

l5x_enum! {
    pub enum TaskType {
        Continuous => "CONTINUOUS",
        Periodic => "PERIODIC",
        Event => "EVENT",
    }
}

l5x_enum! {
    pub enum RungType {
        Normal => "N",
        Insert => "I",
        Delete => "D",
        ReplaceInsert => "rI",
        ReplaceDelete => "rD",
    }
}

// --- Dimensions ---

/// Array dimensions: up to three lengths, outermost first. Empty means scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Dimensions(Vec<usize>);

impl Dimensions {
    /// A scalar (no dimensions).
    pub fn empty() -> Self {
        Dimensions(Vec::new())
    }

    /// Creates dimensions from lengths, outermost first.
    ///
    /// At most three dimensions are allowed and none may be zero.
    pub fn new(lengths: &[usize]) -> Result<Self, String> {
        if lengths.len() > 3 {
            return Err(format!("{} dimensions exceed the maximum of 3", lengths.len()));
        }
        if lengths.iter().any(|&l| l == 0) {
            return Err("dimension length must be greater than zero".into());
        }
        Ok(Dimensions(lengths.to_vec()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements; zero for a scalar.
    pub fn len(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.iter().product()
        }
    }

    /// Every index in row-major order, formatted the way L5X writes them (`[0]`, `[1,2]`).
    pub fn indices(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len());
        if self.0.is_empty() {
            return out;
        }
        let mut current = vec![0usize; self.0.len()];
        loop {
            out.push(format_index(&current));
            // Odometer increment from the innermost dimension.
            let mut dim = self.0.len();
            loop {
                if dim == 0 {
                    return out;
                }
                dim -= 1;
                current[dim] += 1;
                if current[dim] < self.0[dim] {
                    break;
                }
                current[dim] = 0;
            }
        }
    }
}

fn format_index(index: &[usize]) -> String {
    let parts: Vec<String> = index.iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(","))
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("0");
        }
        let parts: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        f.write_str(&parts.join(" "))
    }
}

impl L5xValue for Dimensions {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        let lengths = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<usize>().map_err(|e| format!("'{}': {}", s, e)))
            .collect::<Result<Vec<_>, _>>()?;
        if lengths.iter().all(|&l| l == 0) {
            return Ok(Dimensions::empty());
        }
        Dimensions::new(&lengths)
    }

    fn to_l5x(&self) -> String {
        self.to_string()
    }
}

// --- Revision ---

/// A `major.minor` revision such as `32.11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision {
    pub major: u16,
    pub minor: u16,
}

impl Revision {
    pub fn new(major: u16, minor: u16) -> Self {
        Revision { major, minor }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl L5xValue for Revision {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        let (major, minor) = text.trim().split_once('.').unwrap_or((text.trim(), "0"));
        let major = major.parse::<u16>().map_err(|e| format!("major '{}': {}", major, e))?;
        let minor = minor.parse::<u16>().map_err(|e| format!("minor '{}': {}", minor, e))?;
        Ok(Revision { major, minor })
    }

    fn to_l5x(&self) -> String {
        self.to_string()
    }
}

// --- Timestamps ---

/// Export, creation and edit timestamps: `ddd MMM d HH:mm:ss yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogixDateTime(pub PrimitiveDateTime);

impl L5xValue for LogixDateTime {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        let format = format_description!(
            "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [year]"
        );
        // Some exporters pad single digit days with a second space.
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        PrimitiveDateTime::parse(&normalized, format)
            .map(LogixDateTime)
            .map_err(|e| e.to_string())
    }

    fn to_l5x(&self) -> String {
        let format = format_description!(
            "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [year]"
        );
        self.0.format(format).unwrap_or_default()
    }
}

/// Add-On Instruction created/edited timestamps: `yyyy-MM-ddTHH:mm:ss.fffZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AoiTimestamp(pub PrimitiveDateTime);

impl L5xValue for AoiTimestamp {
    fn parse_l5x(text: &str) -> Result<Self, String> {
        let format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        PrimitiveDateTime::parse(text.trim(), format)
            .map(AoiTimestamp)
            .map_err(|e| e.to_string())
    }

    fn to_l5x(&self) -> String {
        let format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        self.0.format(format).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_bool_is_case_insensitive() {
        assert_eq!(bool::parse_l5x("TRUE"), Ok(true));
        assert_eq!(bool::parse_l5x("false"), Ok(false));
        assert!(bool::parse_l5x("1").is_err());
        assert_eq!(true.to_l5x(), "true");
    }

    #[test]
    fn test_enum_literals() {
        assert_eq!(ExternalAccess::parse_l5x("Read/Write"), Ok(ExternalAccess::ReadWrite));
        assert_eq!(ExternalAccess::ReadOnly.to_l5x(), "Read Only");
        assert_eq!(RoutineType::parse_l5x("RLL"), Ok(RoutineType::Rll));
        assert!(TaskType::parse_l5x("Sometimes").is_err());
    }

    #[test]
    fn test_dimensions_parse_and_format() {
        let dims = Dimensions::parse_l5x("2 3").unwrap();
        assert_eq!(dims.lengths(), &[2, 3]);
        assert_eq!(dims.len(), 6);
        assert_eq!(dims.to_l5x(), "2 3");
        assert!(Dimensions::parse_l5x("0").unwrap().is_empty());
        assert!(Dimensions::parse_l5x("1 2 3 4").is_err());
    }

    #[test]
    fn test_dimension_indices_are_row_major() {
        let dims = Dimensions::new(&[2, 2]).unwrap();
        assert_eq!(dims.indices(), ["[0,0]", "[0,1]", "[1,0]", "[1,1]"]);
        assert_eq!(Dimensions::new(&[3]).unwrap().indices(), ["[0]", "[1]", "[2]"]);
        assert!(Dimensions::empty().indices().is_empty());
    }

    #[test]
    fn test_revision() {
        assert_eq!(Revision::parse_l5x("32.11"), Ok(Revision::new(32, 11)));
        assert_eq!(Revision::parse_l5x("1.001"), Ok(Revision::new(1, 1)));
        assert_eq!(Revision::new(20, 3).to_l5x(), "20.3");
        assert!(Revision::parse_l5x("x.1").is_err());
    }

    #[test]
    fn test_logix_date_time() {
        let parsed = LogixDateTime::parse_l5x("Mon Jan 2 15:04:05 2006").unwrap();
        assert_eq!(parsed.0, datetime!(2006-01-02 15:04:05));
        assert_eq!(parsed.to_l5x(), "Mon Jan 2 15:04:05 2006");
        assert!(LogixDateTime::parse_l5x("2006-01-02").is_err());
    }

    #[test]
    fn test_aoi_timestamp() {
        let parsed = AoiTimestamp::parse_l5x("2021-11-29T14:43:26.123Z").unwrap();
        assert_eq!(parsed.0, datetime!(2021-11-29 14:43:26.123));
        assert_eq!(parsed.to_l5x(), "2021-11-29T14:43:26.123Z");
    }
}
