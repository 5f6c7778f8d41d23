// crates/l5x-rs/src/data/radix.rs

//! Display radixes for atomic values and their text formats.

use super::atomic::{AtomicKind, AtomicValue};
use crate::values::{L5xValue, l5x_enum};
use core::fmt;
use core::str::FromStr;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

l5x_enum! {
    /// How an atomic value is written in L5X.
    pub enum Radix {
        NullType => "NullType",
        General => "General",
        Binary => "Binary",
        Octal => "Octal",
        Decimal => "Decimal",
        Hex => "Hex",
        Exponential => "Exponential",
        Float => "Float",
        Ascii => "ASCII",
        Unicode => "Unicode",
        DateTime => "Date/Time",
        DateTimeNs => "Date/Time (ns)",
    }
}

const BINARY_PREFIX: &str = "2#";
const OCTAL_PREFIX: &str = "8#";
const HEX_PREFIX: &str = "16#";
const DATE_TIME_PREFIX: &str = "DT#";
const DATE_TIME_NS_PREFIX: &str = "LDT#";

impl Radix {
    /// Whether values of `kind` can be displayed in this radix.
    pub fn supports(&self, kind: AtomicKind) -> bool {
        match self {
            Radix::NullType | Radix::General | Radix::Unicode => false,
            Radix::Float | Radix::Exponential => kind.is_float(),
            Radix::Decimal => true,
            Radix::Binary | Radix::Octal | Radix::Hex | Radix::Ascii => {
                !kind.is_float() && kind != AtomicKind::Bool
            }
            Radix::DateTime | Radix::DateTimeNs => kind == AtomicKind::Lint,
        }
    }

    /// Infers the radix of value text from its prefix and shape.
    pub fn infer(text: &str, kind: AtomicKind) -> Radix {
        let text = text.trim();
        if text.starts_with(BINARY_PREFIX) {
            Radix::Binary
        } else if text.starts_with(OCTAL_PREFIX) {
            Radix::Octal
        } else if text.starts_with(HEX_PREFIX) {
            Radix::Hex
        } else if text.starts_with('\'') {
            Radix::Ascii
        } else if text.starts_with(DATE_TIME_NS_PREFIX) {
            Radix::DateTimeNs
        } else if text.starts_with(DATE_TIME_PREFIX) {
            Radix::DateTime
        } else if kind.is_float() {
            if text.contains(['e', 'E']) && !is_special_float(text) {
                Radix::Exponential
            } else {
                Radix::Float
            }
        } else {
            Radix::Decimal
        }
    }

    /// Parses value text written in this radix into a value of `kind`.
    pub fn parse(&self, text: &str, kind: AtomicKind) -> Result<AtomicValue, String> {
        let text = text.trim();
        match self {
            Radix::Binary => parse_based(text, BINARY_PREFIX, 2, kind),
            Radix::Octal => parse_based(text, OCTAL_PREFIX, 8, kind),
            Radix::Hex => parse_based(text, HEX_PREFIX, 16, kind),
            Radix::Ascii => parse_ascii(text, kind),
            Radix::DateTime => parse_date_time(text, DATE_TIME_PREFIX, 6, kind),
            Radix::DateTimeNs => parse_date_time(text, DATE_TIME_NS_PREFIX, 9, kind),
            Radix::Float | Radix::Exponential => parse_float(text, kind),
            Radix::Decimal | Radix::General | Radix::NullType | Radix::Unicode => {
                if kind.is_float() {
                    return parse_float(text, kind);
                }
                let value = text
                    .parse::<i128>()
                    .map_err(|e| format!("'{}' is not a decimal integer: {}", text, e))?;
                AtomicValue::from_integer(kind, value).map_err(|e| e.to_string())
            }
        }
    }

    /// Formats `value` in this radix. Radixes that do not apply to the value's
    /// kind fall back to the kind's default.
    pub fn format(&self, value: &AtomicValue) -> String {
        let kind = value.kind();
        if !self.supports(kind) {
            return kind.default_radix().format(value);
        }
        match self {
            Radix::Binary => format_based(value, BINARY_PREFIX, 2, 4),
            Radix::Octal => format_based(value, OCTAL_PREFIX, 8, 3),
            Radix::Hex => format_based(value, HEX_PREFIX, 16, 4),
            Radix::Ascii => format_ascii(value),
            Radix::Float => format_float(value),
            Radix::Exponential => format_exponential(value.as_f64()),
            Radix::DateTime => format_date_time(value, DATE_TIME_PREFIX, 6),
            Radix::DateTimeNs => format_date_time(value, DATE_TIME_NS_PREFIX, 9),
            _ => match value {
                AtomicValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
                other => other.as_integer().unwrap_or_default().to_string(),
            },
        }
    }
}

fn is_special_float(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("inf") || lower.contains("nan")
}

fn parse_based(text: &str, prefix: &str, base: u32, kind: AtomicKind) -> Result<AtomicValue, String> {
    let digits: String = text
        .strip_prefix(prefix)
        .ok_or_else(|| format!("'{}' does not start with '{}'", text, prefix))?
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let bits = u128::from_str_radix(&digits, base).map_err(|e| format!("'{}': {}", text, e))?;
    if bits >> kind.bits() != 0 {
        return Err(format!("'{}' does not fit in {}", text, kind));
    }
    Ok(AtomicValue::from_bits(kind, bits as u64))
}

fn format_based(value: &AtomicValue, prefix: &str, base: u32, group: usize) -> String {
    let bits = value.kind().bits();
    let digits_per = match base {
        2 => 1,
        8 => 3,
        _ => 4,
    };
    let width = (bits as usize).div_ceil(digits_per);
    let raw = value.to_bits();
    let digits = match base {
        2 => format!("{:0width$b}", raw, width = width),
        8 => format!("{:0width$o}", raw, width = width),
        _ => format!("{:0width$x}", raw, width = width),
    };
    format!("{}{}", prefix, group_digits(&digits, group))
}

/// Inserts `_` every `group` digits counting from the right.
fn group_digits(digits: &str, group: usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / group);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % group == 0 {
            out.push('_');
        }
        out.push(*c);
    }
    out
}

fn parse_ascii(text: &str, kind: AtomicKind) -> Result<AtomicValue, String> {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(|| format!("'{}' is not a quoted ASCII value", text))?;
    let bytes = unescape(inner)?
        .chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| format!("'{}' is not a single byte", c)))
        .collect::<Result<Vec<u8>, String>>()?;
    if bytes.len() > kind.bytes() {
        return Err(format!("'{}' does not fit in {}", text, kind));
    }
    let bits = bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
    Ok(AtomicValue::from_bits(kind, bits))
}

fn format_ascii(value: &AtomicValue) -> String {
    let size = value.kind().bytes();
    let raw = value.to_bits();
    let text: String = (0..size)
        .rev()
        .map(|i| ((raw >> (i * 8)) & 0xFF) as u8 as char)
        .collect();
    format!("'{}'", escape(&text))
}

/// Decodes Logix `$` escapes. `$hh` yields the character with code `hh`;
/// every other character is taken as is.
pub(crate) fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('$') => out.push('$'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('N' | 'n' | 'L' | 'l') => out.push('\n'),
            Some('R' | 'r') => out.push('\r'),
            Some('T' | 't') => out.push('\t'),
            Some('P' | 'p') => out.push('\u{0C}'),
            Some(high) if high.is_ascii_hexdigit() => {
                let low = chars
                    .next()
                    .filter(char::is_ascii_hexdigit)
                    .ok_or_else(|| format!("incomplete escape '${}' in '{}'", high, text))?;
                let pair = format!("{}{}", high, low);
                out.push(char::from(u8::from_str_radix(&pair, 16).map_err(|e| e.to_string())?));
            }
            Some(other) => return Err(format!("unknown escape '${}' in '{}'", other, text)),
            None => return Err(format!("dangling '$' in '{}'", text)),
        }
    }
    Ok(out)
}

/// Encodes text with Logix `$` escapes. Non-printable single-byte characters
/// become `$hh`; characters beyond one byte are written unchanged.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '$' => out.push_str("$$"),
            '\'' => out.push_str("$'"),
            '\n' => out.push_str("$N"),
            '\r' => out.push_str("$R"),
            '\t' => out.push_str("$T"),
            '\u{0C}' => out.push_str("$P"),
            ' '..='~' => out.push(c),
            '\u{00}'..='\u{FF}' => out.push_str(&format!("${:02X}", u32::from(c))),
            other => out.push(other),
        }
    }
    out
}

fn parse_float(text: &str, kind: AtomicKind) -> Result<AtomicValue, String> {
    let value = text
        .parse::<f64>()
        .map_err(|e| format!("'{}' is not a number: {}", text, e))?;
    AtomicValue::from_float(kind, value).map_err(|e| e.to_string())
}

fn format_float(value: &AtomicValue) -> String {
    let text = match value {
        AtomicValue::Real(v) => v.to_string(),
        other => other.as_f64().to_string(),
    };
    if text.contains(['.', 'e', 'N', 'i']) {
        text
    } else {
        format!("{}.0", text)
    }
}

/// `d.dddddddde+ddd`, the layout Logix uses for exponential values.
fn format_exponential(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let raw = format!("{:.8e}", value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:03}", mantissa, sign, exponent.abs())
}

fn parse_date_time(text: &str, prefix: &str, digits: u32, kind: AtomicKind) -> Result<AtomicValue, String> {
    if kind != AtomicKind::Lint {
        return Err(format!("date/time values require LINT, not {}", kind));
    }
    let body = text
        .strip_prefix(prefix)
        .ok_or_else(|| format!("'{}' does not start with '{}'", text, prefix))?;
    let body = body.strip_suffix('Z').unwrap_or(body);
    let (stamp, fraction) = body.split_once('.').unwrap_or((body, "0"));
    let format = format_description!("[year]-[month]-[day]-[hour]:[minute]:[second]");
    let seconds = PrimitiveDateTime::parse(stamp, format)
        .map_err(|e| format!("'{}': {}", text, e))?
        .assume_utc()
        .unix_timestamp();

    let fraction: String = fraction.chars().filter(|c| *c != '_').collect();
    if fraction.len() > digits as usize || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' has an invalid fractional second", text));
    }
    let padded = format!("{:0<width$}", fraction, width = digits as usize);
    let fraction: i64 = padded.parse().map_err(|e| format!("'{}': {}", text, e))?;
    let scale = 10i64.pow(digits);
    seconds
        .checked_mul(scale)
        .and_then(|s| s.checked_add(fraction))
        .map(AtomicValue::Lint)
        .ok_or_else(|| format!("'{}' is out of range", text))
}

fn format_date_time(value: &AtomicValue, prefix: &str, digits: u32) -> String {
    let ticks = value.as_integer().unwrap_or_default() as i64;
    let scale = 10i64.pow(digits);
    let seconds = ticks.div_euclid(scale);
    let fraction = ticks.rem_euclid(scale);
    let format = format_description!("[year]-[month]-[day]-[hour]:[minute]:[second]");
    let stamp = OffsetDateTime::from_unix_timestamp(seconds)
        .ok()
        .and_then(|dt| dt.format(format).ok());
    let Some(stamp) = stamp else {
        return ticks.to_string();
    };
    let fraction = format!("{:0width$}", fraction, width = digits as usize);
    let grouped = fraction
        .as_bytes()
        .chunks(3)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("_");
    let suffix = if prefix == DATE_TIME_PREFIX { "Z" } else { "" };
    format!("{}{}.{}{}", prefix, stamp, grouped, suffix)
}
