//! Numeric codec.
//!
//! Text ⇄ number routines for every numeric and boolean kind. Parsing accepts
//! base prefixes and `_` separators, and reports overflow as
//! [`ValueError::Range`] and malformed numeric input as [`ValueError::Syntax`].
//! Floats are rendered with the shortest digit string that parses back to
//! the same bits; the [`Decimal`] engine does the exact arithmetic behind
//! both directions.
//!
//! ```rust
//! use sdk_vars::codec::{self, FloatFormat};
//!
//! assert_eq!(codec::parse_int("-0x_1F", 0, 64).unwrap(), -31);
//! assert_eq!(codec::format_float(0.1, FloatFormat::General, -1, 64), "0.1");
//! assert_eq!(codec::format_float(1e21, FloatFormat::General, -1, 64), "1e+21");
//! assert_eq!(codec::format_float(f64::from(1000000000.5_f32), FloatFormat::General, -1, 32), "1e+09");
//! ```

mod atof;
mod complex;
mod decimal;
mod ftoa;
mod int;

pub use atof::{parse_float, parse_float_prefix};
pub use complex::{format_complex, parse_complex, Complex128, Complex64};
pub use decimal::Decimal;
pub use ftoa::{format_float, FloatFormat};
pub use int::{format_int, format_uint, parse_int, parse_uint};

pub(crate) use complex::append_complex;
pub(crate) use ftoa::append_float;
pub(crate) use int::{append_int, append_uint, SCRATCH_LEN};

use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;

/// Parse a boolean literal.
///
/// Accepts `1 t T true TRUE True` and `"" 0 f F false FALSE False`.
/// Anything else is a [`ValueError::Conv`] from `string` to `bool`.
pub fn parse_bool(s: &str) -> ValueResult<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::conv(Kind::String, Kind::Bool, s)),
    }
}

/// Canonical boolean literal.
pub const fn format_bool(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

#[inline]
pub(crate) const fn lower(c: u8) -> u8 {
    c | (b'x' - b'X')
}

/// Checks `_` placement in a literal that contained underscores: each one
/// must sit between digits, or between a base prefix and a digit.
pub(crate) fn underscore_ok(s: &str) -> bool {
    let mut s = s.as_bytes();
    // '^' start, '0' digit or prefix, '_' underscore, '!' anything else
    let mut saw = b'^';
    let mut i = 0;

    if let [b'-' | b'+', rest @ ..] = s {
        s = rest;
    }

    let mut hex = false;
    if s.len() >= 2 && s[0] == b'0' && matches!(lower(s[1]), b'b' | b'o' | b'x') {
        i = 2;
        saw = b'0';
        hex = lower(s[1]) == b'x';
    }

    while i < s.len() {
        let c = s[i];
        i += 1;
        if c.is_ascii_digit() || (hex && (b'a'..=b'f').contains(&lower(c))) {
            saw = b'0';
            continue;
        }
        if c == b'_' {
            if saw != b'0' {
                return false;
            }
            saw = b'_';
            continue;
        }
        if saw == b'_' {
            return false;
        }
        saw = b'!';
    }
    saw != b'_'
}

/// Resolve a requested bit size; `0` means the platform width.
pub(crate) fn resolve_bit_size(func: &'static str, input: &str, bits: u32) -> ValueResult<u32> {
    match bits {
        0 => Ok(usize::BITS),
        1..=64 => Ok(bits),
        _ => Err(ValueError::invalid(format!(
            "{func}: parsing {input:?}: invalid bit size {bits}"
        ))),
    }
}
