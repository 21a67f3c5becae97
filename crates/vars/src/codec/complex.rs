//! Complex numbers.

use std::fmt::{self, Display, Formatter};

use super::atof::parse_float_prefix;
use super::{format_float, parse_float, FloatFormat};
use crate::error::{ValueError, ValueResult};

pub(crate) const FN_PARSE_COMPLEX: &str = "parse_complex";

/// Complex number with `f64` parts.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Complex128 {
    pub re: f64,
    pub im: f64,
}

/// Complex number with `f32` parts.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Complex64 {
    pub re: f32,
    pub im: f32,
}

impl Complex128 {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl Complex64 {
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

impl From<Complex64> for Complex128 {
    fn from(c: Complex64) -> Self {
        Self::new(f64::from(c.re), f64::from(c.im))
    }
}

impl From<Complex128> for Complex64 {
    fn from(c: Complex128) -> Self {
        Self::new(c.re as f32, c.im as f32)
    }
}

impl Display for Complex128 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_complex(*self, FloatFormat::General, -1, 128))
    }
}

impl Display for Complex64 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_complex((*self).into(), FloatFormat::General, -1, 64))
    }
}

/// Parse a complex literal. `bits` is 64 (`f32` parts) or 128.
///
/// Accepts `N`, `Ni`, `N±Ni`, optionally wrapped in parentheses, where each
/// `N` is a float literal including `inf` and `nan`. When that fails, two
/// whitespace-separated floats are read as the real and imaginary parts.
///
/// ```rust
/// use sdk_vars::codec::{parse_complex, Complex128};
///
/// assert_eq!(parse_complex("(1+2i)", 128).unwrap(), Complex128::new(1.0, 2.0));
/// assert_eq!(parse_complex("-3i", 128).unwrap(), Complex128::new(0.0, -3.0));
/// assert_eq!(parse_complex("1.5 -2", 128).unwrap(), Complex128::new(1.5, -2.0));
/// ```
pub fn parse_complex(s: &str, bits: u32) -> ValueResult<Complex128> {
    let size = match bits {
        64 => 32,
        128 => 64,
        _ => {
            return Err(ValueError::invalid(format!(
                "{FN_PARSE_COMPLEX}: parsing {s:?}: invalid bit size {bits}"
            )))
        }
    };

    match parse_literal(s, size) {
        Err(err) if err.is_syntax() => parse_pair(s, size).ok_or(err),
        result => result,
    }
}

fn parse_literal(orig: &str, size: u32) -> ValueResult<Complex128> {
    let syntax = || ValueError::syntax(FN_PARSE_COMPLEX, orig);
    let read = |s: &str| match parse_float_prefix(s, size) {
        Ok(parsed) => Ok(parsed),
        Err(err) if err.is_range() => Err(ValueError::range(FN_PARSE_COMPLEX, orig)),
        Err(_) => Err(syntax()),
    };

    let mut s = orig;
    if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        s = &s[1..s.len() - 1];
    }

    // Real part, or the imaginary part when followed by a lone 'i'.
    let (re, n) = read(s)?;
    s = &s[n..];

    match s.as_bytes() {
        [] => return Ok(Complex128::new(re, 0.0)),
        [b'i'] => return Ok(Complex128::new(0.0, re)),
        // Keep the sign on "-" for the imaginary read; drop a lone "+" so
        // "+NaNi" parses, but leave "++" to fail.
        [b'+', next, ..] if *next != b'+' => s = &s[1..],
        [b'+' | b'-', ..] => {}
        _ => return Err(syntax()),
    }

    let (im, n) = read(s)?;
    if &s[n..] != "i" {
        return Err(syntax());
    }
    Ok(Complex128::new(re, im))
}

fn parse_pair(s: &str, size: u32) -> Option<Complex128> {
    let mut parts = s.split_whitespace();
    let re = parse_float(parts.next()?, size).ok()?;
    let im = parse_float(parts.next()?, size).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Complex128::new(re, im))
}

/// Format `c` as `(re±imi)`. `bits` of 64 formats both parts as `f32`.
pub fn format_complex(c: Complex128, fmt: FloatFormat, prec: i32, bits: u32) -> String {
    let mut out = String::with_capacity(48);
    append_complex(&mut out, c, fmt, prec, bits);
    out
}

pub(crate) fn append_complex(
    dst: &mut String,
    c: Complex128,
    fmt: FloatFormat,
    prec: i32,
    bits: u32,
) {
    let size = if bits == 64 { 32 } else { 64 };
    dst.push('(');
    dst.push_str(&format_float(c.re, fmt, prec, size));
    let im = format_float(c.im, fmt, prec, size);
    if !im.starts_with(['+', '-']) {
        dst.push('+');
    }
    dst.push_str(&im);
    dst.push_str("i)");
}
