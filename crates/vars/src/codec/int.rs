//! Integer parsing and formatting.

use super::{lower, resolve_bit_size, underscore_ok};
use crate::error::{ValueError, ValueResult};

pub(crate) const FN_PARSE_INT: &str = "parse_int";
pub(crate) const FN_PARSE_UINT: &str = "parse_uint";

/// 64 binary digits plus a sign.
pub(crate) const SCRATCH_LEN: usize = 65;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const SMALLS: &[u8; 200] = b"\
    0001020304050607080910111213141516171819\
    2021222324252627282930313233343536373839\
    4041424344454647484950515253545556575859\
    6061626364656667686970717273747576777879\
    8081828384858687888990919293949596979899";

/// Parse an unsigned integer.
///
/// `base` is `0` (prefix driven: `0b`, `0o`, `0x`, leading `0` for octal,
/// `_` separators allowed) or `2..=36`. `bits` of `0` means the platform
/// width. The literals `true` and `false` read as `1` and `0`.
pub fn parse_uint(s: &str, base: u32, bits: u32) -> ValueResult<u64> {
    match s {
        "true" => Ok(1),
        "false" => Ok(0),
        _ => parse_uint_inner(s, base, bits, FN_PARSE_UINT, s),
    }
}

/// Parse a signed integer. Same rules as [`parse_uint`] plus an optional sign.
pub fn parse_int(s: &str, base: u32, bits: u32) -> ValueResult<i64> {
    match s {
        "true" => return Ok(1),
        "false" => return Ok(0),
        _ => {}
    }
    if s.is_empty() {
        return Err(ValueError::syntax(FN_PARSE_INT, s));
    }

    let (neg, digits) = match s.as_bytes()[0] {
        b'+' => (false, &s[1..]),
        b'-' => (true, &s[1..]),
        _ => (false, s),
    };

    let bits = resolve_bit_size(FN_PARSE_INT, s, bits)?;
    let un = parse_uint_inner(digits, base, bits, FN_PARSE_INT, s)?;

    let cutoff = 1u64 << (bits - 1);
    if !neg && un >= cutoff {
        return Err(ValueError::range(FN_PARSE_INT, s));
    }
    if neg && un > cutoff {
        return Err(ValueError::range(FN_PARSE_INT, s));
    }
    // `un == cutoff` with a sign is the minimum value; wrapping_neg covers i64::MIN.
    let n = un as i64;
    Ok(if neg { n.wrapping_neg() } else { n })
}

fn parse_uint_inner(
    s: &str,
    base: u32,
    bits: u32,
    func: &'static str,
    orig: &str,
) -> ValueResult<u64> {
    if s.is_empty() {
        return Err(ValueError::syntax(func, orig));
    }

    let base0 = base == 0;
    let mut digits = s.as_bytes();
    let base = match base {
        2..=36 => base,
        0 => {
            if digits[0] == b'0' {
                if digits.len() >= 3 && lower(digits[1]) == b'b' {
                    digits = &digits[2..];
                    2
                } else if digits.len() >= 3 && lower(digits[1]) == b'o' {
                    digits = &digits[2..];
                    8
                } else if digits.len() >= 3 && lower(digits[1]) == b'x' {
                    digits = &digits[2..];
                    16
                } else {
                    digits = &digits[1..];
                    8
                }
            } else {
                10
            }
        }
        _ => {
            return Err(ValueError::invalid(format!(
                "{func}: parsing {orig:?}: invalid base {base}"
            )))
        }
    };

    let bits = resolve_bit_size(func, orig, bits)?;
    let max_val = if bits == 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    };
    // Smallest n such that n * base overflows u64.
    let cutoff = u64::MAX / u64::from(base) + 1;

    let mut underscores = false;
    let mut n: u64 = 0;
    for &c in digits {
        let d = match c {
            b'_' if base0 => {
                underscores = true;
                continue;
            }
            b'0'..=b'9' => c - b'0',
            _ if lower(c).is_ascii_lowercase() => lower(c) - b'a' + 10,
            _ => return Err(ValueError::syntax(func, orig)),
        };
        if u32::from(d) >= base {
            return Err(ValueError::syntax(func, orig));
        }
        if n >= cutoff {
            return Err(ValueError::range(func, orig));
        }
        n *= u64::from(base);
        let n1 = n.wrapping_add(u64::from(d));
        if n1 < n || n1 > max_val {
            return Err(ValueError::range(func, orig));
        }
        n = n1;
    }

    if underscores && !underscore_ok(s) {
        return Err(ValueError::syntax(func, orig));
    }
    Ok(n)
}

/// Format a signed integer in `base` (2..=36).
pub fn format_int(i: i64, base: u32) -> ValueResult<String> {
    check_format_base(base)?;
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut out = String::new();
    append_int(&mut out, i, base, &mut scratch);
    Ok(out)
}

/// Format an unsigned integer in `base` (2..=36).
pub fn format_uint(u: u64, base: u32) -> ValueResult<String> {
    check_format_base(base)?;
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut out = String::new();
    append_uint(&mut out, u, base, &mut scratch);
    Ok(out)
}

fn check_format_base(base: u32) -> ValueResult<()> {
    if (2..=36).contains(&base) {
        Ok(())
    } else {
        Err(ValueError::invalid(format!("format: invalid base {base}")))
    }
}

/// `base` must already be in `2..=36`.
pub(crate) fn append_int(dst: &mut String, i: i64, base: u32, scratch: &mut [u8; SCRATCH_LEN]) {
    append_bits(dst, i.unsigned_abs(), base, i < 0, scratch);
}

/// `base` must already be in `2..=36`.
pub(crate) fn append_uint(dst: &mut String, u: u64, base: u32, scratch: &mut [u8; SCRATCH_LEN]) {
    append_bits(dst, u, base, false, scratch);
}

fn append_bits(dst: &mut String, mut u: u64, base: u32, neg: bool, a: &mut [u8; SCRATCH_LEN]) {
    let mut i = SCRATCH_LEN;

    if base == 10 {
        while u >= 100 {
            let is = (u % 100) as usize * 2;
            u /= 100;
            i -= 2;
            a[i + 1] = SMALLS[is + 1];
            a[i] = SMALLS[is];
        }
        let is = u as usize * 2;
        i -= 1;
        a[i] = SMALLS[is + 1];
        if u >= 10 {
            i -= 1;
            a[i] = SMALLS[is];
        }
    } else if base.is_power_of_two() {
        let shift = base.trailing_zeros();
        let b = u64::from(base);
        let mask = b - 1;
        while u >= b {
            i -= 1;
            a[i] = DIGITS[(u & mask) as usize];
            u >>= shift;
        }
        i -= 1;
        a[i] = DIGITS[u as usize];
    } else {
        let b = u64::from(base);
        while u >= b {
            i -= 1;
            let q = u / b;
            a[i] = DIGITS[(u - q * b) as usize];
            u = q;
        }
        i -= 1;
        a[i] = DIGITS[u as usize];
    }

    if neg {
        i -= 1;
        a[i] = b'-';
    }

    dst.extend(a[i..].iter().map(|&b| char::from(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_prefixes() {
        assert_eq!(parse_int("0b101", 0, 64), Ok(5));
        assert_eq!(parse_int("0o17", 0, 64), Ok(15));
        assert_eq!(parse_int("017", 0, 64), Ok(15));
        assert_eq!(parse_int("0x_dead_BEEF", 0, 64), Ok(0xdead_beef));
        assert_eq!(parse_int("-1_000", 0, 64), Ok(-1000));
        assert_eq!(parse_int("0", 0, 64), Ok(0));
        assert_eq!(parse_uint("zz", 36, 64), Ok(36 * 36 - 1));
    }

    #[test]
    fn underscores_need_base_zero() {
        assert!(parse_int("1_000", 10, 64).unwrap_err().is_syntax());
        assert!(parse_int("1__000", 0, 64).unwrap_err().is_syntax());
        assert!(parse_int("_1000", 0, 64).unwrap_err().is_syntax());
    }

    #[test]
    fn widths_and_ranges() {
        assert_eq!(parse_int("127", 10, 8), Ok(127));
        assert_eq!(parse_int("-128", 10, 8), Ok(-128));
        assert!(parse_int("128", 10, 8).unwrap_err().is_range());
        assert!(parse_int("-129", 10, 8).unwrap_err().is_range());
        assert_eq!(parse_int("-9223372036854775808", 10, 64), Ok(i64::MIN));
        assert!(parse_int("9223372036854775808", 10, 64).unwrap_err().is_range());
        assert_eq!(parse_uint("18446744073709551615", 10, 64), Ok(u64::MAX));
        assert!(parse_uint("18446744073709551616", 10, 64).unwrap_err().is_range());
        assert!(parse_uint("256", 10, 8).unwrap_err().is_range());
        assert!(parse_uint("-1", 10, 64).unwrap_err().is_syntax());
    }

    #[test]
    fn syntax_errors() {
        for s in ["", "-", "+", "12a", "0x", "1.0", " 1"] {
            assert!(parse_int(s, 0, 64).unwrap_err().is_syntax(), "{s:?}");
        }
        assert!(parse_int("9", 8, 64).unwrap_err().is_syntax());
    }

    #[test]
    fn bool_literals_read_as_bits() {
        assert_eq!(parse_int("true", 10, 64), Ok(1));
        assert_eq!(parse_uint("false", 10, 8), Ok(0));
    }

    #[test]
    fn bad_base_and_bit_size() {
        assert!(matches!(parse_int("1", 1, 64), Err(ValueError::Invalid { .. })));
        assert!(matches!(parse_uint("1", 37, 64), Err(ValueError::Invalid { .. })));
        assert!(matches!(parse_int("1", 10, 65), Err(ValueError::Invalid { .. })));
        assert!(format_int(1, 40).is_err());
    }

    #[test]
    fn formats_every_base() {
        assert_eq!(format_int(0, 10).unwrap(), "0");
        assert_eq!(format_int(-1234567, 10).unwrap(), "-1234567");
        assert_eq!(format_int(i64::MIN, 10).unwrap(), "-9223372036854775808");
        assert_eq!(format_uint(u64::MAX, 10).unwrap(), "18446744073709551615");
        assert_eq!(format_int(-255, 16).unwrap(), "-ff");
        assert_eq!(format_uint(u64::MAX, 2).unwrap(), "1".repeat(64));
        assert_eq!(format_int(i64::MIN, 2).unwrap().len(), 65);
        assert_eq!(format_int(35, 36).unwrap(), "z");
        assert_eq!(format_int(100, 7).unwrap(), "202");
    }
}
