//! Float parsing.
//!
//! Short decimal literals are converted with exact float arithmetic; the
//! rest go through the [`Decimal`] engine, which is exact and therefore
//! always yields the correctly rounded result.

use super::decimal::{F32_INFO, F64_INFO, FloatInfo};
use super::{lower, underscore_ok, Decimal};
use crate::error::{ValueError, ValueResult};

pub(crate) const FN_PARSE_FLOAT: &str = "parse_float";

const F64_POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];
const F32_POW10: [f32; 11] = [1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10];

/// Parse a float literal of the given width (32 or 64).
///
/// Accepts decimal (`1.5e-3`, `_` separators), hexadecimal mantissa with a
/// binary exponent (`0x1.8p1`), `inf`/`infinity` with an optional sign and
/// `nan`, case-insensitively. The whole input must be consumed.
pub fn parse_float(s: &str, bits: u32) -> ValueResult<f64> {
    let (f, n) = parse_float_prefix(s, bits)?;
    if n != s.len() {
        return Err(ValueError::syntax(FN_PARSE_FLOAT, s));
    }
    Ok(f)
}

/// Parse the longest float literal at the start of `s`, returning the value
/// and the number of bytes consumed.
pub fn parse_float_prefix(s: &str, bits: u32) -> ValueResult<(f64, usize)> {
    let flt = match bits {
        32 => F32_INFO,
        64 => F64_INFO,
        _ => {
            return Err(ValueError::invalid(format!(
                "{FN_PARSE_FLOAT}: parsing {s:?}: invalid bit size {bits}"
            )))
        }
    };

    if let Some((val, n)) = special(s) {
        let val = if bits == 32 { f64::from(val as f32) } else { val };
        return Ok((val, n));
    }

    let Some(lit) = read_float(s) else {
        return Err(ValueError::syntax(FN_PARSE_FLOAT, s));
    };
    let n = lit.consumed;

    if lit.hex {
        return atof_hex(s, flt, &lit).map(|f| (f, n));
    }

    if !lit.trunc {
        let exact = if bits == 32 {
            atof32_exact(lit.mantissa, lit.exp, lit.neg).map(f64::from)
        } else {
            atof64_exact(lit.mantissa, lit.exp, lit.neg)
        };
        if let Some(f) = exact {
            return Ok((f, n));
        }
    }

    let mut d = Decimal::new();
    if !d.set(&s[..n]) {
        return Err(ValueError::syntax(FN_PARSE_FLOAT, s));
    }
    let (b, overflow) = d.float_bits(flt);
    if overflow {
        return Err(ValueError::range(FN_PARSE_FLOAT, s));
    }
    let f = if bits == 32 {
        f64::from(f32::from_bits(b as u32))
    } else {
        f64::from_bits(b)
    };
    Ok((f, n))
}

/// Length of the case-insensitive common prefix of `s` and `prefix`.
fn common_prefix_len_ignore_case(s: &[u8], prefix: &[u8]) -> usize {
    s.iter()
        .zip(prefix)
        .take_while(|(a, b)| lower(**a) == **b)
        .count()
}

/// `[+-]inf`, `[+-]infinity` and `nan`.
fn special(s: &str) -> Option<(f64, usize)> {
    let b = s.as_bytes();
    let (sign, nsign, rest) = match b.first()? {
        b'+' => (1.0, 1, &b[1..]),
        b'-' => (-1.0, 1, &b[1..]),
        b'n' | b'N' => {
            return (common_prefix_len_ignore_case(b, b"nan") == 3).then_some((f64::NAN, 3));
        }
        _ => (1.0, 0, b),
    };

    let mut n = common_prefix_len_ignore_case(rest, b"infinity");
    // Only "inf" or the full word count.
    if 3 < n && n < 8 {
        n = 3;
    }
    (n == 3 || n == 8).then_some((f64::INFINITY * sign, nsign + n))
}

/// Mantissa digits and exponent scanned from a literal.
#[derive(Debug, Default)]
struct Literal {
    mantissa: u64,
    exp: i32,
    neg: bool,
    trunc: bool,
    hex: bool,
    consumed: usize,
}

fn read_float(s: &str) -> Option<Literal> {
    let b = s.as_bytes();
    let mut lit = Literal::default();
    let mut underscores = false;
    let mut i = 0;

    match b.first()? {
        b'+' => i += 1,
        b'-' => {
            lit.neg = true;
            i += 1;
        }
        _ => {}
    }

    let mut base = 10u64;
    let mut max_mant_digits = 19;
    let mut exp_char = b'e';
    if i + 2 < b.len() && b[i] == b'0' && lower(b[i + 1]) == b'x' {
        base = 16;
        max_mant_digits = 16;
        i += 2;
        exp_char = b'p';
        lit.hex = true;
    }

    let mut saw_dot = false;
    let mut saw_digits = false;
    let mut nd: i32 = 0;
    let mut nd_mant: i32 = 0;
    let mut dp: i32 = 0;
    while i < b.len() {
        let c = b[i];
        match c {
            b'_' => underscores = true,
            b'.' => {
                if saw_dot {
                    break;
                }
                saw_dot = true;
                dp = nd;
            }
            b'0'..=b'9' => {
                saw_digits = true;
                if c == b'0' && nd == 0 {
                    dp -= 1;
                } else {
                    nd += 1;
                    if nd_mant < max_mant_digits {
                        lit.mantissa = lit.mantissa * base + u64::from(c - b'0');
                        nd_mant += 1;
                    } else if c != b'0' {
                        lit.trunc = true;
                    }
                }
            }
            _ if base == 16 && (b'a'..=b'f').contains(&lower(c)) => {
                saw_digits = true;
                nd += 1;
                if nd_mant < max_mant_digits {
                    lit.mantissa = lit.mantissa * 16 + u64::from(lower(c) - b'a' + 10);
                    nd_mant += 1;
                } else {
                    lit.trunc = true;
                }
            }
            _ => break,
        }
        i += 1;
    }
    if !saw_digits {
        return None;
    }
    if !saw_dot {
        dp = nd;
    }
    if base == 16 {
        dp *= 4;
        nd_mant *= 4;
    }

    if i < b.len() && lower(b[i]) == exp_char {
        i += 1;
        let mut esign = 1;
        match b.get(i) {
            Some(b'+') => i += 1,
            Some(b'-') => {
                i += 1;
                esign = -1;
            }
            _ => {}
        }
        if !b.get(i).is_some_and(u8::is_ascii_digit) {
            return None;
        }
        let mut e: i32 = 0;
        while i < b.len() && (b[i].is_ascii_digit() || b[i] == b'_') {
            if b[i] == b'_' {
                underscores = true;
            } else if e < 10_000 {
                e = e * 10 + i32::from(b[i] - b'0');
            }
            i += 1;
        }
        dp += e * esign;
    } else if base == 16 {
        // Hex literals require a binary exponent.
        return None;
    }

    if lit.mantissa != 0 {
        lit.exp = dp - nd_mant;
    }
    if underscores && !underscore_ok(&s[..i]) {
        return None;
    }
    lit.consumed = i;
    Some(lit)
}

/// Exact when the mantissa and the power of ten are both exact floats.
fn atof64_exact(mantissa: u64, mut exp: i32, neg: bool) -> Option<f64> {
    if mantissa >> F64_INFO.mantbits != 0 {
        return None;
    }
    let mut f = mantissa as f64;
    if neg {
        f = -f;
    }
    match exp {
        0 => Some(f),
        // Exact integers are <= 10^15, exact powers of ten <= 10^22.
        1..=37 => {
            if exp > 22 {
                f *= F64_POW10[(exp - 22) as usize];
                exp = 22;
            }
            if !(-1e15..=1e15).contains(&f) {
                return None;
            }
            Some(f * F64_POW10[exp as usize])
        }
        -22..=-1 => Some(f / F64_POW10[exp.unsigned_abs() as usize]),
        _ => None,
    }
}

fn atof32_exact(mantissa: u64, mut exp: i32, neg: bool) -> Option<f32> {
    if mantissa >> F32_INFO.mantbits != 0 {
        return None;
    }
    let mut f = mantissa as f32;
    if neg {
        f = -f;
    }
    match exp {
        0 => Some(f),
        // Exact integers are <= 10^7, exact powers of ten <= 10^10.
        1..=17 => {
            if exp > 10 {
                f *= F32_POW10[(exp - 10) as usize];
                exp = 10;
            }
            if !(-1e7..=1e7).contains(&f) {
                return None;
            }
            Some(f * F32_POW10[exp as usize])
        }
        -10..=-1 => Some(f / F32_POW10[exp.unsigned_abs() as usize]),
        _ => None,
    }
}

/// Round a hexadecimal mantissa and binary exponent to the nearest float.
fn atof_hex(s: &str, flt: FloatInfo, lit: &Literal) -> ValueResult<f64> {
    let max_exp = (1i32 << flt.expbits) + flt.bias - 2;
    let min_exp = flt.bias + 1;
    let mut mantissa = lit.mantissa;
    // Mantissa is now implicitly divided by 2^mantbits.
    let mut exp = lit.exp + flt.mantbits as i32;

    // Normalize to a leading 1 followed by mantbits bits plus two rounding
    // bits; the lowest one is sticky.
    while mantissa != 0 && mantissa >> (flt.mantbits + 2) == 0 {
        mantissa <<= 1;
        exp -= 1;
    }
    if lit.trunc {
        mantissa |= 1;
    }
    while mantissa >> (1 + flt.mantbits + 2) != 0 {
        mantissa = (mantissa >> 1) | (mantissa & 1);
        exp += 1;
    }

    // Denormalize if the exponent is too small.
    while mantissa > 1 && exp < min_exp - 2 {
        mantissa = (mantissa >> 1) | (mantissa & 1);
        exp += 1;
    }

    // Round half to even on the two bottom bits.
    let mut round = mantissa & 3;
    mantissa >>= 2;
    round |= mantissa & 1;
    exp += 2;
    if round == 3 {
        mantissa += 1;
        if mantissa == 1 << (1 + flt.mantbits) {
            mantissa >>= 1;
            exp += 1;
        }
    }

    if mantissa >> flt.mantbits == 0 {
        exp = flt.bias;
    }
    if exp > max_exp {
        return Err(ValueError::range(FN_PARSE_FLOAT, s));
    }

    let mut bits = mantissa & ((1u64 << flt.mantbits) - 1);
    bits |= (((exp - flt.bias) & ((1 << flt.expbits) - 1)) as u64) << flt.mantbits;
    if lit.neg {
        bits |= 1u64 << flt.mantbits << flt.expbits;
    }
    if flt == F32_INFO {
        Ok(f64::from(f32::from_bits(bits as u32)))
    } else {
        Ok(f64::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", 1.0)]
    #[case("+1", 1.0)]
    #[case("-0", -0.0)]
    #[case("1e23", 1e23)]
    #[case("1E23", 1e23)]
    #[case("100000000000000000000000", 1e23)]
    #[case("1e-100", 1e-100)]
    #[case("123456700", 1.234567e+08)]
    #[case("99999999999999974834176", 9.999999999999997e+22)]
    #[case("100000000000000008388608", 1.0000000000000001e+23)]
    #[case("1.7976931348623157e308", f64::MAX)]
    #[case("4.9406564584124654e-324", 5e-324)]
    #[case("2.2250738585072012e-308", 2.2250738585072014e-308)]
    #[case("0.000001_234", 1.234e-6)]
    #[case("1_000.000_1", 1000.0001)]
    #[case("0x1p-2", 0.25)]
    #[case("0x1.8p1", 3.0)]
    #[case("-0x_1_0p-4", -1.0)]
    #[case("1e-350", 0.0)]
    fn parses_f64(#[case] input: &str, #[case] expected: f64) {
        let got = parse_float(input, 64).unwrap();
        assert_eq!(got.to_bits(), expected.to_bits(), "{input}");
    }

    #[test]
    fn specials() {
        assert_eq!(parse_float("inf", 64), Ok(f64::INFINITY));
        assert_eq!(parse_float("-Infinity", 64), Ok(f64::NEG_INFINITY));
        assert_eq!(parse_float("+INF", 32), Ok(f64::INFINITY));
        assert!(parse_float("NaN", 64).unwrap().is_nan());
        assert!(parse_float("infin", 64).unwrap_err().is_syntax());
        assert!(parse_float("nan1", 64).unwrap_err().is_syntax());
    }

    #[test]
    fn f32_rounding() {
        let got = parse_float("1000000000.5", 32).unwrap();
        assert_eq!(got, f64::from(1e9_f32));
        let got = parse_float("3.4028234663852886e38", 32).unwrap();
        assert_eq!(got, f64::from(f32::MAX));
        assert!(parse_float("3.5e38", 32).unwrap_err().is_range());
        let got = parse_float("1.401298464324817e-45", 32).unwrap();
        assert_eq!(got, f64::from(f32::from_bits(1)));
    }

    #[test]
    fn overflow_and_syntax() {
        assert!(parse_float("1e309", 64).unwrap_err().is_range());
        assert!(parse_float("-1e400", 64).unwrap_err().is_range());
        assert!(parse_float("0x1p1024", 64).unwrap_err().is_range());
        for s in ["", "-", ".", "1e", "1e+", "1.2.3", "0x1", "1__0", "_1", "1 ", "abc"] {
            assert!(parse_float(s, 64).unwrap_err().is_syntax(), "{s:?}");
        }
        assert!(matches!(parse_float("1", 16), Err(ValueError::Invalid { .. })));
    }

    #[test]
    fn prefix_reports_consumed() {
        assert_eq!(parse_float_prefix("1.5kg", 64), Ok((1.5, 3)));
        assert_eq!(parse_float_prefix("infinityx", 64), Ok((f64::INFINITY, 8)));
        assert_eq!(parse_float_prefix("-infx", 64), Ok((f64::NEG_INFINITY, 4)));
    }
}
