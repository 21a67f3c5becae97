//! Signed nanosecond duration.
//!
//! [`Duration`] is the payload of [`Kind::Duration`](crate::Kind::Duration)
//! values. Its text form is the compact unit literal used on command lines
//! and in settings files: `1h2m3.5s`, `-123.456µs`, `0s`.
//!
//! ```rust
//! use sdk_vars::Duration;
//!
//! let d: Duration = "1h30m".parse().unwrap();
//! assert_eq!(d, Duration::HOUR * 3 / 2);
//! assert_eq!(Duration::from_nanos(-123_456).to_string(), "-123.456µs");
//! ```

use std::fmt::{self, Display, Formatter, Write as _};
use std::ops::{Div, Mul, Neg};
use std::str::FromStr;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ValueError, ValueResult};

pub(crate) const FN_PARSE_DURATION: &str = "parse_duration";

/// Elapsed time as a signed count of nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(i64);

impl Duration {
    // ==================== Constants ====================

    pub const ZERO: Self = Self(0);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    pub const NANOSECOND: Self = Self(1);
    pub const MICROSECOND: Self = Self(1_000);
    pub const MILLISECOND: Self = Self(1_000_000);
    pub const SECOND: Self = Self(1_000_000_000);
    pub const MINUTE: Self = Self(60 * 1_000_000_000);
    pub const HOUR: Self = Self(60 * 60 * 1_000_000_000);

    // ==================== Constructors ====================

    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    // ==================== Accessors ====================

    #[inline]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Seconds as a float.
    pub fn as_secs_f64(self) -> f64 {
        let secs = self.0 / Self::SECOND.0;
        let nanos = self.0 % Self::SECOND.0;
        secs as f64 + nanos as f64 / 1e9
    }
}

impl Mul<i64> for Duration {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0.wrapping_mul(rhs))
    }
}

impl Div<i64> for Duration {
    type Output = Self;

    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

// ==================== Text form ====================

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut u = self.0.unsigned_abs();
        if u == 0 {
            return f.write_str("0s");
        }

        let mut out = String::with_capacity(24);
        if self.0 < 0 {
            out.push('-');
        }

        let second = Self::SECOND.0 as u64;
        if u < second {
            // Sub-second values use the largest fitting unit.
            let (prec, unit) = if u < Self::MICROSECOND.0 as u64 {
                (0, "ns")
            } else if u < Self::MILLISECOND.0 as u64 {
                (3, "µs")
            } else {
                (6, "ms")
            };
            let frac = split_frac(&mut u, prec);
            write!(out, "{u}{frac}{unit}")?;
        } else {
            let frac = split_frac(&mut u, 9);
            let (hours, minutes, seconds) = (u / 3600, (u / 60) % 60, u % 60);
            if hours > 0 {
                write!(out, "{hours}h")?;
            }
            if hours > 0 || minutes > 0 {
                write!(out, "{minutes}m")?;
            }
            write!(out, "{seconds}{frac}s")?;
        }
        f.write_str(&out)
    }
}

/// Splits off the low `prec` decimal digits of `v` as `.ddd` without
/// trailing zeros; empty when they are all zero.
fn split_frac(v: &mut u64, prec: u32) -> String {
    if prec == 0 {
        return String::new();
    }
    let pow = 10u64.pow(prec);
    let digits = *v % pow;
    *v /= pow;
    if digits == 0 {
        return String::new();
    }
    let frac = format!(".{digits:0width$}", width = prec as usize);
    frac.trim_end_matches('0').to_owned()
}

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => 1,
        "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    })
}

const LIMIT: u64 = 1 << 63;

/// Leading `[0-9]*`; `None` on overflow past 2^63.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s.bytes().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut x: u64 = 0;
    for c in s[..end].bytes() {
        if x > LIMIT / 10 {
            return None;
        }
        x = x * 10 + u64::from(c - b'0');
        if x > LIMIT {
            return None;
        }
    }
    Some((x, &s[end..]))
}

/// Leading `[0-9]*` after a decimal point. Stops accumulating precision
/// instead of failing on overflow.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.bytes().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut x: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for c in s[..end].bytes() {
        if overflow {
            continue;
        }
        if x > (LIMIT - 1) / 10 {
            overflow = true;
            continue;
        }
        let y = x * 10 + u64::from(c - b'0');
        if y > LIMIT {
            overflow = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, &s[end..])
}

/// Parse a duration literal: a signed sequence of decimal numbers, each
/// with an optional fraction and a unit suffix (`ns`, `us`/`µs`, `ms`, `s`,
/// `m`, `h`), such as `300ms`, `-1.5h` or `2h45m`. A bare `0` is accepted.
pub fn parse_duration(input: &str) -> ValueResult<Duration> {
    let syntax = || ValueError::syntax(FN_PARSE_DURATION, input);
    let range = || ValueError::range(FN_PARSE_DURATION, input);

    let mut s = input;
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(syntax());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        if !s.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(syntax());
        }

        let before = s.len();
        let (mut v, rest) = leading_int(s).ok_or_else(range)?;
        s = rest;
        let pre = before != s.len();

        let mut frac = (0, 1.0);
        let mut post = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (f, scale, rest2) = leading_fraction(rest);
            post = rest.len() != rest2.len();
            frac = (f, scale);
            s = rest2;
        }
        // ".s" and "-.s" have no digits at all.
        if !pre && !post {
            return Err(syntax());
        }

        let unit_end = s
            .bytes()
            .position(|c| c == b'.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_end == 0 {
            return Err(syntax());
        }
        let unit = unit_nanos(&s[..unit_end]).ok_or_else(syntax)?;
        s = &s[unit_end..];

        if v > LIMIT / unit {
            return Err(range());
        }
        v *= unit;
        let (f, scale) = frac;
        if f > 0 {
            // f64 keeps fractions of an hour nanosecond-accurate.
            let part = (f as f64 * (unit as f64 / scale)) as u64;
            v = v
                .checked_add(part)
                .filter(|v| *v <= LIMIT)
                .ok_or_else(range)?;
        }
        total = total
            .checked_add(v)
            .filter(|t| *t <= LIMIT)
            .ok_or_else(range)?;
    }

    if neg {
        return Ok(Duration((total as i64).wrapping_neg()));
    }
    if total > LIMIT - 1 {
        return Err(range());
    }
    Ok(Duration(total as i64))
}

impl FromStr for Duration {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

// ==================== Conversions ====================

impl From<i64> for Duration {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

impl From<Duration> for i64 {
    fn from(d: Duration) -> Self {
        d.0
    }
}

impl TryFrom<StdDuration> for Duration {
    type Error = ValueError;

    fn try_from(d: StdDuration) -> Result<Self, Self::Error> {
        i64::try_from(d.as_nanos())
            .map(Self)
            .map_err(|_| ValueError::range(FN_PARSE_DURATION, format!("{d:?}")))
    }
}

impl TryFrom<Duration> for StdDuration {
    type Error = ValueError;

    fn try_from(d: Duration) -> Result<Self, Self::Error> {
        u64::try_from(d.0)
            .map(Self::from_nanos)
            .map_err(|_| ValueError::range(FN_PARSE_DURATION, d.to_string()))
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "0s")]
    #[case(1, "1ns")]
    #[case(1_100, "1.1µs")]
    #[case(2_200_000, "2.2ms")]
    #[case(3_300_000_000, "3.3s")]
    #[case(4 * 60 * 1_000_000_000, "4m0s")]
    #[case(4 * 60 * 1_000_000_000 + 5_001_000_000, "4m5.001s")]
    #[case(5 * 3600 * 1_000_000_000 + 6 * 60 * 1_000_000_000 + 7_001_000_000, "5h6m7.001s")]
    #[case(8 * 3600 * 1_000_000_000 + 1, "8h0m0.000000001s")]
    #[case(-123_456, "-123.456µs")]
    #[case(i64::MAX, "2562047h47m16.854775807s")]
    #[case(i64::MIN, "-2562047h47m16.854775808s")]
    fn formats(#[case] nanos: i64, #[case] expected: &str) {
        assert_eq!(Duration::from_nanos(nanos).to_string(), expected);
    }

    #[rstest]
    #[case("0", 0)]
    #[case("5s", 5_000_000_000)]
    #[case("30s", 30_000_000_000)]
    #[case("1478s", 1_478_000_000_000)]
    #[case("-5s", -5_000_000_000)]
    #[case("+5s", 5_000_000_000)]
    #[case("-0", 0)]
    #[case("5.6s", 5_600_000_000)]
    #[case("5.s", 5_000_000_000)]
    #[case(".5s", 500_000_000)]
    #[case("1.004s", 1_004_000_000)]
    #[case("10ns", 10)]
    #[case("11us", 11_000)]
    #[case("12µs", 12_000)]
    #[case("12μs", 12_000)]
    #[case("13ms", 13_000_000)]
    #[case("15m", 900_000_000_000)]
    #[case("16h", 57_600_000_000_000)]
    #[case("3h30m", 12_600_000_000_000)]
    #[case("10.5s4m", 250_500_000_000)]
    #[case("-2m3.4s", -123_400_000_000)]
    #[case("1h2m3s4ms5us6ns", 3_723_004_005_006)]
    #[case("0.3333333333333333333h", 1_200_000_000_000)]
    #[case("9223372036854775807ns", i64::MAX)]
    #[case("-9223372036854775808ns", i64::MIN)]
    fn parses(#[case] input: &str, #[case] nanos: i64) {
        assert_eq!(parse_duration(input), Ok(Duration::from_nanos(nanos)));
    }

    #[rstest]
    #[case("")]
    #[case("3")]
    #[case("-")]
    #[case("s")]
    #[case(".")]
    #[case("-.")]
    #[case(".s")]
    #[case("+.s")]
    #[case("1d")]
    #[case("1.1.1s")]
    #[case("\u{b5}s")]
    fn rejects_syntax(#[case] input: &str) {
        assert!(parse_duration(input).unwrap_err().is_syntax(), "{input:?}");
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_duration("9223372036854775808ns").unwrap_err().is_range());
        assert!(parse_duration("9223372036854775810ns").unwrap_err().is_range());
        assert!(parse_duration("3000000h").unwrap_err().is_range());
    }

    #[rstest]
    #[case("9223372036854775807ns1ns")]
    #[case("9223372036854775808ns9223372036854775808ns")]
    #[case("-9223372036854775808ns1ns")]
    #[case("2562047h47m16.854775808s")]
    #[case("1.5h9223372036854775807ns")]
    fn rejects_overflowing_sums(#[case] input: &str) {
        assert!(parse_duration(input).unwrap_err().is_range(), "{input:?}");
    }

    #[test]
    fn accepts_min_boundary() {
        assert_eq!(parse_duration("-9223372036854775808ns"), Ok(Duration::MIN));
        assert_eq!(
            parse_duration("-2562047h47m16.854775808s"),
            Ok(Duration::from_nanos(i64::MIN))
        );
    }

    #[test]
    fn round_trips_through_text() {
        for nanos in [0, 1, -1, 999, 1_000_001, 61_000_000_000, i64::MAX, i64::MIN] {
            let d = Duration::from_nanos(nanos);
            assert_eq!(d.to_string().parse::<Duration>(), Ok(d));
        }
    }

    #[test]
    fn std_interop() {
        let d = Duration::try_from(StdDuration::from_millis(1500)).unwrap();
        assert_eq!(d, Duration::MILLISECOND * 1500);
        assert_eq!(StdDuration::try_from(d).unwrap(), StdDuration::from_millis(1500));
        assert!(StdDuration::try_from(Duration::from_nanos(-1)).is_err());
        assert!(Duration::try_from(StdDuration::MAX).is_err());
        assert_eq!(serde_json::to_string(&Duration::SECOND).unwrap(), "\"1s\"");
    }
}
