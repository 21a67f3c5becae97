//! Cross-kind conversion.
//!
//! Numeric sources are lifted to a 64-bit representative and cast down to
//! the target, with integer narrowing following `as` semantics (truncation
//! and two's-complement reinterpretation). Float sources are range-checked
//! before they become integers. String sources go through the codec
//! parsers. The canonical text of the result is always re-derived.

use crate::codec::{self, Complex128, Complex64};
use crate::duration::{self, Duration};
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::parser::Parser;
use crate::value::{Payload, Value};

const FN_CONVERT: &str = "convert";

/// Source payload lifted to a 64-bit representative.
#[derive(Debug, Clone, Copy)]
enum Num {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Complex(Complex128),
}

/// Convert `src` to `to`, formatting the result with `parser`.
pub(crate) fn convert(parser: &mut Parser, src: &Value, to: Kind) -> ValueResult<Value> {
    if src.kind() == to && to != Kind::Invalid {
        return Ok(src.clone());
    }
    match to {
        Kind::String if src.kind() != Kind::Invalid => Ok(Value::from(src.as_str())),
        Kind::Slice if src.kind() != Kind::Invalid => Ok(Value::from_parts(
            Kind::Slice,
            src.as_str().to_owned(),
            src.raw().clone(),
            src.is_custom(),
        )),
        _ => {
            let raw = convert_payload(src, to)?;
            let text = parser.format(&raw);
            Ok(Value::from_parts(to, text, raw, false))
        }
    }
}

/// Payload of `src` converted to `to`, without formatting.
pub(crate) fn convert_payload(src: &Value, to: Kind) -> ValueResult<Payload> {
    let from = src.kind();
    let conv = || ValueError::conv(from, to, src.as_str());

    if from == Kind::Invalid {
        return Err(conv());
    }
    match to {
        Kind::String => return Ok(Payload::String(src.as_str().to_owned())),
        Kind::Slice => return Ok(src.raw().clone()),
        _ if !(to.is_numeric() || to == Kind::Duration) => return Err(conv()),
        _ => {}
    }

    let num = match src.raw() {
        Payload::String(s) if from == Kind::String => return parse_string(s, to),
        Payload::Bool(b) => Num::Signed(i64::from(*b)),
        Payload::Int(v) => Num::Signed(*v as i64),
        Payload::Int8(v) => Num::Signed(i64::from(*v)),
        Payload::Int16(v) => Num::Signed(i64::from(*v)),
        Payload::Int32(v) => Num::Signed(i64::from(*v)),
        Payload::Int64(v) => Num::Signed(*v),
        Payload::Duration(d) => Num::Signed(d.as_nanos()),
        Payload::Uint(v) | Payload::Uintptr(v) => Num::Unsigned(*v as u64),
        Payload::Uint8(v) => Num::Unsigned(u64::from(*v)),
        Payload::Uint16(v) => Num::Unsigned(u64::from(*v)),
        Payload::Uint32(v) => Num::Unsigned(u64::from(*v)),
        Payload::Uint64(v) => Num::Unsigned(*v),
        Payload::Float32(v) => Num::Float(f64::from(*v)),
        Payload::Float64(v) => Num::Float(*v),
        Payload::Complex64(c) => Num::Complex((*c).into()),
        Payload::Complex128(c) => Num::Complex(*c),
        Payload::Nil | Payload::String(_) => return Err(conv()),
    };

    // A complex source only reaches a real target without an imaginary part.
    let num = match num {
        Num::Complex(c) if !to.is_complex() => {
            if c.im != 0.0 {
                return Err(conv());
            }
            Num::Float(c.re)
        }
        other => other,
    };

    if to.is_complex() {
        let c = match num {
            Num::Signed(v) => Complex128::new(v as f64, 0.0),
            Num::Unsigned(v) => Complex128::new(v as f64, 0.0),
            Num::Float(v) => Complex128::new(v, 0.0),
            Num::Complex(c) => c,
        };
        return Ok(if to == Kind::Complex64 {
            Payload::Complex64(Complex64::from(c))
        } else {
            Payload::Complex128(c)
        });
    }

    match to {
        Kind::Bool => match num {
            Num::Signed(0) | Num::Unsigned(0) => Ok(Payload::Bool(false)),
            Num::Signed(1) | Num::Unsigned(1) => Ok(Payload::Bool(true)),
            Num::Float(f) if f == 0.0 => Ok(Payload::Bool(false)),
            Num::Float(f) if f == 1.0 => Ok(Payload::Bool(true)),
            _ => Err(conv()),
        },
        Kind::Float32 => Ok(Payload::Float32(as_f64(num) as f32)),
        Kind::Float64 => Ok(Payload::Float64(as_f64(num))),
        _ => {
            let wide = match num {
                Num::Signed(v) => i128::from(v),
                Num::Unsigned(v) => i128::from(v),
                Num::Float(f) => float_to_int(f, to, src)?,
                Num::Complex(_) => return Err(conv()),
            };
            int_payload(wide, to).ok_or_else(conv)
        }
    }
}

fn as_f64(num: Num) -> f64 {
    match num {
        Num::Signed(v) => v as f64,
        Num::Unsigned(v) => v as f64,
        Num::Float(f) => f,
        Num::Complex(c) => c.re,
    }
}

/// Truncate toward zero, rejecting values the target width cannot hold.
fn float_to_int(f: f64, to: Kind, src: &Value) -> ValueResult<i128> {
    if f.is_nan() {
        return Err(ValueError::conv(src.kind(), to, src.as_str()));
    }
    let bits = to.bit_size();
    let t = f.trunc();
    let (min, max) = if to.is_unsigned_int() {
        (0.0, 2f64.powi(bits as i32))
    } else {
        let half = 2f64.powi(bits as i32 - 1);
        (-half, half)
    };
    if t < min || t >= max {
        return Err(ValueError::range(FN_CONVERT, src.as_str()));
    }
    Ok(t as i128)
}

/// Narrow an integer representative with `as` semantics.
fn int_payload(v: i128, to: Kind) -> Option<Payload> {
    Some(match to {
        Kind::Int => Payload::Int(v as isize),
        Kind::Int8 => Payload::Int8(v as i8),
        Kind::Int16 => Payload::Int16(v as i16),
        Kind::Int32 => Payload::Int32(v as i32),
        Kind::Int64 => Payload::Int64(v as i64),
        Kind::Uint => Payload::Uint(v as usize),
        Kind::Uint8 => Payload::Uint8(v as u8),
        Kind::Uint16 => Payload::Uint16(v as u16),
        Kind::Uint32 => Payload::Uint32(v as u32),
        Kind::Uint64 => Payload::Uint64(v as u64),
        Kind::Uintptr => Payload::Uintptr(v as usize),
        Kind::Duration => Payload::Duration(Duration::from_nanos(v as i64)),
        _ => return None,
    })
}

fn parse_string(s: &str, to: Kind) -> ValueResult<Payload> {
    let bits = to.bit_size();
    Ok(match to {
        Kind::Bool => Payload::Bool(codec::parse_bool(s)?),
        Kind::Int => Payload::Int(codec::parse_int(s, 0, bits)? as isize),
        Kind::Int8 => Payload::Int8(codec::parse_int(s, 0, bits)? as i8),
        Kind::Int16 => Payload::Int16(codec::parse_int(s, 0, bits)? as i16),
        Kind::Int32 => Payload::Int32(codec::parse_int(s, 0, bits)? as i32),
        Kind::Int64 => Payload::Int64(codec::parse_int(s, 0, bits)?),
        Kind::Uint => Payload::Uint(codec::parse_uint(s, 0, bits)? as usize),
        Kind::Uint8 => Payload::Uint8(codec::parse_uint(s, 0, bits)? as u8),
        Kind::Uint16 => Payload::Uint16(codec::parse_uint(s, 0, bits)? as u16),
        Kind::Uint32 => Payload::Uint32(codec::parse_uint(s, 0, bits)? as u32),
        Kind::Uint64 => Payload::Uint64(codec::parse_uint(s, 0, bits)?),
        Kind::Uintptr => Payload::Uintptr(codec::parse_uint(s, 0, bits)? as usize),
        Kind::Float32 => Payload::Float32(codec::parse_float(s, 32)? as f32),
        Kind::Float64 => Payload::Float64(codec::parse_float(s, 64)?),
        Kind::Complex64 => Payload::Complex64(codec::parse_complex(s, 64)?.into()),
        Kind::Complex128 => Payload::Complex128(codec::parse_complex(s, 128)?),
        Kind::Duration => Payload::Duration(duration::parse_duration(s)?),
        _ => return Err(ValueError::conv(Kind::String, to, s)),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn conv(v: &Value, to: Kind) -> ValueResult<Value> {
        convert(&mut Parser::new(), v, to)
    }

    #[rstest]
    #[case(Value::new(300_i32).unwrap(), Kind::Int8, "44")]
    #[case(Value::new(-1_i64).unwrap(), Kind::Uint64, "18446744073709551615")]
    #[case(Value::new(u64::MAX).unwrap(), Kind::Int64, "-1")]
    #[case(Value::new(true).unwrap(), Kind::Float64, "1")]
    #[case(Value::new(true).unwrap(), Kind::Duration, "1ns")]
    #[case(Value::new(1_u8).unwrap(), Kind::Bool, "true")]
    #[case(Value::new(-2.9_f64).unwrap(), Kind::Int16, "-2")]
    #[case(Value::new(255.9_f32).unwrap(), Kind::Uint8, "255")]
    #[case(Value::new(1.5_f64).unwrap(), Kind::Complex64, "(1.5+0i)")]
    #[case(Value::new(0.1_f64).unwrap(), Kind::Float32, "0.1")]
    #[case(Value::new(Complex128::new(2.0, 0.0)).unwrap(), Kind::Int, "2")]
    #[case(Value::new(Complex64::new(0.5, -1.0)).unwrap(), Kind::Complex128, "(0.5-1i)")]
    #[case(Value::new(Duration::SECOND).unwrap(), Kind::Int64, "1000000000")]
    #[case(Value::new(Duration::SECOND).unwrap(), Kind::String, "1s")]
    #[case(Value::from("0b101"), Kind::Uint16, "5")]
    #[case(Value::from("-1_000"), Kind::Int32, "-1000")]
    #[case(Value::from("T"), Kind::Bool, "true")]
    #[case(Value::from("1e+09"), Kind::Float32, "1e+09")]
    #[case(Value::from("1.5 2"), Kind::Complex128, "(1.5+2i)")]
    #[case(Value::from("1h30m"), Kind::Duration, "1h30m0s")]
    fn converts(#[case] src: Value, #[case] to: Kind, #[case] want: &str) {
        let got = conv(&src, to).unwrap();
        assert_eq!(got.kind(), to);
        assert_eq!(got.as_str(), want);
        assert!(!got.is_custom() || to == src.kind());
    }

    #[rstest]
    #[case(Value::new(2_i32).unwrap(), Kind::Bool)]
    #[case(Value::new(0.5_f64).unwrap(), Kind::Bool)]
    #[case(Value::new(f64::NAN).unwrap(), Kind::Int)]
    #[case(Value::new(Complex128::new(1.0, 1.0)).unwrap(), Kind::Float64)]
    #[case(Value::new(1_i32).unwrap(), Kind::Struct)]
    #[case(Value::new(1_i32).unwrap(), Kind::Map)]
    #[case(Value::new(1_i32).unwrap(), Kind::Invalid)]
    #[case(Value::nil(), Kind::String)]
    #[case(Value::empty(), Kind::Int)]
    fn rejects_with_conv(#[case] src: Value, #[case] to: Kind) {
        assert!(matches!(conv(&src, to), Err(ValueError::Conv { .. })), "{src:?} -> {to}");
    }

    #[rstest]
    #[case(Value::new(256.0_f64).unwrap(), Kind::Uint8)]
    #[case(Value::new(-1.0_f64).unwrap(), Kind::Uint)]
    #[case(Value::new(f64::INFINITY).unwrap(), Kind::Int64)]
    #[case(Value::new(9.3e18_f64).unwrap(), Kind::Int64)]
    #[case(Value::new(1e300_f64).unwrap(), Kind::Duration)]
    #[case(Value::from("256"), Kind::Uint8)]
    fn rejects_out_of_range(#[case] src: Value, #[case] to: Kind) {
        assert!(conv(&src, to).unwrap_err().is_range(), "{src:?} -> {to}");
    }

    #[test]
    fn string_parse_errors_are_syntax() {
        assert!(conv(&Value::from("12x"), Kind::Int).unwrap_err().is_syntax());
        assert!(conv(&Value::from("5 parsecs"), Kind::Duration).unwrap_err().is_syntax());
    }

    #[test]
    fn unknown_bool_literal_is_conv() {
        let err = conv(&Value::from("yes"), Kind::Bool).unwrap_err();
        assert_eq!(err, ValueError::conv(Kind::String, Kind::Bool, "yes"));
        assert_eq!(Value::from("yes").as_bool(), Err(err));
    }

    #[test]
    fn duration_overflow_is_range() {
        let v = Value::from("9223372036854775808ns9223372036854775808ns");
        assert!(conv(&v, Kind::Duration).unwrap_err().is_range());
        assert!(v.as_duration().unwrap_err().is_range());
    }

    #[test]
    fn same_kind_keeps_custom_text() {
        let d = Value::new(Duration::from_nanos(1_500)).unwrap();
        let same = conv(&d, Kind::Duration).unwrap();
        assert!(same.is_custom());
        assert_eq!(same.as_str(), "1.5µs");
    }

    #[test]
    fn slice_is_opaque() {
        let v = Value::from("a b");
        let s = conv(&v, Kind::Slice).unwrap();
        assert_eq!(s.kind(), Kind::Slice);
        assert_eq!(s.as_str(), "a b");
        assert!(conv(&s, Kind::Int).is_err());
        assert_eq!(conv(&s, Kind::String).unwrap().as_str(), "a b");
    }
}
