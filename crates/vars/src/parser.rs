//! Input classification and canonical formatting.
//!
//! Anything that can become a [`Value`] implements [`BasicKindConvertible`],
//! which exposes the input as a [`Basic`]: one variant per supported basic
//! kind. References, smart pointers and `Option` forward to what they point
//! at, so one level of indirection (or a `None` "nil pointer") is handled
//! without any runtime type inspection.
//!
//! User-defined types that carry their own display form implement
//! [`StringConvertible`] and are passed wrapped in [`Custom`]; their value
//! keeps the underlying kind but uses the custom text.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use crate::codec::{
    self, append_complex, append_float, append_int, append_uint, Complex128, Complex64,
    FloatFormat, SCRATCH_LEN,
};
use crate::convert;
use crate::duration::Duration;
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::value::{Payload, Value};

// ============================================================================
// INPUT SHAPES
// ============================================================================

/// An input reduced to its underlying basic kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Basic<'a> {
    /// A nil pointer.
    Nil,
    Bool(bool),
    Int(isize),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(usize),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uintptr(usize),
    Float32(f32),
    Float64(f64),
    Complex64(Complex64),
    Complex128(Complex128),
    String(Cow<'a, str>),
    Duration(Duration),
    /// An existing value, passed through unchanged.
    Value(&'a Value),
    /// A user type: its underlying basic form plus its own display text.
    Custom {
        underlying: Box<Basic<'a>>,
        display: String,
    },
    /// Recognized but not representable as a value.
    Unsupported(Kind),
}

impl Basic<'_> {
    /// Kind a value built from this input would have.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Nil => Kind::Invalid,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Int8(_) => Kind::Int8,
            Self::Int16(_) => Kind::Int16,
            Self::Int32(_) => Kind::Int32,
            Self::Int64(_) => Kind::Int64,
            Self::Uint(_) => Kind::Uint,
            Self::Uint8(_) => Kind::Uint8,
            Self::Uint16(_) => Kind::Uint16,
            Self::Uint32(_) => Kind::Uint32,
            Self::Uint64(_) => Kind::Uint64,
            Self::Uintptr(_) => Kind::Uintptr,
            Self::Float32(_) => Kind::Float32,
            Self::Float64(_) => Kind::Float64,
            Self::Complex64(_) => Kind::Complex64,
            Self::Complex128(_) => Kind::Complex128,
            Self::String(_) => Kind::String,
            Self::Duration(_) => Kind::Duration,
            Self::Value(v) => v.kind(),
            Self::Custom { underlying, .. } => underlying.kind(),
            Self::Unsupported(kind) => *kind,
        }
    }
}

/// Exposes a type's underlying basic kind.
pub trait BasicKindConvertible {
    fn to_basic(&self) -> Basic<'_>;
}

/// A user type with its own text form.
///
/// ```rust
/// use sdk_vars::{Basic, BasicKindConvertible, Custom, Kind, StringConvertible, Value};
///
/// struct Port(u16);
///
/// impl BasicKindConvertible for Port {
///     fn to_basic(&self) -> Basic<'_> {
///         Basic::Uint16(self.0)
///     }
/// }
///
/// impl StringConvertible for Port {
///     fn to_var_string(&self) -> String {
///         format!(":{}", self.0)
///     }
/// }
///
/// let v = Value::new(Custom(&Port(8080))).unwrap();
/// assert_eq!(v.kind(), Kind::Uint16);
/// assert_eq!(v.as_str(), ":8080");
/// assert!(v.is_custom());
/// assert_eq!(v.as_uint16().unwrap(), 8080);
/// ```
pub trait StringConvertible: BasicKindConvertible {
    fn to_var_string(&self) -> String;
}

/// Routes a [`StringConvertible`] input through its own text form.
#[derive(Debug, Clone, Copy)]
pub struct Custom<'a, T: ?Sized>(pub &'a T);

impl<T: StringConvertible + ?Sized> BasicKindConvertible for Custom<'_, T> {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Custom {
            underlying: Box::new(self.0.to_basic()),
            display: self.0.to_var_string(),
        }
    }
}

macro_rules! impl_basic_copy {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl BasicKindConvertible for $ty {
                #[inline]
                fn to_basic(&self) -> Basic<'_> {
                    Basic::$variant(*self)
                }
            }
        )*
    };
}

impl_basic_copy!(
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Complex64 => Complex64,
    Complex128 => Complex128,
    Duration => Duration,
);

impl StringConvertible for Duration {
    fn to_var_string(&self) -> String {
        self.to_string()
    }
}

impl BasicKindConvertible for str {
    fn to_basic(&self) -> Basic<'_> {
        Basic::String(Cow::Borrowed(self))
    }
}

impl BasicKindConvertible for String {
    fn to_basic(&self) -> Basic<'_> {
        Basic::String(Cow::Borrowed(self))
    }
}

impl BasicKindConvertible for Cow<'_, str> {
    fn to_basic(&self) -> Basic<'_> {
        Basic::String(Cow::Borrowed(self))
    }
}

impl BasicKindConvertible for Value {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Value(self)
    }
}

impl BasicKindConvertible for Basic<'_> {
    fn to_basic(&self) -> Basic<'_> {
        self.clone()
    }
}

impl BasicKindConvertible for () {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Struct)
    }
}

impl<T: BasicKindConvertible> BasicKindConvertible for Option<T> {
    fn to_basic(&self) -> Basic<'_> {
        match self {
            Some(inner) => inner.to_basic(),
            None => Basic::Nil,
        }
    }
}

macro_rules! impl_basic_deref {
    ($($ptr:ident),*) => {
        $(
            impl<T: BasicKindConvertible + ?Sized> BasicKindConvertible for $ptr<T> {
                #[inline]
                fn to_basic(&self) -> Basic<'_> {
                    (**self).to_basic()
                }
            }
        )*
    };
}

impl_basic_deref!(Box, Rc, Arc);

impl<T: BasicKindConvertible + ?Sized> BasicKindConvertible for &T {
    #[inline]
    fn to_basic(&self) -> Basic<'_> {
        (**self).to_basic()
    }
}

impl<T> BasicKindConvertible for [T] {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Slice)
    }
}

impl<T> BasicKindConvertible for Vec<T> {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Slice)
    }
}

impl<T, const N: usize> BasicKindConvertible for [T; N] {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Array)
    }
}

impl<K, V, S> BasicKindConvertible for HashMap<K, V, S> {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Map)
    }
}

impl<K, V> BasicKindConvertible for BTreeMap<K, V> {
    fn to_basic(&self) -> Basic<'_> {
        Basic::Unsupported(Kind::Map)
    }
}

/// Kind of the value `input` would produce, without building it.
pub fn kind_of<T: BasicKindConvertible + ?Sized>(input: &T) -> Kind {
    input.to_basic().kind()
}

// ============================================================================
// PARSER
// ============================================================================

/// Reusable value builder.
///
/// Holds a text buffer and an integer scratch area so canonical strings can
/// be produced without intermediate allocations. Obtain one from a
/// [`ParserPool`](crate::ParserPool) rather than creating it per call.
#[derive(Debug, Clone)]
pub struct Parser {
    buf: String,
    scratch: [u8; SCRATCH_LEN],
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            scratch: [0; SCRATCH_LEN],
        }
    }

    /// Build a value from any supported input.
    pub fn value<T: BasicKindConvertible + ?Sized>(&mut self, input: &T) -> ValueResult<Value> {
        self.build(input.to_basic())
    }

    /// Build a value and convert it to `kind`.
    pub fn value_as<T: BasicKindConvertible + ?Sized>(
        &mut self,
        input: &T,
        kind: Kind,
    ) -> ValueResult<Value> {
        let value = self.value(input)?;
        convert::convert(self, &value, kind)
    }

    fn build(&mut self, basic: Basic<'_>) -> ValueResult<Value> {
        match basic {
            Basic::Value(v) if v.kind() == Kind::Invalid => {
                Err(ValueError::invalid("value has kind invalid"))
            }
            Basic::Value(v) => Ok(v.clone()),
            Basic::Nil => Ok(Value::nil()),
            Basic::Unsupported(kind) => Err(ValueError::invalid(format!("unsupported kind {kind}"))),
            Basic::Custom {
                underlying,
                display,
            } => {
                let value = self.build(*underlying)?;
                Ok(Value::from_parts(value.kind(), display, value.into_raw(), true))
            }
            // The duration literal cannot be re-read by the numeric parsers.
            Basic::Duration(d) => Ok(Value::from_parts(
                Kind::Duration,
                d.to_string(),
                Payload::Duration(d),
                true,
            )),
            other => {
                let raw = Payload::from_basic(other);
                let text = self.format(&raw);
                Ok(Value::from_parts(raw.kind(), text, raw, false))
            }
        }
    }

    /// Canonical text for a payload.
    pub(crate) fn format(&mut self, raw: &Payload) -> String {
        self.buf.clear();
        let buf = &mut self.buf;
        let scratch = &mut self.scratch;
        match raw {
            Payload::Nil => buf.push_str("nil"),
            Payload::Bool(b) => buf.push_str(codec::format_bool(*b)),
            Payload::Int(v) => append_int(buf, *v as i64, 10, scratch),
            Payload::Int8(v) => append_int(buf, i64::from(*v), 10, scratch),
            Payload::Int16(v) => append_int(buf, i64::from(*v), 10, scratch),
            Payload::Int32(v) => append_int(buf, i64::from(*v), 10, scratch),
            Payload::Int64(v) => append_int(buf, *v, 10, scratch),
            Payload::Uint(v) | Payload::Uintptr(v) => append_uint(buf, *v as u64, 10, scratch),
            Payload::Uint8(v) => append_uint(buf, u64::from(*v), 10, scratch),
            Payload::Uint16(v) => append_uint(buf, u64::from(*v), 10, scratch),
            Payload::Uint32(v) => append_uint(buf, u64::from(*v), 10, scratch),
            Payload::Uint64(v) => append_uint(buf, *v, 10, scratch),
            Payload::Float32(v) => append_float(buf, f64::from(*v), FloatFormat::General, -1, 32),
            Payload::Float64(v) => append_float(buf, *v, FloatFormat::General, -1, 64),
            Payload::Complex64(c) => {
                append_complex(buf, (*c).into(), FloatFormat::General, -1, 64);
            }
            Payload::Complex128(c) => append_complex(buf, *c, FloatFormat::General, -1, 128),
            Payload::String(s) => buf.push_str(s),
            Payload::Duration(d) => buf.push_str(&d.to_string()),
        }
        buf.as_str().to_owned()
    }

    /// Clear state before the parser is reused.
    pub(crate) fn reset(&mut self) {
        self.buf.clear();
    }

    /// Capacity of the text buffer in bytes.
    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
