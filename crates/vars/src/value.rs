//! Immutable dynamic value.
//!
//! A [`Value`] pairs a [`Kind`] with the canonical text of its payload and
//! the typed payload itself. Values are immutable once built; conversion via
//! [`Value::clone_as`] always yields a new value.

use std::fmt::{self, Display, Formatter};

use serde::{Serialize, Serializer};

use crate::codec::{Complex128, Complex64};
use crate::convert;
use crate::duration::Duration;
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::parser::{Basic, BasicKindConvertible};
use crate::pool::ParserPool;

/// Typed payload of a [`Value`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload: the empty value or nil.
    #[default]
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
    String(String),
    Duration(Duration),
}

impl Payload {
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
        }
    }

    /// Payload for a plain basic input. Pass-through, custom and
    /// unsupported inputs are resolved by the parser before this point.
    pub(crate) fn from_basic(basic: Basic<'_>) -> Self {
        match basic {
            Basic::Bool(v) => Self::Bool(v),
            Basic::Int(v) => Self::Int(v),
            Basic::Int8(v) => Self::Int8(v),
            Basic::Int16(v) => Self::Int16(v),
            Basic::Int32(v) => Self::Int32(v),
            Basic::Int64(v) => Self::Int64(v),
            Basic::Uint(v) => Self::Uint(v),
            Basic::Uint8(v) => Self::Uint8(v),
            Basic::Uint16(v) => Self::Uint16(v),
            Basic::Uint32(v) => Self::Uint32(v),
            Basic::Uint64(v) => Self::Uint64(v),
            Basic::Uintptr(v) => Self::Uintptr(v),
            Basic::Float32(v) => Self::Float32(v),
            Basic::Float64(v) => Self::Float64(v),
            Basic::Complex64(v) => Self::Complex64(v),
            Basic::Complex128(v) => Self::Complex128(v),
            Basic::String(v) => Self::String(v.into_owned()),
            Basic::Duration(v) => Self::Duration(v),
            Basic::Value(v) => v.raw().clone(),
            Basic::Custom { underlying, .. } => Self::from_basic(*underlying),
            Basic::Nil | Basic::Unsupported(_) => Self::Nil,
        }
    }
}

/// Dynamic value: kind, canonical text and typed payload.
///
/// ```rust
/// use sdk_vars::{Kind, Value};
///
/// let v = Value::new(0.1_f32).unwrap();
/// assert_eq!(v.kind(), Kind::Float32);
/// assert_eq!(v.as_str(), "0.1");
///
/// let s = v.clone_as(Kind::String).unwrap();
/// assert_eq!(s.as_float64().unwrap(), 0.1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Value {
    kind: Kind,
    str: String,
    raw: Payload,
    custom: bool,
}

impl Value {
    /// Build a value from any supported input using the global parser pool.
    pub fn new<T: BasicKindConvertible>(input: T) -> ValueResult<Self> {
        ParserPool::global().acquire().value(&input)
    }

    /// Build a value and convert it to `kind`.
    pub fn new_as<T: BasicKindConvertible>(input: T, kind: Kind) -> ValueResult<Self> {
        ParserPool::global().acquire().value_as(&input, kind)
    }

    /// The empty value: kind invalid, no text, no payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The value of a nil pointer.
    pub fn nil() -> Self {
        Self {
            kind: Kind::Invalid,
            str: "nil".to_owned(),
            raw: Payload::Nil,
            custom: false,
        }
    }

    pub(crate) fn from_parts(kind: Kind, str: String, raw: Payload, custom: bool) -> Self {
        Self {
            kind,
            str,
            raw,
            custom,
        }
    }

    pub(crate) fn into_raw(self) -> Payload {
        self.raw
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn raw(&self) -> &Payload {
        &self.raw
    }

    /// `true` when the text came from a user type's own formatting.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Canonical (or custom) text.
    pub fn as_str(&self) -> &str {
        &self.str
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.str.is_empty()
    }

    /// The text split on Unicode whitespace.
    pub fn fields(&self) -> Vec<String> {
        self.str.split_whitespace().map(str::to_owned).collect()
    }

    /// Convert to `kind`. See the crate docs for the conversion rules.
    pub fn clone_as(&self, kind: Kind) -> ValueResult<Self> {
        ParserPool::global().with_pooled(|p| convert::convert(p, self, kind))
    }

    fn payload_as(&self, kind: Kind) -> ValueResult<Payload> {
        if self.kind == kind {
            return Ok(self.raw.clone());
        }
        convert::convert_payload(self, kind)
    }
}

macro_rules! typed_accessors {
    ($($as_fn:ident, $fn:ident, $kind:ident => $ty:ty;)*) => {
        impl Value {
            $(
                #[doc = concat!("Read as `", stringify!($ty), "`, converting when the kinds differ.")]
                pub fn $as_fn(&self) -> ValueResult<$ty> {
                    match self.payload_as(Kind::$kind)? {
                        Payload::$kind(v) => Ok(v),
                        _ => Err(ValueError::conv(self.kind, Kind::$kind, &self.str)),
                    }
                }

                #[doc = concat!("Like [`Self::", stringify!($as_fn), "`], returning the zero value on failure.")]
                pub fn $fn(&self) -> $ty {
                    self.$as_fn().unwrap_or_default()
                }
            )*
        }
    };
}

typed_accessors! {
    as_bool, bool, Bool => bool;
    as_int, int, Int => isize;
    as_int8, int8, Int8 => i8;
    as_int16, int16, Int16 => i16;
    as_int32, int32, Int32 => i32;
    as_int64, int64, Int64 => i64;
    as_uint, uint, Uint => usize;
    as_uint8, uint8, Uint8 => u8;
    as_uint16, uint16, Uint16 => u16;
    as_uint32, uint32, Uint32 => u32;
    as_uint64, uint64, Uint64 => u64;
    as_uintptr, uintptr, Uintptr => usize;
    as_float32, float32, Float32 => f32;
    as_float64, float64, Float64 => f64;
    as_complex64, complex64, Complex64 => Complex64;
    as_complex128, complex128, Complex128 => Complex128;
    as_duration, duration, Duration => Duration;
}

/// Values are equal when kind and payload match; text is ignored.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.raw == other.raw
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self {
            kind: Kind::String,
            str: s.clone(),
            raw: Payload::String(s),
            custom: false,
        }
    }
}

/// Booleans and finite numbers serialize natively; everything else as text.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.raw {
            Payload::Nil if self.str.is_empty() => serializer.serialize_none(),
            Payload::Bool(v) => serializer.serialize_bool(*v),
            Payload::Int(v) => serializer.serialize_i64(*v as i64),
            Payload::Int8(v) => serializer.serialize_i8(*v),
            Payload::Int16(v) => serializer.serialize_i16(*v),
            Payload::Int32(v) => serializer.serialize_i32(*v),
            Payload::Int64(v) => serializer.serialize_i64(*v),
            Payload::Uint(v) | Payload::Uintptr(v) => serializer.serialize_u64(*v as u64),
            Payload::Uint8(v) => serializer.serialize_u8(*v),
            Payload::Uint16(v) => serializer.serialize_u16(*v),
            Payload::Uint32(v) => serializer.serialize_u32(*v),
            Payload::Uint64(v) => serializer.serialize_u64(*v),
            Payload::Float32(v) if v.is_finite() => serializer.serialize_f32(*v),
            Payload::Float64(v) if v.is_finite() => serializer.serialize_f64(*v),
            _ => serializer.serialize_str(&self.str),
        }
    }
}
