//! Value kinds.
//!
//! `Kind` is a closed classification of the underlying basic type of a
//! [`Value`](crate::Value). The numeric block (`Bool` through `Complex128`)
//! is contiguous and ordered by family and width, which is what
//! [`Kind::is_numeric`] checks.
//!
//! ```rust
//! use sdk_vars::Kind;
//!
//! assert_eq!(Kind::Int8.to_string(), "int8");
//! assert!(Kind::Uint16.is_unsigned_int());
//! assert_eq!(Kind::from_ordinal(14), Some(Kind::Float64));
//! assert_eq!(Kind::describe(200), "Kind(200)");
//! ```

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Classification of a value's underlying basic type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Kind {
    /// Not representable. Zero value of the enum.
    #[default]
    Invalid = 0,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Array,
    Chan,
    Func,
    Interface,
    Map,
    #[serde(rename = "ptr")]
    Pointer,
    Slice,
    String,
    Struct,
    #[serde(rename = "unsafe.Pointer")]
    UnsafePointer,
    Duration,
    Time,
    #[serde(rename = "bytes")]
    ByteSlice,
}

static ALL: [Kind; 30] = [
    Kind::Invalid,
    Kind::Bool,
    Kind::Int,
    Kind::Int8,
    Kind::Int16,
    Kind::Int32,
    Kind::Int64,
    Kind::Uint,
    Kind::Uint8,
    Kind::Uint16,
    Kind::Uint32,
    Kind::Uint64,
    Kind::Uintptr,
    Kind::Float32,
    Kind::Float64,
    Kind::Complex64,
    Kind::Complex128,
    Kind::Array,
    Kind::Chan,
    Kind::Func,
    Kind::Interface,
    Kind::Map,
    Kind::Pointer,
    Kind::Slice,
    Kind::String,
    Kind::Struct,
    Kind::UnsafePointer,
    Kind::Duration,
    Kind::Time,
    Kind::ByteSlice,
];

impl Kind {
    /// Every kind, in ordinal order.
    pub fn all() -> &'static [Kind] {
        &ALL
    }

    /// Ordinal of this kind.
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Kind for an ordinal, `None` when out of range.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        ALL.get(usize::from(ordinal)).copied()
    }

    /// Printable name for any ordinal; unknown ordinals render as `Kind(<n>)`.
    pub fn describe(ordinal: u8) -> String {
        match Self::from_ordinal(ordinal) {
            Some(kind) => kind.name().to_owned(),
            None => format!("Kind({ordinal})"),
        }
    }

    /// Printable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Array => "array",
            Self::Chan => "chan",
            Self::Func => "func",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Pointer => "ptr",
            Self::Slice => "slice",
            Self::String => "string",
            Self::Struct => "struct",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::Duration => "duration",
            Self::Time => "time",
            Self::ByteSlice => "bytes",
        }
    }

    /// `Int` through `Int64`.
    pub const fn is_signed_int(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    /// `Uint` through `Uintptr`.
    pub const fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 | Self::Uintptr
        )
    }

    /// Any fixed-width integer kind.
    pub const fn is_int(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// The numeric block: `Bool` through `Complex128`.
    pub const fn is_numeric(self) -> bool {
        (self as u8) >= (Self::Bool as u8) && (self as u8) <= (Self::Complex128 as u8)
    }

    /// Storage width in bits for fixed-size numeric kinds, `0` otherwise.
    ///
    /// `Int`, `Uint` and `Uintptr` report the platform width.
    pub const fn bit_size(self) -> u32 {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => 8,
            Self::Int16 | Self::Uint16 => 16,
            Self::Int32 | Self::Uint32 | Self::Float32 => 32,
            Self::Int64 | Self::Uint64 | Self::Float64 | Self::Complex64 | Self::Duration => 64,
            Self::Int | Self::Uint | Self::Uintptr => usize::BITS,
            Self::Complex128 => 128,
            _ => 0,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
