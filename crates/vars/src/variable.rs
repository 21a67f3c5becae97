//! Named values.

use std::fmt::{self, Display, Formatter};

use crate::codec::{Complex128, Complex64};
use crate::duration::Duration;
use crate::error::{KeyError, Result, ValueResult};
use crate::key::parse_key;
use crate::kind::Kind;
use crate::parser::BasicKindConvertible;
use crate::value::Value;

/// A validated name bound to a [`Value`].
///
/// The read-only flag is fixed at construction; collections refuse to
/// replace a read-only entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variable {
    name: String,
    value: Value,
    read_only: bool,
}

impl Variable {
    /// Validate `name` and build the value from `input`.
    ///
    /// ```rust
    /// use sdk_vars::{Kind, Variable};
    ///
    /// let v = Variable::new(" retries ", 3_u8, false).unwrap();
    /// assert_eq!(v.name(), "retries");
    /// assert_eq!(v.kind(), Kind::Uint8);
    /// assert!(Variable::new("1st", 1, false).is_err());
    /// ```
    pub fn new<T: BasicKindConvertible>(name: &str, input: T, read_only: bool) -> Result<Self> {
        let name = parse_key(name)?;
        let value = Value::new(input)?;
        Ok(Self::from_parts(name, value, read_only))
    }

    /// Like [`Variable::new`], converting the value to `kind`.
    pub fn new_as<T: BasicKindConvertible>(
        name: &str,
        input: T,
        read_only: bool,
        kind: Kind,
    ) -> Result<Self> {
        let name = parse_key(name)?;
        let value = Value::new_as(input, kind)?;
        Ok(Self::from_parts(name, value, read_only))
    }

    /// The absent-entry sentinel: empty name and empty value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `name` must already be validated.
    pub(crate) fn from_parts(name: String, value: Value, read_only: bool) -> Self {
        Self {
            name,
            value,
            read_only,
        }
    }

    pub(crate) fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    /// A copy under a different name. The original is untouched.
    pub fn with_name(&self, name: &str) -> std::result::Result<Self, KeyError> {
        Ok(Self {
            name: parse_key(name)?,
            value: self.value.clone(),
            read_only: self.read_only,
        })
    }
}

macro_rules! forward_accessors {
    ($($as_fn:ident, $fn:ident => $ty:ty;)*) => {
        impl Variable {
            $(
                #[inline]
                pub fn $as_fn(&self) -> ValueResult<$ty> {
                    self.value.$as_fn()
                }

                #[inline]
                pub fn $fn(&self) -> $ty {
                    self.value.$fn()
                }
            )*
        }
    };
}

forward_accessors! {
    as_bool, bool => bool;
    as_int, int => isize;
    as_int8, int8 => i8;
    as_int16, int16 => i16;
    as_int32, int32 => i32;
    as_int64, int64 => i64;
    as_uint, uint => usize;
    as_uint8, uint8 => u8;
    as_uint16, uint16 => u16;
    as_uint32, uint32 => u32;
    as_uint64, uint64 => u64;
    as_uintptr, uintptr => usize;
    as_float32, float32 => f32;
    as_float64, float64 => f64;
    as_complex64, complex64 => Complex64;
    as_complex128, complex128 => Complex128;
    as_duration, duration => Duration;
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

/// Parse a single `key=value` pair.
///
/// The pair splits on the first `=`. A missing `=` yields an empty string
/// value, and one pair of surrounding double quotes is stripped from the
/// value. A blank or invalid key fails with [`KeyError::Empty`]; use
/// [`parse_key`](crate::parse_key) for the specific reason.
///
/// ```rust
/// use sdk_vars::{parse_variable_from_string, KeyError, Kind};
///
/// let v = parse_variable_from_string("greeting=\"hi there\"").unwrap();
/// assert_eq!(v.name(), "greeting");
/// assert_eq!(v.as_str(), "hi there");
/// assert_eq!(v.kind(), Kind::String);
///
/// assert_eq!(parse_variable_from_string("=val"), Err(KeyError::Empty));
/// ```
pub fn parse_variable_from_string(s: &str) -> std::result::Result<Variable, KeyError> {
    let (key, value) = s.split_once('=').unwrap_or((s, ""));
    let name = parse_key(key).map_err(|_| KeyError::Empty)?;
    let value = strip_quotes(value);
    Ok(Variable::from_parts(name, Value::from(value), false))
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}
