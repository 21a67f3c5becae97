//! # SDK Vars
//!
//! Dynamic value layer for CLI applications. Every flag, environment
//! variable and persisted setting passes through here as a [`Value`]: a
//! [`Kind`], a canonical text form that parses back to the same payload,
//! and the typed payload itself.
//!
//! - [`Value`] / [`Variable`]: immutable values and named values
//! - [`Map`] / [`ReadOnlyMap`]: concurrent and frozen collections with
//!   `key=value` text and flat JSON forms
//! - [`codec`]: integer, float, complex and boolean text codecs backed by
//!   an exact [`Decimal`](codec::Decimal) engine
//! - [`Duration`]: signed nanosecond durations with `1h2m3.5s` literals
//!
//! ## Conversions
//!
//! [`Value::clone_as`] converts between kinds. Integers narrow with `as`
//! semantics, floats truncate toward zero and report out-of-range targets,
//! complex values convert to real kinds only without an imaginary part,
//! and strings are parsed with the codec. Any value converts to `String`
//! as its canonical text.
//!
//! ```rust
//! use sdk_vars::{Duration, Kind, Map, Value};
//!
//! let v = Value::new(Duration::from_nanos(-123_456)).unwrap();
//! assert_eq!(v.as_str(), "-123.456µs");
//! assert_eq!(v.as_int().unwrap(), -123_456);
//!
//! let port = Value::from("0x1F90").clone_as(Kind::Uint16).unwrap();
//! assert_eq!(port.as_str(), "8080");
//!
//! let env = Map::from_text("HOME=/root\nDEBUG=1\n").unwrap();
//! assert!(env.get("DEBUG").as_bool().unwrap());
//! ```

pub mod codec;
pub mod error;

mod convert;
mod duration;
mod key;
mod kind;
mod map;
mod parser;
mod pool;
mod value;
mod variable;

pub use codec::{Complex128, Complex64};
pub use duration::{parse_duration, Duration};
pub use error::{Error, KeyError, Result, ValueError, ValueResult};
pub use key::{is_valid_key, parse_key, parse_key_bytes};
pub use kind::Kind;
pub use map::{Map, ReadOnlyMap};
pub use parser::{kind_of, Basic, BasicKindConvertible, Custom, Parser, StringConvertible};
pub use pool::{ParserPool, PoolConfig, PooledParser};
pub use value::{Payload, Value};
pub use variable::{parse_variable_from_string, Variable};

/// Build a [`Value`] from any supported input.
pub fn new_value<T: BasicKindConvertible>(input: T) -> ValueResult<Value> {
    Value::new(input)
}

/// Build a named [`Variable`].
pub fn new_variable<T: BasicKindConvertible>(name: &str, input: T, read_only: bool) -> Result<Variable> {
    Variable::new(name, input, read_only)
}

/// Build a named [`Variable`] converted to `kind`.
pub fn new_as<T: BasicKindConvertible>(
    name: &str,
    input: T,
    read_only: bool,
    kind: Kind,
) -> Result<Variable> {
    Variable::new_as(name, input, read_only, kind)
}
