//! Error types for keys, values and collections.
//!
//! Every parse, format and conversion routine in this crate returns one of
//! these types explicitly. Nothing here panics and nothing is logged on the
//! failure path; callers decide how to surface the message.

use thiserror::Error;

use crate::kind::Kind;

/// Result type for collection and top-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for value parsing and conversion.
pub type ValueResult<T> = std::result::Result<T, ValueError>;

// ============================================================================
// KEY ERRORS
// ============================================================================

/// Reasons a variable name is rejected by [`parse_key`](crate::parse_key).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The input was empty, or a `key=value` pair had no key.
    #[error("key is empty")]
    Empty,

    /// The raw input bytes are not valid UTF-8.
    #[error("key is not valid UTF-8")]
    NotValidUtf8,

    /// The raw input starts with a byte that can never start a UTF-8 sequence.
    #[error("key starts with illegal byte {byte:#04x}")]
    IllegalStarterByte { byte: u8 },

    /// The key contains a reserved character, or trims down to nothing.
    #[error("key {key:?} contains illegal character {ch:?}")]
    IllegalChar { key: String, ch: char },

    /// The key contains a Unicode control character.
    #[error("key {key:?} contains control character {ch:?}")]
    ControlChar { key: String, ch: char },

    /// The key contains a character that is not printable.
    #[error("key {key:?} contains non-printable character {ch:?}")]
    NonPrintChar { key: String, ch: char },

    /// The key contains a code point that does not round-trip safely.
    #[error("key {key:?} contains out of range character U+{:04X}", u32::from(*.ch))]
    OutOfRange { key: String, ch: char },

    /// The key starts with a decimal digit.
    #[error("key {key:?} must not start with a digit")]
    Prefix { key: String },
}

impl KeyError {
    pub(crate) fn illegal_char(key: impl Into<String>, ch: char) -> Self {
        Self::IllegalChar {
            key: key.into(),
            ch,
        }
    }
}

// ============================================================================
// VALUE ERRORS
// ============================================================================

/// Failures while building, parsing or converting a [`Value`](crate::Value).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The input shape is not supported (unsupported kind, bad base, ...).
    #[error("invalid value: {reason}")]
    Invalid { reason: String },

    /// No conversion path exists, or the payload does not fit the target.
    #[error("cannot convert {input:?} from {from} to {to}")]
    Conv { from: Kind, to: Kind, input: String },

    /// Numeric literal is out of range for the requested width.
    #[error("{func}: parsing {input:?}: value out of range")]
    Range { func: &'static str, input: String },

    /// Malformed literal.
    #[error("{func}: parsing {input:?}: invalid syntax")]
    Syntax { func: &'static str, input: String },
}

impl ValueError {
    /// Create an invalid-input error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Create a conversion error
    pub fn conv(from: Kind, to: Kind, input: impl Into<String>) -> Self {
        Self::Conv {
            from,
            to,
            input: input.into(),
        }
    }

    /// Create a range error
    pub fn range(func: &'static str, input: impl Into<String>) -> Self {
        Self::Range {
            func,
            input: input.into(),
        }
    }

    /// Create a syntax error
    pub fn syntax(func: &'static str, input: impl Into<String>) -> Self {
        Self::Syntax {
            func,
            input: input.into(),
        }
    }

    /// True for [`ValueError::Range`].
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// True for [`ValueError::Syntax`].
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

// ============================================================================
// CRATE ERROR
// ============================================================================

/// Top-level error for variables and collections.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Name validation failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Value construction or conversion failed.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A write was attempted against a read-only entry.
    #[error("variable {name:?} is read-only")]
    ReadOnly { name: String },

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(String),
}

impl Error {
    pub(crate) fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }

    /// True for [`Error::ReadOnly`].
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_input() {
        let err = ValueError::syntax("parse_int", "12x");
        assert_eq!(err.to_string(), "parse_int: parsing \"12x\": invalid syntax");

        let err = ValueError::conv(Kind::String, Kind::Int, "abc");
        assert_eq!(err.to_string(), "cannot convert \"abc\" from string to int");

        let err = KeyError::OutOfRange {
            key: "a\u{fffe}".into(),
            ch: '\u{fffe}',
        };
        assert!(err.to_string().ends_with("U+FFFE"));
    }

    #[test]
    fn wraps_into_crate_error() {
        let err: Error = KeyError::Empty.into();
        assert_eq!(err, Error::Key(KeyError::Empty));
        assert!(!err.is_read_only());
        assert!(Error::read_only("x").is_read_only());
    }
}
