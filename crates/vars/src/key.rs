//! Variable name validation.
//!
//! Names are trimmed of a fixed set of wrapper characters (whitespace,
//! quotes, backslash) and then scanned character by character. Internal
//! spaces survive; everything that would break the `key=value` line format
//! or an environment export does not.

use crate::error::KeyError;

/// Characters that would corrupt `key=value` lines or shell exports.
const ILLEGAL: &[char] = &['=', '$', '\\', '"', '\'', '`', '\t', '\r', '\n'];

/// Stripped from both ends before validation.
fn is_auto_trimmable(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '"' | '\'' | '`' | '\\')
}

/// Validate and normalize a variable name.
///
/// ```rust
/// use sdk_vars::{parse_key, KeyError};
///
/// assert_eq!(parse_key(" key ").unwrap(), "key");
/// assert_eq!(parse_key("\"app name\"").unwrap(), "app name");
/// assert!(matches!(parse_key("1st"), Err(KeyError::Prefix { .. })));
/// assert!(matches!(parse_key("a=b"), Err(KeyError::IllegalChar { .. })));
/// ```
pub fn parse_key(input: &str) -> Result<String, KeyError> {
    if input.is_empty() {
        return Err(KeyError::Empty);
    }

    let key = input.trim_matches(is_auto_trimmable);
    let Some(first) = key.chars().next() else {
        // Trimmed away entirely; report the first character that was stripped.
        let ch = input.chars().next().unwrap_or(' ');
        return Err(KeyError::illegal_char(input, ch));
    };

    if first.is_ascii_digit() {
        return Err(KeyError::Prefix { key: key.to_owned() });
    }

    for ch in key.chars() {
        if ch.is_control() {
            return Err(KeyError::ControlChar {
                key: key.to_owned(),
                ch,
            });
        }
        if is_out_of_range(ch) {
            return Err(KeyError::OutOfRange {
                key: key.to_owned(),
                ch,
            });
        }
        if !is_printable(ch) {
            return Err(KeyError::NonPrintChar {
                key: key.to_owned(),
                ch,
            });
        }
        if ILLEGAL.contains(&ch) {
            return Err(KeyError::illegal_char(key, ch));
        }
    }

    Ok(key.to_owned())
}

/// Validate a name supplied as raw bytes (for example read from an
/// environment block or a file).
pub fn parse_key_bytes(input: &[u8]) -> Result<String, KeyError> {
    if input.is_empty() {
        return Err(KeyError::Empty);
    }
    match std::str::from_utf8(input) {
        Ok(s) => parse_key(s),
        Err(err) if err.valid_up_to() == 0 && !is_utf8_starter(input[0]) => {
            Err(KeyError::IllegalStarterByte { byte: input[0] })
        }
        Err(_) => Err(KeyError::NotValidUtf8),
    }
}

/// True if `input` would be accepted by [`parse_key`].
pub fn is_valid_key(input: &str) -> bool {
    parse_key(input).is_ok()
}

/// Bytes that may begin a UTF-8 sequence.
const fn is_utf8_starter(byte: u8) -> bool {
    matches!(byte, 0x00..=0x7f | 0xc2..=0xf4)
}

/// Replacement character and Unicode noncharacters.
fn is_out_of_range(ch: char) -> bool {
    let cp = u32::from(ch);
    ch == char::REPLACEMENT_CHARACTER || (0xfdd0..=0xfdef).contains(&cp) || cp & 0xfffe == 0xfffe
}

/// Graphic characters plus the ASCII space.
///
/// Rejects separators other than U+0020, format characters (Cf) and the
/// private use areas; control characters are handled by the caller.
fn is_printable(ch: char) -> bool {
    if ch == ' ' {
        return true;
    }
    if ch.is_whitespace() {
        return false;
    }
    let cp = u32::from(ch);
    !matches!(
        cp,
        0x00ad
            | 0x0600..=0x0605
            | 0x061c
            | 0x06dd
            | 0x070f
            | 0x08e2
            | 0x180e
            | 0x200b..=0x200f
            | 0x202a..=0x202e
            | 0x2060..=0x2064
            | 0x2066..=0x206f
            | 0xfeff
            | 0xfff9..=0xfffb
            | 0x110bd
            | 0x110cd
            | 0x13430..=0x1343f
            | 0x1bca0..=0x1bca3
            | 0x1d173..=0x1d17a
            | 0xe0001
            | 0xe0020..=0xe007f
            | 0xe000..=0xf8ff
            | 0xf0000..=0xffffd
            | 0x100000..=0x10fffd
    )
}
