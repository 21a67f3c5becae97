//! `key=value` line format.

use super::{Map, ReadOnlyMap};
use crate::error::{Result, ValueError};
use crate::variable::{parse_variable_from_string, Variable};

fn key_val_lines<'a>(vars: impl Iterator<Item = &'a Variable>) -> Vec<String> {
    vars.map(|v| format!("{}={}", v.name(), v.as_str())).collect()
}

fn to_bytes(lines: Vec<String>) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    out
}

/// Parse every non-blank line as a `key=value` pair.
fn parse_lines(text: &str) -> Result<Vec<Variable>> {
    let mut vars = Vec::new();
    for (no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            tracing::trace!(line = no + 1, "skipping blank line");
            continue;
        }
        vars.push(parse_variable_from_string(line)?);
    }
    Ok(vars)
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|err| ValueError::invalid(format!("input is not valid UTF-8: {err}")).into())
}

impl Map {
    /// `name=value` for every entry, in name order.
    pub fn to_key_val_lines(&self) -> Vec<String> {
        key_val_lines(self.all().iter())
    }

    /// The key/value lines, each terminated by `\n`.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_bytes(self.to_key_val_lines())
    }

    /// Parse `key=value` lines.
    ///
    /// Blank lines are ignored, each line is trimmed, and one pair of
    /// double quotes around a value is removed. Later lines replace
    /// earlier ones.
    ///
    /// ```rust
    /// use sdk_vars::Map;
    ///
    /// let m = Map::from_text("name=\"x y\"\n\n  level=3\n").unwrap();
    /// assert_eq!(m.get("name").as_str(), "x y");
    /// assert_eq!(m.get("level").as_str(), "3");
    /// assert_eq!(m.to_bytes(), b"level=3\nname=x y\n");
    /// ```
    pub fn from_text(text: &str) -> Result<Self> {
        let map = Map::new();
        for var in parse_lines(text)? {
            map.store_variable(var)?;
        }
        Ok(map)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_text(utf8(bytes)?)
    }
}

impl ReadOnlyMap {
    pub fn to_key_val_lines(&self) -> Vec<String> {
        key_val_lines(self.values())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        to_bytes(self.to_key_val_lines())
    }

    /// Parse `key=value` lines. A repeated name is an error.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut map = ReadOnlyMap::new();
        for var in parse_lines(text)? {
            map.store(var)?;
        }
        Ok(map)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_text(utf8(bytes)?)
    }
}
