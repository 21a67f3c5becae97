//! Concurrent name → [`Variable`] collections.
//!
//! [`Map`] guards an ordered table with a reader/writer lock. Iteration
//! always runs over an owned snapshot taken under the read lock, so
//! callbacks may store into, delete from, or range over the same map.
//! [`ReadOnlyMap`] is the frozen counterpart and needs no lock.

mod json;
mod read_only;
mod text;

pub use read_only::ReadOnlyMap;

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::key::parse_key;
use crate::parser::BasicKindConvertible;
use crate::variable::Variable;

/// Thread-safe collection of variables ordered by name.
///
/// ```rust
/// use sdk_vars::Map;
///
/// let m = Map::new();
/// m.store("b", 2).unwrap();
/// m.store_read_only("a", "locked", true).unwrap();
///
/// assert!(m.store("a", "other").unwrap_err().is_read_only());
/// assert_eq!(m.get("a").as_str(), "locked");
/// assert_eq!(m.keys(), vec!["a", "b"]);
/// assert_eq!(m.to_key_val_lines(), vec!["a=locked", "b=2"]);
/// ```
#[derive(Default)]
pub struct Map {
    entries: RwLock<BTreeMap<String, Variable>>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. Fails if the existing entry is read-only.
    pub fn store<T: BasicKindConvertible>(&self, name: &str, input: T) -> Result<()> {
        self.store_read_only(name, input, false)
    }

    /// Insert or replace `name`, fixing its read-only flag.
    pub fn store_read_only<T: BasicKindConvertible>(
        &self,
        name: &str,
        input: T,
        read_only: bool,
    ) -> Result<()> {
        let var = Variable::new(name, input, read_only)?;
        self.store_variable(var)
    }

    /// Insert a prebuilt variable under its own name.
    pub fn store_variable(&self, var: Variable) -> Result<()> {
        let mut entries = self.entries.write();
        reject_read_only(&entries, var.name())?;
        entries.insert(var.name().to_owned(), var);
        Ok(())
    }

    /// The entry and whether it was present.
    pub fn load(&self, name: &str) -> (Variable, bool) {
        match self.entries.read().get(name) {
            Some(var) => (var.clone(), true),
            None => (Variable::empty(), false),
        }
    }

    /// The entry, or the empty sentinel.
    pub fn get(&self, name: &str) -> Variable {
        self.load(name).0
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn delete(&self, name: &str) {
        self.entries.write().remove(name);
    }

    /// Remove the entry, returning it and whether it was present.
    pub fn load_and_delete(&self, name: &str) -> (Variable, bool) {
        match self.entries.write().remove(name) {
            Some(var) => (var, true),
            None => (Variable::empty(), false),
        }
    }

    /// The entry if present, otherwise a variable built from `fallback`.
    ///
    /// Nothing is stored. A fallback that cannot be built yields the
    /// empty sentinel.
    pub fn load_or_default<T: BasicKindConvertible>(&self, name: &str, fallback: T) -> Variable {
        if let (var, true) = self.load(name) {
            return var;
        }
        Variable::new(name, fallback, false).unwrap_or_else(|err| {
            tracing::trace!(name, error = %err, "fallback variable rejected");
            Variable::empty()
        })
    }

    /// The existing entry with `true`, or the newly stored one with `false`.
    pub fn load_or_store<T: BasicKindConvertible>(
        &self,
        name: &str,
        input: T,
    ) -> Result<(Variable, bool)> {
        let key = parse_key(name)?;
        let mut entries = self.entries.write();
        if let Some(var) = entries.get(&key) {
            return Ok((var.clone(), true));
        }
        let var = Variable::new(&key, input, false)?;
        entries.insert(key, var.clone());
        Ok((var, false))
    }

    /// Call `f` for every entry in name order until it returns `false`.
    ///
    /// `f` sees a snapshot; it runs without any lock held.
    pub fn range<F: FnMut(&Variable) -> bool>(&self, mut f: F) {
        for var in &self.all() {
            if !f(var) {
                break;
            }
        }
    }

    /// Sorted snapshot of every entry.
    pub fn all(&self) -> Vec<Variable> {
        self.entries.read().values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// New map of the entries named `prefix…`, with the prefix removed.
    ///
    /// Entries whose stripped name is not a valid key are skipped. When two
    /// stripped names collide, the later one replaces the earlier unless the
    /// earlier is read-only.
    pub fn extract_with_prefix(&self, prefix: &str) -> Map {
        let out = Map::new();
        self.range(|var| {
            let Some(rest) = var.name().strip_prefix(prefix) else {
                return true;
            };
            match var.with_name(rest) {
                Ok(renamed) => {
                    if let Err(err) = out.store_variable(renamed) {
                        tracing::trace!(name = var.name(), prefix, error = %err, "skipping colliding name");
                    }
                }
                Err(err) => {
                    tracing::trace!(name = var.name(), prefix, error = %err, "skipping unprefixed name");
                }
            }
            true
        });
        out
    }

    /// Frozen view of the entries named `prefix…`, names kept whole.
    pub fn load_with_prefix(&self, prefix: &str) -> ReadOnlyMap {
        ReadOnlyMap::with_prefix(self, prefix)
    }

    /// Frozen copy of the whole map.
    pub fn snapshot(&self) -> ReadOnlyMap {
        ReadOnlyMap::from_map(self)
    }

    /// Runs `f` over the table under a single read lock.
    pub(crate) fn read_entries<R>(&self, f: impl FnOnce(&BTreeMap<String, Variable>) -> R) -> R {
        f(&self.entries.read())
    }
}

fn reject_read_only(entries: &BTreeMap<String, Variable>, name: &str) -> Result<()> {
    match entries.get(name) {
        Some(existing) if existing.is_read_only() => {
            tracing::debug!(name, "rejected write to read-only variable");
            Err(Error::read_only(name))
        }
        _ => Ok(()),
    }
}

impl Clone for Map {
    fn clone(&self) -> Self {
        Self {
            entries: RwLock::new(self.entries.read().clone()),
        }
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.all().iter().map(|v| (v.name().to_owned(), v.as_str().to_owned())))
            .finish()
    }
}

/// Later duplicates replace earlier ones unless the earlier is read-only.
impl FromIterator<Variable> for Map {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let map = Map::new();
        for var in iter {
            let _ = map.store_variable(var);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::kind::Kind;

    #[test]
    fn store_and_load() {
        let m = Map::new();
        assert!(m.is_empty());
        m.store("x", 1_i32).unwrap();
        m.store("x", 2_i32).unwrap();
        assert_eq!(m.len(), 1);

        let (v, ok) = m.load("x");
        assert!(ok);
        assert_eq!(v.as_int32().unwrap(), 2);

        let (missing, ok) = m.load("y");
        assert!(!ok);
        assert_eq!(missing, Variable::empty());
        assert!(m.store("", 1).is_err());
    }

    #[test]
    fn names_are_normalized() {
        let m = Map::new();
        m.store("  spaced  ", "v").unwrap();
        assert!(m.has("spaced"));
    }

    #[test]
    fn read_only_entries_stick() {
        let m = Map::new();
        m.store_read_only("x", "1", true).unwrap();
        let err = m.store("x", "2").unwrap_err();
        assert_eq!(err, Error::ReadOnly { name: "x".into() });
        assert_eq!(m.get("x").as_str(), "1");
        assert!(m.store_read_only("x", "3", true).is_err());
    }

    #[test]
    fn delete_and_load_and_delete() {
        let m = Map::new();
        m.store("a", true).unwrap();
        m.store("b", false).unwrap();
        let (v, ok) = m.load_and_delete("a");
        assert!(ok && v.as_bool().unwrap());
        assert!(!m.load_and_delete("a").1);
        m.delete("b");
        assert!(m.is_empty());
    }

    #[test]
    fn load_or_default_does_not_store() {
        let m = Map::new();
        m.store("set", 5_u8).unwrap();
        assert_eq!(m.load_or_default("set", 9_u8).as_uint8().unwrap(), 5);
        let v = m.load_or_default("unset", 9_u8);
        assert_eq!(v.as_uint8().unwrap(), 9);
        assert!(!m.has("unset"));
        assert_eq!(m.load_or_default("", 1), Variable::empty());
    }

    #[test]
    fn load_or_store_reports_presence() {
        let m = Map::new();
        let (v, loaded) = m.load_or_store("k", "first").unwrap();
        assert!(!loaded);
        assert_eq!(v.as_str(), "first");
        let (v, loaded) = m.load_or_store("k", "second").unwrap();
        assert!(loaded);
        assert_eq!(v.as_str(), "first");
    }

    #[test]
    fn range_stops_early_and_allows_reentry() {
        let m: Map = ["c", "a", "b"]
            .iter()
            .map(|n| Variable::new(n, *n, false).unwrap())
            .collect();

        let mut seen = Vec::new();
        m.range(|v| {
            seen.push(v.name().to_owned());
            m.store(&format!("{}2", v.name()), 0).unwrap();
            m.range(|_| true);
            v.name() != "b"
        });
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn prefixes() {
        let m = Map::new();
        m.store("app.name", "demo").unwrap();
        m.store_read_only("app.port", 80_u16, true).unwrap();
        m.store("app.", "dropped").unwrap();
        m.store("other", 1).unwrap();

        let sub = m.extract_with_prefix("app.");
        assert_eq!(sub.keys(), vec!["name", "port"]);
        assert_eq!(sub.get("port").kind(), Kind::Uint16);
        assert!(sub.get("port").is_read_only());

        let ro = m.load_with_prefix("app.");
        assert_eq!(ro.keys(), vec!["app.", "app.name", "app.port"]);
    }

    #[test]
    fn prefix_collisions_keep_read_only_entry() {
        let m = Map::new();
        m.store_read_only("app. x", "ro", true).unwrap();
        m.store("app.x", "rw").unwrap();
        m.store("app. y", "first").unwrap();
        m.store("app.y", "second").unwrap();

        let sub = m.extract_with_prefix("app.");
        assert_eq!(sub.keys(), vec!["x", "y"]);
        assert_eq!(sub.get("x").as_str(), "ro");
        assert!(sub.get("x").is_read_only());
        assert_eq!(sub.get("y").as_str(), "second");
    }

    #[test]
    fn clone_is_independent() {
        let m = Map::new();
        m.store("a", 1).unwrap();
        let c = m.clone();
        m.store("b", 2).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(format!("{c:?}"), r#"{"a": "1"}"#);
    }
}
