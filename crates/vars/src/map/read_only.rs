use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::map::Map;
use crate::variable::Variable;

/// Immutable collection of variables ordered by name.
///
/// Every entry is read-only. Built from a [`Map`], an iterator, text or
/// JSON, and never changed afterwards.
///
/// ```rust
/// use sdk_vars::{Map, ReadOnlyMap};
///
/// let m = Map::new();
/// m.store("db.host", "localhost").unwrap();
/// m.store("db.port", 5432).unwrap();
/// m.store("log", "info").unwrap();
///
/// let db = ReadOnlyMap::with_prefix(&m, "db.");
/// assert_eq!(db.keys(), vec!["db.host", "db.port"]);
/// assert!(db.get("db.port").is_read_only());
/// assert_eq!(ReadOnlyMap::new().to_json().unwrap(), "null");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOnlyMap {
    entries: BTreeMap<String, Variable>,
}

impl ReadOnlyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frozen copy of every entry in `map`.
    pub fn from_map(map: &Map) -> Self {
        Self::with_prefix(map, "")
    }

    /// Frozen copy of the entries named `prefix…`, taken under one read lock.
    pub fn with_prefix(map: &Map, prefix: &str) -> Self {
        let entries = map.read_entries(|entries| {
            entries
                .range(prefix.to_owned()..)
                .take_while(|(name, _)| name.starts_with(prefix))
                .map(|(name, var)| (name.clone(), var.clone().into_read_only()))
                .collect()
        });
        Self { entries }
    }

    /// Construction-time insert. Existing entries are never replaced.
    pub(crate) fn store(&mut self, var: Variable) -> Result<()> {
        if self.entries.contains_key(var.name()) {
            tracing::debug!(name = var.name(), "rejected write to read-only variable");
            return Err(Error::read_only(var.name()));
        }
        self.entries.insert(var.name().to_owned(), var.into_read_only());
        Ok(())
    }

    pub fn load(&self, name: &str) -> (Variable, bool) {
        match self.entries.get(name) {
            Some(var) => (var.clone(), true),
            None => (Variable::empty(), false),
        }
    }

    pub fn get(&self, name: &str) -> Variable {
        self.load(name).0
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> Vec<Variable> {
        self.entries.values().cloned().collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Iterate entries in name order until `f` returns `false`.
    pub fn range<F: FnMut(&Variable) -> bool>(&self, mut f: F) {
        for var in self.entries.values() {
            if !f(var) {
                break;
            }
        }
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Variable> {
        self.entries.values()
    }
}

/// The first occurrence of a name wins.
impl FromIterator<Variable> for ReadOnlyMap {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut map = Self::new();
        for var in iter {
            let _ = map.store(var);
        }
        map
    }
}

impl From<&Map> for ReadOnlyMap {
    fn from(map: &Map) -> Self {
        Self::from_map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_become_read_only() {
        let m = Map::new();
        m.store("a", 1).unwrap();
        let ro = ReadOnlyMap::from_map(&m);
        assert!(ro.get("a").is_read_only());
        assert!(!m.get("a").is_read_only());
    }

    #[test]
    fn first_duplicate_wins() {
        let ro: ReadOnlyMap = [("k", "1"), ("k", "2"), ("j", "3")]
            .into_iter()
            .map(|(n, v)| Variable::new(n, v, false).unwrap())
            .collect();
        assert_eq!(ro.len(), 2);
        assert_eq!(ro.get("k").as_str(), "1");
    }

    #[test]
    fn store_rejects_existing() {
        let mut ro = ReadOnlyMap::new();
        ro.store(Variable::new("a", 1, false).unwrap()).unwrap();
        let err = ro.store(Variable::new("a", 2, false).unwrap()).unwrap_err();
        assert!(err.is_read_only());
    }

    #[test]
    fn prefix_scan_is_exact() {
        let m = Map::new();
        for name in ["a", "ab", "abc", "b", "a b"] {
            m.store(name, name).unwrap();
        }
        let ro = ReadOnlyMap::with_prefix(&m, "ab");
        assert_eq!(ro.keys(), vec!["ab", "abc"]);

        let mut seen = Vec::new();
        ReadOnlyMap::from_map(&m).range(|v| {
            seen.push(v.name().to_owned());
            seen.len() < 2
        });
        assert_eq!(seen, vec!["a", "a b"]);
    }
}
