//! Flat JSON object format.
//!
//! Entries serialize as `name: payload`. Unmarshal maps JSON scalars back to
//! values: booleans to `Bool`, integers to `Int` (or `Uint64` past `i64`),
//! other numbers to `Float64`, strings to `String`. `null` entries are
//! skipped; arrays and objects are rejected.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

use super::{Map, ReadOnlyMap};
use crate::error::{Result, ValueError, ValueResult};
use crate::value::Value;
use crate::variable::Variable;

fn serialize_entries<'a, S: Serializer>(
    serializer: S,
    vars: impl ExactSizeIterator<Item = &'a Variable>,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(vars.len()))?;
    for var in vars {
        map.serialize_entry(var.name(), var.value())?;
    }
    map.end()
}

fn value_from_json(json: Json) -> ValueResult<Option<Value>> {
    let value = match json {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::new(b)?,
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                match isize::try_from(i) {
                    Ok(i) => Value::new(i)?,
                    Err(_) => Value::new(i)?,
                }
            } else if let Some(u) = n.as_u64() {
                Value::new(u)?
            } else {
                Value::new(n.as_f64().unwrap_or(f64::NAN))?
            }
        }
        Json::String(s) => Value::from(s),
        Json::Array(_) => return Err(ValueError::invalid("json arrays are not supported")),
        Json::Object(_) => return Err(ValueError::invalid("json objects are not supported")),
    };
    Ok(Some(value))
}

/// Variables for each non-null entry, in name order.
fn variables_from_json(object: BTreeMap<String, Json>) -> Result<Vec<Variable>> {
    let mut vars = Vec::with_capacity(object.len());
    for (name, json) in object {
        if let Some(value) = value_from_json(json)? {
            vars.push(Variable::new(&name, value, false)?);
        }
    }
    tracing::trace!(entries = vars.len(), "rebuilding collection from json");
    Ok(vars)
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_entries(serializer, self.all().iter())
    }
}

impl<'de> Deserialize<'de> for Map {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let object = Option::<BTreeMap<String, Json>>::deserialize(deserializer)?;
        let map = Map::new();
        for var in variables_from_json(object.unwrap_or_default()).map_err(D::Error::custom)? {
            map.store_variable(var).map_err(D::Error::custom)?;
        }
        Ok(map)
    }
}

/// An empty map serializes as `null`.
impl Serialize for ReadOnlyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_none();
        }
        serialize_entries(serializer, self.all().iter())
    }
}

impl<'de> Deserialize<'de> for ReadOnlyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let object = Option::<BTreeMap<String, Json>>::deserialize(deserializer)?;
        let mut map = ReadOnlyMap::new();
        for var in variables_from_json(object.unwrap_or_default()).map_err(D::Error::custom)? {
            map.store(var).map_err(D::Error::custom)?;
        }
        Ok(map)
    }
}

impl Map {
    /// Flat JSON object of every entry.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ReadOnlyMap {
    /// Flat JSON object of every entry; `null` when empty.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::duration::Duration;
    use crate::kind::Kind;

    #[test]
    fn marshals_flat_object() {
        let m = Map::new();
        m.store("b", true).unwrap();
        m.store("n", -3_i16).unwrap();
        m.store("f", 0.5_f32).unwrap();
        m.store("s", "text").unwrap();
        m.store("d", Duration::MINUTE).unwrap();
        assert_eq!(
            m.to_json().unwrap(),
            r#"{"b":true,"d":"1m0s","f":0.5,"n":-3,"s":"text"}"#
        );
        assert_eq!(Map::new().to_json().unwrap(), "{}");
    }

    #[test]
    fn unmarshals_scalars() {
        let m = Map::from_json(
            r#"{"b":false,"i":-7,"u":18446744073709551615,"f":2.5,"s":"x","skip":null}"#,
        )
        .unwrap();
        assert_eq!(m.keys(), vec!["b", "f", "i", "s", "u"]);
        assert_eq!(m.get("b").kind(), Kind::Bool);
        assert_eq!(m.get("i").kind(), Kind::Int);
        assert_eq!(m.get("u").kind(), Kind::Uint64);
        assert_eq!(m.get("f").kind(), Kind::Float64);
        assert_eq!(m.get("s").kind(), Kind::String);
        assert!(Map::from_json("null").unwrap().is_empty());
    }

    #[test]
    fn rejects_nested_values() {
        assert!(Map::from_json(r#"{"a":[1]}"#).is_err());
        assert!(Map::from_json(r#"{"a":{"b":1}}"#).is_err());
        assert!(Map::from_json(r#"{"1a":1}"#).is_err());
    }

    #[test]
    fn read_only_round_trip() {
        assert_eq!(ReadOnlyMap::new().to_json().unwrap(), "null");
        assert!(ReadOnlyMap::from_json("null").unwrap().is_empty());

        let ro = ReadOnlyMap::from_json(r#"{"port":8080,"host":"h"}"#).unwrap();
        assert!(ro.get("port").is_read_only());
        assert_eq!(ro.get("port").as_uint16().unwrap(), 8080);
        assert_eq!(ro.to_json().unwrap(), r#"{"host":"h","port":8080}"#);
    }
}
