//! Entity mappings used to fill path patterns.
//!
//! An [`Entities`] value maps entity names (such as `subject`, `session` or
//! `run`) to [`EntityValue`]s. Values are either text or numbers and are
//! converted to their string form when substituted into a pattern.
//!
//! # Example
//!
//! ```
//! use shelve_core::entity::Entities;
//!
//! let entities = Entities::new()
//!     .with("subject", "03")
//!     .with("run", 2);
//!
//! assert_eq!(entities.get("subject").map(ToString::to_string), Some("03".to_string()));
//! assert_eq!(entities.get("run").map(ToString::to_string), Some("2".to_string()));
//! assert!(entities.get("session").is_none());
//! ```

use std::{
    collections::{HashMap, hash_map},
    fmt,
};

use serde::Deserialize;

/// A single entity value.
///
/// Text values are substituted verbatim, so zero-padded identifiers such as
/// `"03"` keep their padding. Numbers are rendered with their natural
/// decimal form; floats with no fractional part keep a trailing `.0`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityValue::Text(text) => f.write_str(text),
            EntityValue::Integer(value) => write!(f, "{value}"),
            EntityValue::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            EntityValue::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for EntityValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for EntityValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for EntityValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// An unordered mapping from entity names to values.
///
/// The mapping is supplied by the caller and is only read while a path is
/// being resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Entities(HashMap<String, EntityValue>);

impl Entities {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mapping with `name` set to `value`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<EntityValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name` to `value`, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<EntityValue>,
    ) -> Option<EntityValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Returns the value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&EntityValue> {
        self.0.get(name)
    }

    /// Returns `true` if the mapping has a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over entity names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, EntityValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Entities
where
    K: Into<String>,
    V: Into<EntityValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Entities {
    type Item = (&'a String, &'a EntityValue);
    type IntoIter = hash_map::Iter<'a, String, EntityValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
