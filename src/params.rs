use std::collections::HashMap;

use serde::Serialize;

use crate::translation::{Placeholder, PlaceholderToken};
use crate::types::SqlValue;

/// Key under which a caller supplies an argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ArgKey {
    fn from(value: usize) -> Self {
        ArgKey::Index(value)
    }
}

impl From<&str> for ArgKey {
    fn from(value: &str) -> Self {
        ArgKey::Name(value.to_owned())
    }
}

impl From<String> for ArgKey {
    fn from(value: String) -> Self {
        ArgKey::Name(value)
    }
}

/// Arguments for a query, addressed by position, by name, or both.
///
/// ```rust
/// use sql_helper::prelude::*;
///
/// let positional = QueryArgs::from(vec![SqlValue::Int(1), SqlValue::Text("a".into())]);
/// let named = QueryArgs::new().bind("id", 1_i64).bind("name", "a");
/// # let _ = (positional, named);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    values: HashMap<ArgKey, SqlValue>,
}

impl QueryArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bind(mut self, key: impl Into<ArgKey>, value: impl Into<SqlValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<ArgKey>, value: impl Into<SqlValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Append at the next free positional index.
    pub fn push(&mut self, value: impl Into<SqlValue>) {
        let next = self
            .values
            .keys()
            .filter_map(|key| match key {
                ArgKey::Index(i) => Some(i + 1),
                ArgKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.values.insert(ArgKey::Index(next), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &ArgKey) -> Option<&SqlValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Resolve the value for one placeholder occurrence: a name wins over the
    /// occurrence index; all-digit names also address that positional index.
    fn resolve(&self, occurrence: usize, placeholder: &Placeholder) -> Option<&SqlValue> {
        if let Placeholder::Named(name) = placeholder {
            if let Some(value) = self.values.get(&ArgKey::Name(name.clone())) {
                return Some(value);
            }
            if let Ok(index) = name.parse::<usize>()
                && let Some(value) = self.values.get(&ArgKey::Index(index))
            {
                return Some(value);
            }
        }
        self.values.get(&ArgKey::Index(occurrence))
    }
}

impl From<Vec<SqlValue>> for QueryArgs {
    fn from(values: Vec<SqlValue>) -> Self {
        Self {
            values: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (ArgKey::Index(i), v))
                .collect(),
        }
    }
}

impl From<&[SqlValue]> for QueryArgs {
    fn from(values: &[SqlValue]) -> Self {
        Self::from(values.to_vec())
    }
}

impl<K: Into<ArgKey>, V: Into<SqlValue>> FromIterator<(K, V)> for QueryArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Wire-level type tag of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    #[serde(rename = "s")]
    String,
    #[serde(rename = "i")]
    Integer,
    #[serde(rename = "b")]
    Blob,
    #[serde(rename = "d")]
    Double,
}

impl TypeTag {
    #[must_use]
    pub fn infer(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null | SqlValue::Text(_) => TypeTag::String,
            SqlValue::Bool(_) | SqlValue::Int(_) => TypeTag::Integer,
            SqlValue::Blob(_) => TypeTag::Blob,
            SqlValue::Float(_) => TypeTag::Double,
            SqlValue::Timestamp(_) | SqlValue::Json(_) => TypeTag::String,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            TypeTag::String => 's',
            TypeTag::Integer => 'i',
            TypeTag::Blob => 'b',
            TypeTag::Double => 'd',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundParameter {
    pub value: SqlValue,
    #[serde(rename = "paramtype")]
    pub tag: TypeTag,
}

impl BoundParameter {
    #[must_use]
    pub fn new(value: SqlValue) -> Self {
        let tag = TypeTag::infer(&value);
        Self { value, tag }
    }
}

/// Ordered, typed argument list handed to the driver as one aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bindings(pub Vec<BoundParameter>);

impl Bindings {
    /// Concatenated type tags, one character per bound parameter.
    #[must_use]
    pub fn signature(&self) -> String {
        self.0.iter().map(|p| p.tag.as_char()).collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<&SqlValue> {
        self.0.iter().map(|p| &p.value).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundParameter> {
        self.0.iter()
    }
}

/// Pair each placeholder occurrence with its argument and inferred type.
///
/// Occurrences without a matching argument are left out; the driver reports the
/// resulting count mismatch, if any.
#[must_use]
pub fn bind_parameters(args: &QueryArgs, positions: &[PlaceholderToken]) -> Bindings {
    Bindings(
        positions
            .iter()
            .enumerate()
            .filter_map(|(occurrence, token)| args.resolve(occurrence, &token.placeholder))
            .map(|value| BoundParameter::new(value.clone()))
            .collect(),
    )
}
