//! Object contexts
//!
//! An [`ObjectContext`] is the nested key/value structure the transformer
//! builds for one schema construct. Values are either scalar strings (copied
//! attribute values, documentation text) or nested contexts. Keys keep their
//! insertion order so the JSON dump follows document order.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value stored in an [`ObjectContext`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Attribute value or text content
    Scalar(String),
    /// A nested construct
    Context(ObjectContext),
}

impl Value {
    /// The scalar string, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Context(_) => None,
        }
    }

    /// The nested context, if this is one
    pub fn as_context(&self) -> Option<&ObjectContext> {
        match self {
            Value::Context(ctx) => Some(ctx),
            Value::Scalar(_) => None,
        }
    }
}

/// Result of inserting a nested context
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion<'c> {
    /// The key was free; here is the new context
    Inserted(&'c mut ObjectContext),
    /// The key was taken and has been replaced by a fresh context
    Replaced(&'c mut ObjectContext),
    /// The key was taken and left untouched
    Occupied,
}

/// Result of setting a scalar with [`ObjectContext::set_scalar_checked`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarInsertion {
    /// The key was free or held a scalar
    Set,
    /// The key held a nested context, which has been overwritten
    Replaced,
    /// The key holds a nested context and was left untouched
    Occupied,
}

/// Mutable mapping from keys to scalars or nested contexts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectContext {
    entries: IndexMap<String, Value>,
}

impl ObjectContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar, overwriting whatever was stored under `key`
    pub fn set_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Value::Scalar(value.into()));
    }

    /// Set a scalar unless `key` holds a nested context
    ///
    /// Scalars are always overwritten. A nested context is only overwritten
    /// when `replace` is true.
    pub fn set_scalar_checked(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        replace: bool,
    ) -> ScalarInsertion {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::Scalar(value.into()));
                ScalarInsertion::Set
            }
            Entry::Occupied(mut slot) => {
                let nested = matches!(slot.get(), Value::Context(_));
                if nested && !replace {
                    return ScalarInsertion::Occupied;
                }
                slot.insert(Value::Scalar(value.into()));
                if nested {
                    ScalarInsertion::Replaced
                } else {
                    ScalarInsertion::Set
                }
            }
        }
    }

    /// Insert a fresh nested context under `key`
    ///
    /// With `replace` false an existing key is left alone and
    /// [`Insertion::Occupied`] is returned; with `replace` true the old
    /// value is overwritten in place.
    pub fn insert_context(&mut self, key: impl Into<String>, replace: bool) -> Insertion<'_> {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => match slot.insert(Value::Context(ObjectContext::new())) {
                Value::Context(ctx) => Insertion::Inserted(ctx),
                Value::Scalar(_) => unreachable!("a context was just inserted"),
            },
            Entry::Occupied(_) if !replace => Insertion::Occupied,
            Entry::Occupied(slot) => {
                let value = slot.into_mut();
                *value = Value::Context(ObjectContext::new());
                match value {
                    Value::Context(ctx) => Insertion::Replaced(ctx),
                    Value::Scalar(_) => unreachable!("a context was just stored"),
                }
            }
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a scalar by key
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_scalar)
    }

    /// Get a nested context by key
    pub fn context(&self, key: &str) -> Option<&ObjectContext> {
        self.get(key).and_then(Value::as_context)
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All scalar entries in insertion order
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(k, v)| v.as_scalar().map(|s| (k, s)))
    }

    /// All nested contexts in insertion order
    pub fn contexts(&self) -> impl Iterator<Item = (&str, &ObjectContext)> {
        self.iter().filter_map(|(k, v)| v.as_context().map(|c| (k, c)))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
