//! The schema object model
//!
//! A [`SchemaModel`] is the result of one schema run: the root context under
//! the `elements` key, holding one nested context per top-level construct.

use crate::builtins::{self, BuiltinType};
use crate::context::ObjectContext;
use crate::dispatch::BASE_KEY;
use crate::error::Result;
use crate::namespaces::NamespaceBindings;
use serde::{Deserialize, Serialize};

/// Nested model of a schema's top-level constructs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    /// Root context
    pub elements: ObjectContext,
}

/// One line of a model overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructSummary {
    /// Top-level key
    pub name: String,
    /// `type` or, failing that, `base` of the construct
    pub type_ref: Option<String>,
    /// Built-in datatype behind `type_ref`, if any
    pub builtin: Option<BuiltinType>,
    /// Number of nested contexts (children, attributes, properties)
    pub children: usize,
}

impl SchemaModel {
    /// Wrap a root context
    pub fn new(elements: ObjectContext) -> Self {
        Self { elements }
    }

    /// Names of the top-level constructs in document order
    pub fn top_level_names(&self) -> impl Iterator<Item = &str> {
        self.elements.contexts().map(|(name, _)| name)
    }

    /// A top-level construct by name
    pub fn get(&self, name: &str) -> Option<&ObjectContext> {
        self.elements.context(name)
    }

    /// Number of top-level constructs
    pub fn len(&self) -> usize {
        self.elements.contexts().count()
    }

    /// True if the schema declared nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty JSON of the whole model
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Overview of every top-level construct
    pub fn summaries(&self, bindings: &NamespaceBindings) -> Vec<ConstructSummary> {
        self.elements
            .contexts()
            .map(|(name, construct)| {
                let type_ref = construct
                    .scalar("type")
                    .or_else(|| construct.scalar(BASE_KEY))
                    .map(str::to_string);
                let builtin = type_ref
                    .as_deref()
                    .and_then(|t| builtins::resolve_type(t, bindings));

                ConstructSummary {
                    name: name.to_string(),
                    type_ref,
                    builtin,
                    children: construct.contexts().count(),
                }
            })
            .collect()
    }
}
