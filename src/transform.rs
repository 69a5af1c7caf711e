//! Recursive tree transformer
//!
//! Folds a schema DOM into nested [`ObjectContext`]s. For every node the
//! transformer copies the node's attributes into the current context, then
//! walks the element children in document order and dispatches each one
//! through the [`DispatchTable`]:
//!
//! 1. no rule: the child is folded into the current context
//! 2. pre hook: decides whether the child gets a fresh nested context
//! 3. recursion with the rule's ignored attributes
//! 4. post hook: may set scalars on the outer context
//!
//! Nested contexts are inserted only here, so every context has exactly one
//! inserter. Key collisions between siblings are reported as
//! [`Error::DuplicateKey`] unless last-wins mode is selected.

use crate::context::{Insertion, ObjectContext, ScalarInsertion};
use crate::dispatch::{Descent, DispatchTable, Scope};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::NamespaceBindings;
use crate::query::{Match, Query};
use once_cell::sync::Lazy;
use roxmltree::Node;
use serde::Deserialize;
use tracing::{debug, trace, warn};

static CHILD_ELEMENTS: Lazy<Query> =
    Lazy::new(|| Query::parse("*").expect("* is a valid query"));

static ALL_ATTRIBUTES: Lazy<Query> =
    Lazy::new(|| Query::parse("@*").expect("@* is a valid query"));

/// What to do when two siblings resolve to the same key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateKeyPolicy {
    /// Fail with [`Error::DuplicateKey`]
    #[default]
    Reject,
    /// Replace the earlier context with the later one
    LastWins,
}

/// What to do with a named construct that has neither `name` nor `ref`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingIdentifierPolicy {
    /// Fail with [`Error::MissingIdentifier`]
    #[default]
    Reject,
    /// Drop the construct and its subtree
    Skip,
}

/// Options handed to the transformer and to every hook
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Duplicate sibling key handling
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Missing `name`/`ref` handling
    pub missing_identifier: MissingIdentifierPolicy,
    /// Depth and attribute limits
    pub limits: Limits,
    /// Prefix bindings for queries
    pub namespaces: NamespaceBindings,
}

/// Copy every attribute of `node` not listed in `ignored` into `context`
///
/// Attributes are keyed by local name. Existing values are overwritten, so
/// repeating the copy leaves the context unchanged.
pub fn copy_attributes(
    context: &mut ObjectContext,
    node: Node<'_, '_>,
    ignored: &[&str],
    bindings: &NamespaceBindings,
) {
    for attr in ALL_ATTRIBUTES.select(node, bindings).iter() {
        if let Match::Attribute(attr) = attr {
            if !ignored.contains(&attr.name()) {
                context.set_scalar(attr.name(), attr.value());
            }
        }
    }
}

/// Walks a schema DOM with a dispatch table
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'t> {
    table: &'t DispatchTable,
    options: &'t TransformOptions,
}

impl<'t> Transformer<'t> {
    /// Create a transformer over `table`
    pub fn new(table: &'t DispatchTable, options: &'t TransformOptions) -> Self {
        Self { table, options }
    }

    /// Fold `node` and its subtree into `context`, returning the same context
    pub fn transform<'c>(
        &self,
        context: &'c mut ObjectContext,
        node: Node<'_, '_>,
        ignored: &[&str],
    ) -> Result<&'c mut ObjectContext> {
        self.walk(context, node, ignored, 1)?;
        Ok(context)
    }

    fn walk(
        &self,
        context: &mut ObjectContext,
        node: Node<'_, '_>,
        ignored: &[&str],
        depth: usize,
    ) -> Result<()> {
        self.options.limits.check_xml_depth(depth)?;

        copy_attributes(context, node, ignored, &self.options.namespaces);

        for child in CHILD_ELEMENTS.select(node, &self.options.namespaces).nodes() {
            let kind = child.tag_name().name();

            let rule = match child.tag_name().namespace() {
                Some(crate::XSD_NAMESPACE) => self.table.rule_for(kind),
                _ => None,
            };
            let Some(rule) = rule else {
                debug!(element = kind, "no rule, folding into parent context");
                self.walk(context, child, &[], depth + 1)?;
                continue;
            };

            trace!(element = kind, "dispatch");
            let Descent { scalars, scope } = match rule.pre {
                Some(pre) => pre(self.options, context, child)?,
                None => Descent::current(),
            };

            self.set_scalars(context, scalars, child)?;

            match scope {
                Scope::Skip => continue,
                Scope::Current => self.walk(context, child, rule.ignored, depth + 1)?,
                Scope::Nested(key) => {
                    let child_context = self.insert_child(context, &key, child)?;
                    self.walk(child_context, child, rule.ignored, depth + 1)?;
                }
            }

            if let Some(post) = rule.post {
                let scalars = post(self.options, context, child)?;
                self.set_scalars(context, scalars, child)?;
            }
        }

        Ok(())
    }

    fn set_scalars(
        &self,
        context: &mut ObjectContext,
        scalars: Vec<(String, String)>,
        node: Node<'_, '_>,
    ) -> Result<()> {
        let replace = self.options.duplicate_keys == DuplicateKeyPolicy::LastWins;

        for (key, value) in scalars {
            match context.set_scalar_checked(key.as_str(), value, replace) {
                ScalarInsertion::Set => {}
                ScalarInsertion::Replaced => warn!(
                    key = key.as_str(),
                    location = %crate::error::node_location(node),
                    "duplicate key, scalar replaces a nested construct"
                ),
                ScalarInsertion::Occupied => return Err(Error::duplicate_key(&key, node)),
            }
        }

        Ok(())
    }

    fn insert_child<'c>(
        &self,
        context: &'c mut ObjectContext,
        key: &str,
        node: Node<'_, '_>,
    ) -> Result<&'c mut ObjectContext> {
        let replace = self.options.duplicate_keys == DuplicateKeyPolicy::LastWins;

        match context.insert_context(key, replace) {
            Insertion::Inserted(child) => Ok(child),
            Insertion::Replaced(child) => {
                warn!(
                    key,
                    location = %crate::error::node_location(node),
                    "duplicate key, keeping the later construct"
                );
                Ok(child)
            }
            Insertion::Occupied => Err(Error::duplicate_key(key, node)),
        }
    }
}
