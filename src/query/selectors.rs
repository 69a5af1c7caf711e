//! Path steps for schema queries
//!
//! Splitting of path expressions into steps and parsing of a single step
//! (axis plus node test). Prefixes are kept unresolved here; they are bound
//! to namespace URIs when a query is evaluated.

use crate::error::{Error, Result};
use crate::names::is_valid_ncname;

/// A single step in a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// The axis of the step
    pub kind: PathStepKind,
    /// What the step selects on that axis
    pub test: NodeTest,
}

/// Kind of path step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStepKind {
    /// Child axis (default)
    Child,
    /// Attribute axis (@)
    Attribute,
    /// Descendant-or-self axis (//)
    DescendantOrSelf,
    /// Self axis (.)
    Self_,
    /// Parent axis (..)
    Parent,
}

/// Node test of a step, with the prefix still unresolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`: any element (or any attribute on the attribute axis)
    Any,
    /// `prefix:*`
    AnyIn(String),
    /// `local` or `prefix:local`
    Name {
        /// Optional namespace prefix
        prefix: Option<String>,
        /// Local name
        local: String,
    },
    /// `text()`
    Text,
    /// `node()`
    Node,
}

impl PathStep {
    /// Parse a step from a string
    pub fn parse(step: &str) -> Result<Self> {
        let step = step.trim();

        match step {
            "." | "self::node()" => {
                return Ok(Self {
                    kind: PathStepKind::Self_,
                    test: NodeTest::Node,
                })
            }
            ".." | "parent::node()" => {
                return Ok(Self {
                    kind: PathStepKind::Parent,
                    test: NodeTest::Node,
                })
            }
            ".//" => {
                return Ok(Self {
                    kind: PathStepKind::DescendantOrSelf,
                    test: NodeTest::Node,
                })
            }
            _ => {}
        }

        let (kind, rest) = if let Some(rest) = step.strip_prefix('@') {
            (PathStepKind::Attribute, rest)
        } else if let Some(rest) = step.strip_prefix("attribute::") {
            (PathStepKind::Attribute, rest)
        } else if let Some(rest) = step.strip_prefix("child::") {
            (PathStepKind::Child, rest)
        } else {
            (PathStepKind::Child, step)
        };

        if rest.contains('[') {
            return Err(Error::Query(format!("predicates are not supported: '{}'", step)));
        }

        let test = NodeTest::parse(rest)?;
        if kind == PathStepKind::Attribute && matches!(test, NodeTest::Text) {
            return Err(Error::Query(format!("text() on the attribute axis: '{}'", step)));
        }

        Ok(Self { kind, test })
    }

    /// Create a child step
    pub fn child(local: impl Into<String>) -> Self {
        Self {
            kind: PathStepKind::Child,
            test: NodeTest::Name {
                prefix: None,
                local: local.into(),
            },
        }
    }

    /// Check if this step matches any element or attribute (`*`)
    pub fn is_wildcard(&self) -> bool {
        matches!(self.test, NodeTest::Any)
    }
}

impl NodeTest {
    fn parse(test: &str) -> Result<Self> {
        match test {
            "*" => return Ok(NodeTest::Any),
            "text()" => return Ok(NodeTest::Text),
            "node()" => return Ok(NodeTest::Node),
            _ => {}
        }

        let (prefix, local) = match test.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, test),
        };

        if let Some(prefix) = prefix {
            if !is_valid_ncname(prefix) {
                return Err(Error::Query(format!("invalid prefix in '{}'", test)));
            }
            if local == "*" {
                return Ok(NodeTest::AnyIn(prefix.to_string()));
            }
        }

        if !is_valid_ncname(local) {
            return Err(Error::Query(format!("invalid name test '{}'", test)));
        }

        Ok(NodeTest::Name {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        })
    }
}

/// Split a path expression into path steps
///
/// Handles both `/` and `//` separators. A leading `/` is not returned as a
/// step; callers check for it themselves.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.trim();

    if path.is_empty() {
        return Vec::new();
    }

    let mut steps = Vec::new();
    let mut current_start = 0;

    // Handle .// (self + descendant-or-self)
    if path.starts_with(".//") {
        steps.push(".");
        steps.push(".//");
        current_start = 3;
    }
    // Handle ./ (self + child)
    else if path.starts_with("./") {
        steps.push(".");
        current_start = 2;
    }
    // Handle single .
    else if path == "." {
        return vec!["."];
    }
    // Handle leading //
    else if path.starts_with("//") {
        steps.push(".//");
        current_start = 2;
    }
    // Handle leading /
    else if path.starts_with('/') {
        current_start = 1;
    }

    let bytes = path.as_bytes();
    let len = bytes.len();
    let mut i = current_start;

    while i < len {
        if bytes[i] == b'/' {
            let is_double = i + 1 < len && bytes[i + 1] == b'/';

            if i > current_start {
                steps.push(&path[current_start..i]);
            }

            if is_double {
                steps.push(".//");
                current_start = i + 2;
                i += 2;
            } else {
                current_start = i + 1;
                i += 1;
            }
        } else {
            i += 1;
        }
    }

    if current_start < len {
        steps.push(&path[current_start..]);
    }

    steps
}
