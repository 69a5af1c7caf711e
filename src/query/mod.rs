//! Namespace-aware path queries over a parsed schema document
//!
//! A deliberately small subset of XPath location paths:
//!
//! - absolute (`/xs:schema`) and relative paths
//! - child, attribute (`@`), self (`.`), parent (`..`) and
//!   descendant-or-self (`//`) axes
//! - name tests (`xs:element`, `*`, `xs:*`) plus `text()` and `node()`
//!
//! Prefixes are resolved through [`NamespaceBindings`] when a query is
//! evaluated. An unbound prefix means "no namespace" rather than an error.
//! Evaluation is lazy, and a [`Selection`] can be iterated any number of
//! times.

mod selectors;

pub use selectors::{split_path, NodeTest, PathStep, PathStepKind};

use crate::error::{Error, Result};
use crate::namespaces::NamespaceBindings;
use roxmltree::{Attribute, Node};
use std::str::FromStr;

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    expression: String,
    absolute: bool,
    steps: Vec<PathStep>,
}

impl Query {
    /// Parse a path expression
    pub fn parse(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(Error::Query("empty path expression".to_string()));
        }

        let absolute = trimmed.starts_with('/');
        let steps = split_path(trimmed)
            .into_iter()
            .map(PathStep::parse)
            .collect::<Result<Vec<_>>>()?;

        if let Some(pos) = steps
            .iter()
            .position(|s| s.kind == PathStepKind::Attribute)
        {
            if pos + 1 != steps.len() {
                return Err(Error::Query(format!(
                    "attribute step must be the last step in '{}'",
                    trimmed
                )));
            }
        }

        Ok(Self {
            expression: trimmed.to_string(),
            absolute,
            steps,
        })
    }

    /// The original expression
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the path starts at the document root
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// The parsed steps
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Bind this query to a context node
    pub fn select<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        bindings: &NamespaceBindings,
    ) -> Selection<'a, 'input> {
        let origin = if self.absolute {
            node.document().root()
        } else {
            node
        };

        Selection {
            origin,
            steps: self
                .steps
                .iter()
                .map(|step| ResolvedStep::resolve(step, bindings))
                .collect(),
        }
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Query::parse(s)
    }
}

/// Parse `expression` and select from `node` in one call
pub fn query<'a, 'input>(
    node: Node<'a, 'input>,
    expression: &str,
    bindings: &NamespaceBindings,
) -> Result<Selection<'a, 'input>> {
    Ok(Query::parse(expression)?.select(node, bindings))
}

/// One result of a query
#[derive(Debug, Clone)]
pub enum Match<'a, 'input> {
    /// An element or text node
    Node(Node<'a, 'input>),
    /// An attribute
    Attribute(Attribute<'a, 'input>),
}

impl<'a, 'input> Match<'a, 'input> {
    /// The node, if this is a node match
    pub fn as_node(&self) -> Option<Node<'a, 'input>> {
        match self {
            Match::Node(node) => Some(*node),
            Match::Attribute(_) => None,
        }
    }

    /// The attribute, if this is an attribute match
    pub fn as_attribute(&self) -> Option<&Attribute<'a, 'input>> {
        match self {
            Match::Attribute(attr) => Some(attr),
            Match::Node(_) => None,
        }
    }

    /// Local name of the element or attribute (empty for text)
    pub fn local_name(&self) -> &str {
        match self {
            Match::Node(node) => node.tag_name().name(),
            Match::Attribute(attr) => attr.name(),
        }
    }

    /// Attribute value or text content
    pub fn value(&self) -> Option<&str> {
        match self {
            Match::Node(node) => node.text(),
            Match::Attribute(attr) => Some(attr.value()),
        }
    }
}

/// A query bound to a context node
#[derive(Debug, Clone)]
pub struct Selection<'a, 'input> {
    origin: Node<'a, 'input>,
    steps: Vec<ResolvedStep>,
}

impl<'a, 'input> Selection<'a, 'input> {
    /// Start a fresh pass over the matches
    pub fn iter(&self) -> Matches<'_, 'a, 'input> {
        let Some((last, init)) = self.steps.split_last() else {
            return Matches {
                inner: Box::new(std::iter::once(Match::Node(self.origin))),
            };
        };

        let mut nodes: NodeIter<'_, 'a, 'input> = Box::new(std::iter::once(self.origin));
        for step in init {
            nodes = Box::new(nodes.flat_map(move |n| step.nodes(n)));
        }

        let inner: Box<dyn Iterator<Item = Match<'a, 'input>> + '_> =
            if last.kind == PathStepKind::Attribute {
                Box::new(nodes.flat_map(move |n| {
                    n.attributes()
                        .filter(move |a| last.test.matches_attribute(a))
                        .map(Match::Attribute)
                }))
            } else {
                Box::new(nodes.flat_map(move |n| last.nodes(n)).map(Match::Node))
            };

        Matches { inner }
    }

    /// Only the node matches
    pub fn nodes(&self) -> impl Iterator<Item = Node<'a, 'input>> + '_ {
        self.iter().filter_map(|m| m.as_node())
    }

    /// First match, if any
    pub fn first(&self) -> Option<Match<'a, 'input>> {
        self.iter().next()
    }
}

impl<'s, 'a, 'input> IntoIterator for &'s Selection<'a, 'input> {
    type Item = Match<'a, 'input>;
    type IntoIter = Matches<'s, 'a, 'input>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

type NodeIter<'s, 'a, 'input> = Box<dyn Iterator<Item = Node<'a, 'input>> + 's>;

/// Lazy iterator over the matches of a [`Selection`]
pub struct Matches<'s, 'a, 'input> {
    inner: Box<dyn Iterator<Item = Match<'a, 'input>> + 's>,
}

impl<'s, 'a, 'input> Iterator for Matches<'s, 'a, 'input> {
    type Item = Match<'a, 'input>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[derive(Debug, Clone)]
struct ResolvedStep {
    kind: PathStepKind,
    test: ResolvedTest,
}

#[derive(Debug, Clone)]
enum ResolvedTest {
    Any,
    AnyIn(Option<String>),
    Name {
        namespace: Option<String>,
        local: String,
    },
    Text,
    Node,
}

impl ResolvedStep {
    fn resolve(step: &PathStep, bindings: &NamespaceBindings) -> Self {
        let namespace_of = |prefix: &str| bindings.get_namespace(prefix).map(str::to_string);

        let test = match &step.test {
            NodeTest::Any => ResolvedTest::Any,
            NodeTest::AnyIn(prefix) => ResolvedTest::AnyIn(namespace_of(prefix)),
            NodeTest::Name { prefix, local } => ResolvedTest::Name {
                namespace: prefix.as_deref().and_then(namespace_of),
                local: local.clone(),
            },
            NodeTest::Text => ResolvedTest::Text,
            NodeTest::Node => ResolvedTest::Node,
        };

        Self {
            kind: step.kind,
            test,
        }
    }

    fn nodes<'s, 'a: 's, 'input: 'a>(&'s self, node: Node<'a, 'input>) -> NodeIter<'s, 'a, 'input> {
        match self.kind {
            PathStepKind::Child => {
                Box::new(node.children().filter(move |n| self.test.matches_node(n)))
            }
            PathStepKind::DescendantOrSelf => {
                Box::new(node.descendants().filter(move |n| self.test.matches_node(n)))
            }
            PathStepKind::Self_ => {
                Box::new(std::iter::once(node).filter(move |n| self.test.matches_node(n)))
            }
            PathStepKind::Parent => {
                Box::new(node.parent().into_iter().filter(move |n| self.test.matches_node(n)))
            }
            // Rejected by Query::parse unless it is the last step
            PathStepKind::Attribute => Box::new(std::iter::empty()),
        }
    }
}

impl ResolvedTest {
    fn matches_node(&self, node: &Node) -> bool {
        match self {
            ResolvedTest::Node => true,
            ResolvedTest::Text => node.is_text(),
            ResolvedTest::Any => node.is_element(),
            ResolvedTest::AnyIn(ns) => node.is_element() && node.tag_name().namespace() == ns.as_deref(),
            ResolvedTest::Name { namespace, local } => {
                node.is_element()
                    && node.tag_name().name() == local
                    && node.tag_name().namespace() == namespace.as_deref()
            }
        }
    }

    fn matches_attribute(&self, attr: &Attribute) -> bool {
        match self {
            ResolvedTest::Node | ResolvedTest::Any => true,
            ResolvedTest::Text => false,
            ResolvedTest::AnyIn(ns) => attr.namespace() == ns.as_deref(),
            ResolvedTest::Name { namespace, local } => {
                attr.name() == local && attr.namespace() == namespace.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XSD_NAMESPACE;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns:tns="http://example.com/tns" targetNamespace="http://example.com/tns">
    <xs:element name="Foo" type="xs:string"/>
    <!-- comment -->
    <xs:complexType name="Bar">
        <xs:sequence>
            <xs:element ref="tns:Foo"/>
        </xs:sequence>
    </xs:complexType>
    <tns:extra/>
</xs:schema>"#;

    #[test]
    fn test_locate_schema_root() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();
        let deep = doc.descendants().find(|n| n.has_attribute("ref")).unwrap();

        let selection = query(deep, "/xs:schema", &bindings).unwrap();
        let roots: Vec<_> = selection.nodes().collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].tag_name().namespace(), Some(XSD_NAMESPACE));
        assert_eq!(roots[0].tag_name().name(), "schema");
    }

    #[test]
    fn test_child_axis_wildcard_selects_elements_only() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();

        let selection = query(doc.root_element(), "*", &bindings).unwrap();
        let names: Vec<_> = selection.iter().map(|m| m.local_name().to_string()).collect();
        assert_eq!(names, vec!["element", "complexType", "extra"]);
    }

    #[test]
    fn test_prefixed_name_test() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();

        let selection = query(doc.root_element(), "xs:*", &bindings).unwrap();
        assert_eq!(selection.iter().count(), 2);

        let selection = query(doc.root_element(), "xs:complexType/xs:sequence/xs:element", &bindings)
            .unwrap();
        assert_eq!(selection.iter().count(), 1);
    }

    #[test]
    fn test_unbound_prefix_means_no_namespace() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();

        // tns is not bound: the name test looks for <extra> in no namespace
        let selection = query(doc.root_element(), "tns:extra", &NamespaceBindings::new()).unwrap();
        assert_eq!(selection.iter().count(), 0);

        let bindings = NamespaceBindings::with_user_bindings([("tns", "http://example.com/tns")]);
        let selection = query(doc.root_element(), "tns:extra", &bindings).unwrap();
        assert_eq!(selection.iter().count(), 1);
    }

    #[test]
    fn test_attribute_axis() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();
        let element = doc.root_element().first_element_child().unwrap();

        let selection = query(element, "@*", &bindings).unwrap();
        let pairs: Vec<_> = selection
            .iter()
            .map(|m| (m.local_name().to_string(), m.value().unwrap().to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "Foo".to_string()),
                ("type".to_string(), "xs:string".to_string())
            ]
        );

        let selection = query(element, "@type", &bindings).unwrap();
        assert_eq!(selection.first().unwrap().value(), Some("xs:string"));
    }

    #[test]
    fn test_descendant_axis() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();

        let selection = query(doc.root_element(), "//xs:element", &bindings).unwrap();
        assert_eq!(selection.iter().count(), 2);
    }

    #[test]
    fn test_selection_is_restartable() {
        let doc = roxmltree::Document::parse(SCHEMA).unwrap();
        let bindings = NamespaceBindings::new();

        let selection = query(doc.root_element(), "*", &bindings).unwrap();
        let first: Vec<_> = selection.nodes().collect();
        let second: Vec<_> = (&selection).into_iter().filter_map(|m| m.as_node()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_nodes() {
        let doc = roxmltree::Document::parse("<doc>hello<b/>world</doc>").unwrap();
        let selection = query(doc.root_element(), "text()", &NamespaceBindings::new()).unwrap();
        let texts: Vec<_> = selection.iter().filter_map(|m| m.value().map(str::to_string)).collect();
        assert_eq!(texts, vec!["hello", "world"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Query::parse("").is_err());
        assert!(Query::parse("@name/xs:element").is_err());
        assert!("xs:element[1]".parse::<Query>().is_err());
        assert!(Query::parse("/xs:schema").unwrap().is_absolute());
    }
}
