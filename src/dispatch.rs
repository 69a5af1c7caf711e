//! Type-dispatch table
//!
//! Maps schema element kinds to the rules the transformer applies when it
//! meets one: an optional pre hook run before descending into the element,
//! an optional post hook run afterwards, and the attribute names that are
//! not copied into the element's context.
//!
//! Hooks never touch the context they are shown. A pre hook returns a
//! [`Descent`] describing scalars to set and where the children go; a post
//! hook returns scalars to set on the enclosing context. The transformer
//! performs every insertion itself.
//!
//! The table is a plain value. [`DispatchTable::standard`] builds the
//! built-in rules; callers may start from it, replace rules or build their
//! own table from scratch.

use crate::context::ObjectContext;
use crate::error::{Error, Result};
use crate::names::non_blank;
use crate::query::Query;
use crate::transform::{MissingIdentifierPolicy, TransformOptions};
use once_cell::sync::Lazy;
use roxmltree::Node;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

macro_rules! xsd_tags {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Element kinds of the XML Schema vocabulary
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum XsdTag {
            $(
                #[doc = concat!("`xs:", $name, "`")]
                $variant,
            )*
        }

        impl XsdTag {
            /// Every known tag
            pub const ALL: &'static [XsdTag] = &[$(XsdTag::$variant),*];

            /// Look a tag up by element local name
            pub fn from_local_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(XsdTag::$variant),)*
                    _ => None,
                }
            }

            /// The element local name of this tag
            pub fn local_name(self) -> &'static str {
                match self {
                    $(XsdTag::$variant => $name,)*
                }
            }
        }
    };
}

xsd_tags! {
    Schema => "schema",
    Element => "element",
    Attribute => "attribute",
    AttributeGroup => "attributeGroup",
    Group => "group",
    ComplexType => "complexType",
    SimpleType => "simpleType",
    SimpleContent => "simpleContent",
    ComplexContent => "complexContent",
    Extension => "extension",
    Restriction => "restriction",
    List => "list",
    Union => "union",
    Sequence => "sequence",
    Choice => "choice",
    All => "all",
    Any => "any",
    AnyAttribute => "anyAttribute",
    Annotation => "annotation",
    Documentation => "documentation",
    AppInfo => "appinfo",
    Import => "import",
    Include => "include",
    Redefine => "redefine",
    Notation => "notation",
    Unique => "unique",
    Key => "key",
    KeyRef => "keyref",
    Selector => "selector",
    Field => "field",
    Enumeration => "enumeration",
    Length => "length",
    MinLength => "minLength",
    MaxLength => "maxLength",
    Pattern => "pattern",
    WhiteSpace => "whiteSpace",
    MinInclusive => "minInclusive",
    MaxInclusive => "maxInclusive",
    MinExclusive => "minExclusive",
    MaxExclusive => "maxExclusive",
    TotalDigits => "totalDigits",
    FractionDigits => "fractionDigits",
}

/// Key under which an extension's content is nested
pub const PROPERTIES_KEY: &str = "properties";
/// Key under which a restriction's facets are nested
pub const FACETS_KEY: &str = "facets";
/// Key holding documentation text
pub const COMMENT_KEY: &str = "comment";
/// Key holding the base type of a derivation
pub const BASE_KEY: &str = "base";
/// Key recording simple or complex content on a type
pub const CONTENT_MODEL_KEY: &str = "contentModel";

static TEXT_NODES: Lazy<Query> =
    Lazy::new(|| Query::parse("text()").expect("text() is a valid query"));

/// Where the children of an element are folded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Into the current context
    Current,
    /// Into a fresh context inserted under this key
    Nested(String),
    /// Nowhere; the element is dropped
    Skip,
}

/// What a pre hook asks the transformer to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    /// Scalars to set on the current context before descending
    pub scalars: Vec<(String, String)>,
    /// Where the element's attributes and children go
    pub scope: Scope,
}

impl Descent {
    /// Descend into the current context
    pub fn current() -> Self {
        Self {
            scalars: Vec::new(),
            scope: Scope::Current,
        }
    }

    /// Descend into a new context under `key`
    pub fn nested(key: impl Into<String>) -> Self {
        Self {
            scalars: Vec::new(),
            scope: Scope::Nested(key.into()),
        }
    }

    /// Drop the element
    pub fn skip() -> Self {
        Self {
            scalars: Vec::new(),
            scope: Scope::Skip,
        }
    }

    /// Also set `key = value` on the current context
    pub fn with_scalar(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.scalars.push((key.into(), value.into()));
        self
    }
}

/// Hook run before descending into an element
pub type PreHook = fn(&TransformOptions, &ObjectContext, Node<'_, '_>) -> Result<Descent>;

/// Hook run after an element's subtree is done; returns scalars for the outer context
pub type PostHook =
    fn(&TransformOptions, &ObjectContext, Node<'_, '_>) -> Result<Vec<(String, String)>>;

/// Rule applied to one element kind
#[derive(Clone, Copy, Default)]
pub struct DispatchRule {
    /// Runs before descending
    pub pre: Option<PreHook>,
    /// Runs after descending, with the outer context
    pub post: Option<PostHook>,
    /// Attributes not copied into the element's context
    pub ignored: &'static [&'static str],
}

impl DispatchRule {
    /// A rule with only a pre hook
    pub const fn pre(hook: PreHook, ignored: &'static [&'static str]) -> Self {
        Self {
            pre: Some(hook),
            post: None,
            ignored,
        }
    }

    /// A rule with only a post hook
    pub const fn post(hook: PostHook) -> Self {
        Self {
            pre: None,
            post: Some(hook),
            ignored: &[],
        }
    }
}

impl fmt::Debug for DispatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRule")
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .field("ignored", &self.ignored)
            .finish()
    }
}

/// Mapping from element kind to rule
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    rules: HashMap<XsdTag, DispatchRule>,
}

const NAME_AND_REF: &[&str] = &["name", "ref"];
const BASE: &[&str] = &["base"];
const VALUE: &[&str] = &["value"];

const FACET_TAGS: &[XsdTag] = &[
    XsdTag::Length,
    XsdTag::MinLength,
    XsdTag::MaxLength,
    XsdTag::Pattern,
    XsdTag::WhiteSpace,
    XsdTag::MinInclusive,
    XsdTag::MaxInclusive,
    XsdTag::MinExclusive,
    XsdTag::MaxExclusive,
    XsdTag::TotalDigits,
    XsdTag::FractionDigits,
];

impl DispatchTable {
    /// A table with no rules; every element is folded into its parent
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules
    pub fn standard() -> Self {
        let mut table = Self::new()
            .with_rule(XsdTag::Element, DispatchRule::pre(name_then_ref, NAME_AND_REF))
            .with_rule(XsdTag::ComplexType, DispatchRule::pre(type_definition, NAME_AND_REF))
            .with_rule(XsdTag::SimpleType, DispatchRule::pre(type_definition, NAME_AND_REF))
            .with_rule(XsdTag::Group, DispatchRule::pre(name_then_ref, NAME_AND_REF))
            .with_rule(XsdTag::AttributeGroup, DispatchRule::pre(name_then_ref, NAME_AND_REF))
            .with_rule(XsdTag::Attribute, DispatchRule::pre(ref_then_name, NAME_AND_REF))
            .with_rule(XsdTag::Extension, DispatchRule::pre(extension, BASE))
            .with_rule(XsdTag::Restriction, DispatchRule::pre(restriction, BASE))
            .with_rule(XsdTag::Documentation, DispatchRule::pre(documentation, &[]))
            .with_rule(XsdTag::Enumeration, DispatchRule::pre(enumeration, VALUE))
            .with_rule(XsdTag::SimpleContent, DispatchRule::post(simple_content))
            .with_rule(XsdTag::ComplexContent, DispatchRule::post(complex_content));

        for tag in FACET_TAGS {
            table.insert(*tag, DispatchRule::pre(facet, VALUE));
        }

        table
    }

    /// Add or replace a rule (builder style)
    pub fn with_rule(mut self, tag: XsdTag, rule: DispatchRule) -> Self {
        self.insert(tag, rule);
        self
    }

    /// Add or replace a rule, returning the previous one
    pub fn insert(&mut self, tag: XsdTag, rule: DispatchRule) -> Option<DispatchRule> {
        self.rules.insert(tag, rule)
    }

    /// Remove a rule so that the kind is folded into its parent
    pub fn remove(&mut self, tag: XsdTag) -> Option<DispatchRule> {
        self.rules.remove(&tag)
    }

    /// Rule for a tag
    pub fn get(&self, tag: XsdTag) -> Option<&DispatchRule> {
        self.rules.get(&tag)
    }

    /// Rule for an element local name
    pub fn rule_for(&self, local_name: &str) -> Option<&DispatchRule> {
        XsdTag::from_local_name(local_name).and_then(|tag| self.get(tag))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Key a construct by the first non-blank attribute of `order`
pub fn identifier(
    options: &TransformOptions,
    node: Node<'_, '_>,
    order: [&str; 2],
) -> Result<Descent> {
    if let Some(key) = order.iter().find_map(|attr| non_blank(node.attribute(*attr))) {
        return Ok(Descent::nested(key));
    }

    match options.missing_identifier {
        MissingIdentifierPolicy::Reject => Err(Error::missing_identifier(node)),
        MissingIdentifierPolicy::Skip => {
            warn!(
                element = node.tag_name().name(),
                location = %crate::error::node_location(node),
                "skipping construct without 'name' or 'ref'"
            );
            Ok(Descent::skip())
        }
    }
}

/// `name`, falling back to `ref`
pub fn name_then_ref(
    options: &TransformOptions,
    _context: &ObjectContext,
    node: Node<'_, '_>,
) -> Result<Descent> {
    identifier(options, node, ["name", "ref"])
}

/// `ref`, falling back to `name`
pub fn ref_then_name(
    options: &TransformOptions,
    _context: &ObjectContext,
    node: Node<'_, '_>,
) -> Result<Descent> {
    identifier(options, node, ["ref", "name"])
}

/// `name`, falling back to `ref`, for `complexType` and `simpleType`
///
/// An anonymous type declared inline by an `element` or `attribute` has
/// neither; its content is folded into the declaration's context.
pub fn type_definition(
    options: &TransformOptions,
    _context: &ObjectContext,
    node: Node<'_, '_>,
) -> Result<Descent> {
    let anonymous = NAME_AND_REF
        .iter()
        .all(|attr| non_blank(node.attribute(*attr)).is_none());

    if anonymous && node.parent_element().is_some_and(|parent| is_declaration(parent, node)) {
        return Ok(Descent::current());
    }

    identifier(options, node, ["name", "ref"])
}

fn is_declaration(parent: Node<'_, '_>, node: Node<'_, '_>) -> bool {
    matches!(parent.tag_name().name(), "element" | "attribute")
        && parent.tag_name().namespace() == node.tag_name().namespace()
}

fn derivation(node: Node<'_, '_>, into: &str) -> Descent {
    let descent = Descent::nested(into);
    match node.attribute(BASE_KEY) {
        Some(base) => descent.with_scalar(BASE_KEY, base),
        None => descent,
    }
}

fn extension(_: &TransformOptions, _: &ObjectContext, node: Node<'_, '_>) -> Result<Descent> {
    Ok(derivation(node, PROPERTIES_KEY))
}

fn restriction(_: &TransformOptions, _: &ObjectContext, node: Node<'_, '_>) -> Result<Descent> {
    Ok(derivation(node, FACETS_KEY))
}

fn documentation(
    options: &TransformOptions,
    _: &ObjectContext,
    node: Node<'_, '_>,
) -> Result<Descent> {
    let text = TEXT_NODES
        .select(node, &options.namespaces)
        .first()
        .and_then(|m| m.value().map(|t| t.trim().to_string()));

    Ok(match text {
        Some(text) => Descent::current().with_scalar(COMMENT_KEY, text),
        None => Descent::current(),
    })
}

fn enumeration(_: &TransformOptions, _: &ObjectContext, node: Node<'_, '_>) -> Result<Descent> {
    Ok(match node.attribute("value") {
        Some(value) => Descent::nested(value),
        None => Descent::current(),
    })
}

fn facet(_: &TransformOptions, _: &ObjectContext, node: Node<'_, '_>) -> Result<Descent> {
    let descent = Descent::current();
    Ok(match node.attribute("value") {
        Some(value) => descent.with_scalar(node.tag_name().name(), value),
        None => descent,
    })
}

fn simple_content(
    _: &TransformOptions,
    _: &ObjectContext,
    _: Node<'_, '_>,
) -> Result<Vec<(String, String)>> {
    Ok(vec![(CONTENT_MODEL_KEY.to_string(), "simple".to_string())])
}

fn complex_content(
    _: &TransformOptions,
    _: &ObjectContext,
    _: Node<'_, '_>,
) -> Result<Vec<(String, String)>> {
    Ok(vec![(CONTENT_MODEL_KEY.to_string(), "complex".to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_child<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> Node<'a, 'input> {
        doc.root_element().first_element_child().unwrap()
    }

    #[test]
    fn test_tag_lookup() {
        assert_eq!(XsdTag::from_local_name("complexType"), Some(XsdTag::ComplexType));
        assert_eq!(XsdTag::from_local_name("p"), None);
        for tag in XsdTag::ALL {
            assert_eq!(XsdTag::from_local_name(tag.local_name()), Some(*tag));
        }
    }

    #[test]
    fn test_standard_table() {
        let table = DispatchTable::standard();
        assert!(table.rule_for("element").unwrap().pre.is_some());
        assert_eq!(table.rule_for("element").unwrap().ignored, &["name", "ref"]);
        assert_eq!(table.rule_for("extension").unwrap().ignored, &["base"]);
        assert!(table.rule_for("documentation").unwrap().ignored.is_empty());
        assert!(table.rule_for("complexContent").unwrap().post.is_some());
        assert!(table.rule_for("sequence").is_none());
        assert!(table.rule_for("unknown").is_none());
    }

    #[test]
    fn test_table_is_editable() {
        let mut table = DispatchTable::standard();
        let before = table.len();
        assert!(table.remove(XsdTag::Documentation).is_some());
        assert_eq!(table.len(), before - 1);
        assert!(table.rule_for("documentation").is_none());
        assert!(DispatchTable::new().is_empty());
    }

    #[test]
    fn test_name_takes_precedence_over_ref() {
        let doc = roxmltree::Document::parse(r#"<s><element name="A" ref="B"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let descent = name_then_ref(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::nested("A"));
    }

    #[test]
    fn test_ref_takes_precedence_for_attributes() {
        let doc = roxmltree::Document::parse(r#"<s><attribute name="A" ref="B"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let descent = ref_then_name(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::nested("B"));
    }

    #[test]
    fn test_missing_identifier() {
        let doc = roxmltree::Document::parse(r#"<s><element type="x"/></s>"#).unwrap();
        let node = first_child(&doc);

        let options = TransformOptions::default();
        let err = name_then_ref(&options, &ObjectContext::new(), node).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { .. }));

        let options = TransformOptions {
            missing_identifier: MissingIdentifierPolicy::Skip,
            ..TransformOptions::default()
        };
        let descent = name_then_ref(&options, &ObjectContext::new(), node).unwrap();
        assert_eq!(descent.scope, Scope::Skip);
    }

    #[test]
    fn test_anonymous_type_in_declaration() {
        let doc = roxmltree::Document::parse(
            r#"<s><element name="order"><complexType/></element><attribute name="a"><simpleType/></attribute></s>"#,
        )
        .unwrap();
        let options = TransformOptions::default();
        for decl in doc.root_element().children().filter(|n| n.is_element()) {
            let anonymous = decl.first_element_child().unwrap();
            let descent = type_definition(&options, &ObjectContext::new(), anonymous).unwrap();
            assert_eq!(descent, Descent::current());
        }
    }

    #[test]
    fn test_unnamed_top_level_type_is_missing_identifier() {
        let doc = roxmltree::Document::parse(r#"<s><complexType mixed="true"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let err = type_definition(&options, &ObjectContext::new(), first_child(&doc)).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { .. }));

        let doc = roxmltree::Document::parse(r#"<s><element><complexType name="T"/></element></s>"#)
            .unwrap();
        let named = first_child(&doc).first_element_child().unwrap();
        let descent = type_definition(&options, &ObjectContext::new(), named).unwrap();
        assert_eq!(descent, Descent::nested("T"));
    }

    #[test]
    fn test_blank_name_falls_back_to_ref() {
        let doc = roxmltree::Document::parse(r#"<s><element name=" " ref="B"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let descent = name_then_ref(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::nested("B"));
    }

    #[test]
    fn test_extension_records_base() {
        let doc = roxmltree::Document::parse(r#"<s><extension base="Person"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let descent = extension(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::nested("properties").with_scalar("base", "Person"));
    }

    #[test]
    fn test_documentation_copies_first_text() {
        let doc = roxmltree::Document::parse(
            r#"<s><documentation>  A person.  <b>bold</b> tail</documentation></s>"#,
        )
        .unwrap();
        let options = TransformOptions::default();
        let descent = documentation(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::current().with_scalar("comment", "A person."));

        let doc = roxmltree::Document::parse(r#"<s><documentation/></s>"#).unwrap();
        let descent = documentation(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::current());
    }

    #[test]
    fn test_facet_records_value() {
        let doc = roxmltree::Document::parse(r#"<s><maxLength value="10"/></s>"#).unwrap();
        let options = TransformOptions::default();
        let descent = facet(&options, &ObjectContext::new(), first_child(&doc)).unwrap();
        assert_eq!(descent, Descent::current().with_scalar("maxLength", "10"));
    }
}
