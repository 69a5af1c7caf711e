//! XML namespace handling
//!
//! Prefix bindings used when evaluating path queries against a schema
//! document. The `xs` prefix is always bound to the XML Schema namespace;
//! user bindings are merged on top but can never rebind it.

use crate::names::split_qname;
use crate::XSD_NAMESPACE;
use indexmap::IndexMap;
use tracing::warn;

/// The prefix reserved for the XML Schema namespace
pub const XS_PREFIX: &str = "xs";

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// True if this names `local_name` in the XML Schema namespace
    pub fn is_xsd(&self, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(XSD_NAMESPACE) && self.local_name == local_name
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Prefix-to-URI bindings for path queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBindings {
    prefixes: IndexMap<Prefix, NamespaceUri>,
}

impl NamespaceBindings {
    /// Bindings containing only `xs`
    pub fn new() -> Self {
        let mut prefixes = IndexMap::new();
        prefixes.insert(XS_PREFIX.to_string(), XSD_NAMESPACE.to_string());
        Self { prefixes }
    }

    /// The `xs` binding merged with user-supplied bindings
    pub fn with_user_bindings<I, P, U>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut ctx = Self::new();
        for (prefix, uri) in bindings {
            ctx.bind(prefix, uri);
        }
        ctx
    }

    /// Add a prefix binding; returns false if the prefix is `xs`
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> bool {
        let prefix = prefix.into();
        if prefix == XS_PREFIX {
            warn!("ignoring user binding for the reserved '{}' prefix", XS_PREFIX);
            return false;
        }
        self.prefixes.insert(prefix, namespace.into());
        true
    }

    /// Get the namespace for a prefix; `None` means no namespace
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Iterate over all bindings, `xs` first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Resolve a prefixed name; unbound prefixes and bare names get no namespace
    pub fn resolve(&self, prefixed_name: &str) -> QName {
        match split_qname(prefixed_name) {
            (Some(prefix), local) => match self.get_namespace(prefix) {
                Some(ns) => QName::namespaced(ns, local),
                None => QName::local(local),
            },
            (None, local) => QName::local(local),
        }
    }
}

impl Default for NamespaceBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_xs_always_bound() {
        let ctx = NamespaceBindings::new();
        assert_eq!(ctx.get_namespace("xs"), Some(XSD_NAMESPACE));
    }

    #[test]
    fn test_user_bindings_cannot_override_xs() {
        let ctx = NamespaceBindings::with_user_bindings([
            ("xs", "http://example.com/not-xsd"),
            ("tns", "http://example.com/tns"),
        ]);
        assert_eq!(ctx.get_namespace("xs"), Some(XSD_NAMESPACE));
        assert_eq!(ctx.get_namespace("tns"), Some("http://example.com/tns"));
        assert_eq!(ctx.iter().count(), 2);
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let ctx = NamespaceBindings::new();
        let qname = ctx.resolve("xs:element");
        assert!(qname.is_xsd("element"));
    }

    #[test]
    fn test_unbound_prefix_resolves_to_no_namespace() {
        let ctx = NamespaceBindings::new();
        let qname = ctx.resolve("foo:bar");
        assert_eq!(qname, QName::local("bar"));
    }
}
