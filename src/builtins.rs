//! XSD built-in types
//!
//! Static reference data for the built-in datatypes of XML Schema 1.0: the
//! base type each one derives from, its white space handling and the
//! constraining facets it admits. Nothing here validates values; the table is
//! used to classify `type`/`base` references found in the model.

use crate::namespaces::NamespaceBindings;
use crate::XSD_NAMESPACE;
use std::fmt;

/// Category of XSD type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    /// Primitive type (derived directly from anySimpleType)
    Primitive,
    /// Derived type (derived from another type)
    Derived,
    /// Special type (anyType, anySimpleType)
    Special,
}

/// White space handling of a datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Keep all white space
    Preserve,
    /// Replace tabs and newlines by spaces
    Replace,
    /// Replace, then collapse runs and trim
    Collapse,
}

impl fmt::Display for WhiteSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhiteSpace::Preserve => write!(f, "preserve"),
            WhiteSpace::Replace => write!(f, "replace"),
            WhiteSpace::Collapse => write!(f, "collapse"),
        }
    }
}

/// Facets admitted for string types
pub const STRING_FACETS: &[&str] = &[
    "length",
    "minLength",
    "maxLength",
    "pattern",
    "enumeration",
    "whiteSpace",
];

/// Facets admitted for boolean
pub const BOOLEAN_FACETS: &[&str] = &["pattern", "whiteSpace"];

/// Facets admitted for float and double
pub const FLOAT_FACETS: &[&str] = &[
    "pattern",
    "enumeration",
    "whiteSpace",
    "maxInclusive",
    "maxExclusive",
    "minInclusive",
    "minExclusive",
];

/// Facets admitted for decimal and its derivations
pub const DECIMAL_FACETS: &[&str] = &[
    "totalDigits",
    "fractionDigits",
    "pattern",
    "enumeration",
    "whiteSpace",
    "maxInclusive",
    "maxExclusive",
    "minInclusive",
    "minExclusive",
];

/// Facets admitted for date/time and duration types
pub const DATETIME_FACETS: &[&str] = FLOAT_FACETS;

/// Facets admitted for list types
pub const LIST_FACETS: &[&str] = &["length", "minLength", "maxLength", "pattern", "enumeration", "whiteSpace"];

/// Definition of a built-in XSD type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinType {
    /// Type name (local name without namespace)
    pub name: &'static str,
    /// Type category
    pub category: TypeCategory,
    /// Base type name
    pub base_type: Option<&'static str>,
    /// White space handling
    pub white_space: WhiteSpace,
    /// Admitted facets for this type
    pub admitted_facets: &'static [&'static str],
}

impl BuiltinType {
    const fn new(
        name: &'static str,
        category: TypeCategory,
        base_type: Option<&'static str>,
        white_space: WhiteSpace,
        admitted_facets: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            category,
            base_type,
            white_space,
            admitted_facets,
        }
    }

    /// True if `facet` may restrict this type
    pub fn admits(&self, facet: &str) -> bool {
        self.admitted_facets.contains(&facet)
    }

    /// Check if this type is a numeric type
    pub fn is_numeric(&self) -> bool {
        self.name == "float" || self.name == "double" || self.derives_from("decimal")
    }

    /// Check if this type is a string type
    pub fn is_string(&self) -> bool {
        self.derives_from("string")
    }

    /// Check if this type is a date/time type
    pub fn is_datetime(&self) -> bool {
        matches!(
            self.name,
            "duration"
                | "dateTime"
                | "time"
                | "date"
                | "gYearMonth"
                | "gYear"
                | "gMonthDay"
                | "gDay"
                | "gMonth"
        )
    }

    /// True if `ancestor` is this type or one of its bases
    pub fn derives_from(&self, ancestor: &str) -> bool {
        let mut current = Some(*self);
        while let Some(ty) = current {
            if ty.name == ancestor {
                return true;
            }
            current = ty.base_type.and_then(lookup);
        }
        false
    }
}

use TypeCategory::{Derived, Primitive, Special};
use WhiteSpace::{Collapse, Preserve, Replace};

static BUILTINS: &[BuiltinType] = &[
    BuiltinType::new("anyType", Special, None, Preserve, &[]),
    BuiltinType::new("anySimpleType", Special, Some("anyType"), Preserve, &[]),
    // primitives
    BuiltinType::new("string", Primitive, Some("anySimpleType"), Preserve, STRING_FACETS),
    BuiltinType::new("boolean", Primitive, Some("anySimpleType"), Collapse, BOOLEAN_FACETS),
    BuiltinType::new("decimal", Primitive, Some("anySimpleType"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("float", Primitive, Some("anySimpleType"), Collapse, FLOAT_FACETS),
    BuiltinType::new("double", Primitive, Some("anySimpleType"), Collapse, FLOAT_FACETS),
    BuiltinType::new("duration", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("dateTime", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("time", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("date", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("gYearMonth", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("gYear", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("gMonthDay", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("gDay", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("gMonth", Primitive, Some("anySimpleType"), Collapse, DATETIME_FACETS),
    BuiltinType::new("hexBinary", Primitive, Some("anySimpleType"), Collapse, STRING_FACETS),
    BuiltinType::new("base64Binary", Primitive, Some("anySimpleType"), Collapse, STRING_FACETS),
    BuiltinType::new("anyURI", Primitive, Some("anySimpleType"), Collapse, STRING_FACETS),
    BuiltinType::new("QName", Primitive, Some("anySimpleType"), Collapse, STRING_FACETS),
    BuiltinType::new("NOTATION", Primitive, Some("anySimpleType"), Collapse, STRING_FACETS),
    // string derivations
    BuiltinType::new("normalizedString", Derived, Some("string"), Replace, STRING_FACETS),
    BuiltinType::new("token", Derived, Some("normalizedString"), Collapse, STRING_FACETS),
    BuiltinType::new("language", Derived, Some("token"), Collapse, STRING_FACETS),
    BuiltinType::new("NMTOKEN", Derived, Some("token"), Collapse, STRING_FACETS),
    BuiltinType::new("NMTOKENS", Derived, Some("NMTOKEN"), Collapse, LIST_FACETS),
    BuiltinType::new("Name", Derived, Some("token"), Collapse, STRING_FACETS),
    BuiltinType::new("NCName", Derived, Some("Name"), Collapse, STRING_FACETS),
    BuiltinType::new("ID", Derived, Some("NCName"), Collapse, STRING_FACETS),
    BuiltinType::new("IDREF", Derived, Some("NCName"), Collapse, STRING_FACETS),
    BuiltinType::new("IDREFS", Derived, Some("IDREF"), Collapse, LIST_FACETS),
    BuiltinType::new("ENTITY", Derived, Some("NCName"), Collapse, STRING_FACETS),
    BuiltinType::new("ENTITIES", Derived, Some("ENTITY"), Collapse, LIST_FACETS),
    // numeric derivations
    BuiltinType::new("integer", Derived, Some("decimal"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("nonPositiveInteger", Derived, Some("integer"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("negativeInteger", Derived, Some("nonPositiveInteger"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("long", Derived, Some("integer"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("int", Derived, Some("long"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("short", Derived, Some("int"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("byte", Derived, Some("short"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("nonNegativeInteger", Derived, Some("integer"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("unsignedLong", Derived, Some("nonNegativeInteger"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("unsignedInt", Derived, Some("unsignedLong"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("unsignedShort", Derived, Some("unsignedInt"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("unsignedByte", Derived, Some("unsignedShort"), Collapse, DECIMAL_FACETS),
    BuiltinType::new("positiveInteger", Derived, Some("nonNegativeInteger"), Collapse, DECIMAL_FACETS),
];

/// All built-in types, `anyType` first
pub fn all() -> &'static [BuiltinType] {
    BUILTINS
}

/// Look a built-in type up by local name
pub fn lookup(local_name: &str) -> Option<BuiltinType> {
    BUILTINS.iter().find(|ty| ty.name == local_name).copied()
}

/// Resolve a prefixed type reference such as `xs:string`
///
/// The prefix is resolved through `bindings`; only names in the XML Schema
/// namespace are built-ins.
pub fn resolve_type(type_ref: &str, bindings: &NamespaceBindings) -> Option<BuiltinType> {
    let qname = bindings.resolve(type_ref.trim());
    if qname.namespace.as_deref() == Some(XSD_NAMESPACE) {
        lookup(&qname.local_name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let int = lookup("int").unwrap();
        assert_eq!(int.category, TypeCategory::Derived);
        assert_eq!(int.base_type, Some("long"));
        assert!(int.admits("totalDigits"));
        assert!(!int.admits("length"));
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn test_every_base_exists() {
        for ty in all() {
            if let Some(base) = ty.base_type {
                assert!(lookup(base).is_some(), "{} has unknown base {}", ty.name, base);
            }
        }
        assert_eq!(all().len(), 46);
    }

    #[test]
    fn test_classification() {
        assert!(lookup("unsignedByte").unwrap().is_numeric());
        assert!(lookup("double").unwrap().is_numeric());
        assert!(lookup("ID").unwrap().is_string());
        assert!(lookup("gYear").unwrap().is_datetime());
        assert!(!lookup("float").unwrap().is_datetime());
        assert!(!lookup("boolean").unwrap().is_string());
        assert!(lookup("byte").unwrap().derives_from("decimal"));
    }

    #[test]
    fn test_resolve_type() {
        let mut bindings = NamespaceBindings::new();
        bindings.bind("xsd", XSD_NAMESPACE);
        bindings.bind("tns", "http://example.com");

        assert_eq!(resolve_type("xs:string", &bindings).unwrap().name, "string");
        assert_eq!(resolve_type("xsd:date", &bindings).unwrap().name, "date");
        assert!(resolve_type("tns:string", &bindings).is_none());
        assert!(resolve_type("string", &bindings).is_none());
        assert!(resolve_type("undeclared:string", &bindings).is_none());
    }

    #[test]
    fn test_white_space_display() {
        assert_eq!(lookup("normalizedString").unwrap().white_space.to_string(), "replace");
        assert_eq!(lookup("string").unwrap().white_space, WhiteSpace::Preserve);
    }
}
