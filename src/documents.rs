//! XML document parsing
//!
//! Schema text is parsed into a read-only `roxmltree` DOM. Nodes keep their
//! parent links and source positions, which the transformer relies on for
//! error locations.

use crate::error::{ParseError, Result};
use crate::limits::Limits;
use roxmltree::{Document, ParsingOptions};

/// Options controlling how schema text is parsed
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Allow a Document Type Definition (DTD) to occur
    pub allow_dtd: bool,
    /// Label used in error messages (usually the file name)
    pub source_name: Option<String>,
}

impl ParseOptions {
    /// Create default options (no DTD)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a DTD is allowed
    pub fn with_allow_dtd(mut self, allow: bool) -> Self {
        self.allow_dtd = allow;
        self
    }

    /// Set the label used in error messages
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

/// Parse schema text into a DOM
pub fn parse<'input>(text: &'input str, options: &ParseOptions) -> Result<Document<'input>> {
    let opts = ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..ParsingOptions::default()
    };

    Document::parse_with_options(text, opts).map_err(|e| {
        let mut err = ParseError::from(e);
        if let Some(name) = &options.source_name {
            err = err.with_source(name.clone());
        }
        err.into()
    })
}

/// Check the attribute count of every element in the document
pub fn check_attribute_counts(doc: &Document, limits: &Limits) -> Result<()> {
    for node in doc.descendants().filter(|n| n.is_element()) {
        limits.check_attributes(node.attributes().count())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_simple_xml() {
        let doc = parse("<root><child>text</child></root>", &ParseOptions::new()).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "root");
        assert_eq!(root.first_element_child().unwrap().text(), Some("text"));
    }

    #[test]
    fn test_parse_error_has_source_name() {
        let options = ParseOptions::new().with_source_name("broken.xsd");
        let err = parse("<root><child></root>", &options).unwrap_err();

        match err {
            Error::Parse(parse_err) => {
                assert_eq!(parse_err.source.as_deref(), Some("broken.xsd"));
                assert!(parse_err.location.is_some());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_dtd_rejected_by_default() {
        let xml = r#"<!DOCTYPE root [<!ELEMENT root ANY>]><root/>"#;
        assert!(parse(xml, &ParseOptions::new()).is_err());
        assert!(parse(xml, &ParseOptions::new().with_allow_dtd(true)).is_ok());
    }

    #[test]
    fn test_check_attribute_counts() {
        let doc = parse(r#"<a x="1" y="2"><b z="3"/></a>"#, &ParseOptions::new()).unwrap();
        let limits = Limits {
            max_attributes: 1,
            ..Limits::default()
        };
        assert!(check_attribute_counts(&doc, &limits).is_err());
        assert!(check_attribute_counts(&doc, &Limits::default()).is_ok());
    }
}
