//! Schema source locations
//!
//! Where the schema text comes from: a local file or a URL.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Schema location - a URL or a file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// File system path
    File(PathBuf),
    /// URL (http, https, ftp, etc.)
    Url(Url),
}

impl SchemaSource {
    /// Create a source from a string (auto-detect type)
    ///
    /// Strings that parse as a URL with a scheme other than `file` are URLs;
    /// `file://` URLs become paths; anything else is taken as a path.
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                return url
                    .to_file_path()
                    .map(SchemaSource::File)
                    .map_err(|_| Error::Config(format!("'{}' is not a local file URL", s)));
            }
            // Single letters are Windows drive prefixes, not schemes
            if url.scheme().len() > 1 {
                return Ok(SchemaSource::Url(url));
            }
        }

        Ok(SchemaSource::File(PathBuf::from(s)))
    }

    /// Create a URL source, validating the URL syntax
    pub fn url(s: &str) -> Result<Self> {
        Ok(SchemaSource::Url(Url::parse(s)?))
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, SchemaSource::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, SchemaSource::File(_))
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::File(p) => write!(f, "{}", p.display()),
            SchemaSource::Url(u) => write!(f, "{}", u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_url() {
        let src = SchemaSource::parse("http://example.com/schema.xsd").unwrap();
        assert!(matches!(src, SchemaSource::Url(_)));
        assert!(src.is_remote());
    }

    #[test]
    fn test_source_from_path() {
        let src = SchemaSource::parse("/tmp/schema.xsd").unwrap();
        assert_eq!(src, SchemaSource::File(PathBuf::from("/tmp/schema.xsd")));
        assert!(src.is_file());

        let src = SchemaSource::parse("schemas/order.xsd").unwrap();
        assert!(src.is_file());
    }

    #[test]
    fn test_source_from_file_url() {
        let src = SchemaSource::parse("file:///tmp/schema.xsd").unwrap();
        assert_eq!(src, SchemaSource::File(PathBuf::from("/tmp/schema.xsd")));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(SchemaSource::url("not a url"), Err(Error::Url(_))));
    }

    #[test]
    fn test_display() {
        let src = SchemaSource::File(PathBuf::from("a/b.xsd"));
        assert_eq!(src.to_string(), "a/b.xsd");
    }
}
