//! Error types for xsdgen
//!
//! This module defines all error types used throughout the library.
//! Every variant is fatal to the `process_schema` call that raised it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using xsdgen Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdgen operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or contradictory configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A schema file could not be read
    #[error("failed to read '{}': {source}", .path.display())]
    Resource {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML in the schema document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The requested schema source kind is not implemented
    #[error("unsupported schema source: {0}")]
    UnsupportedSource(String),

    /// Two siblings resolved to the same key in one context
    #[error("duplicate key '{key}' produced by <{element}> at {location}")]
    DuplicateKey {
        /// The colliding key
        key: String,
        /// Local name of the element that produced the key
        element: String,
        /// `line:column` of that element
        location: String,
    },

    /// A named construct carries neither `name` nor `ref`
    #[error("<{element}> at {location} has neither a 'name' nor a 'ref' attribute")]
    MissingIdentifier {
        /// Local name of the offending element
        element: String,
        /// `line:column` of that element
        location: String,
    },

    /// Malformed path expression
    #[error("query error: {0}")]
    Query(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Code emission failed
    #[error("emit error: {0}")]
    Emit(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Build a [`Error::DuplicateKey`] for `node`
    pub fn duplicate_key(key: impl Into<String>, node: roxmltree::Node) -> Self {
        Error::DuplicateKey {
            key: key.into(),
            element: node.tag_name().name().to_string(),
            location: node_location(node),
        }
    }

    /// Build a [`Error::MissingIdentifier`] for `node`
    pub fn missing_identifier(node: roxmltree::Node) -> Self {
        Error::MissingIdentifier {
            element: node.tag_name().name().to_string(),
            location: node_location(node),
        }
    }
}

/// `line:column` of a node in its source text
pub fn node_location(node: roxmltree::Node) -> String {
    let pos = node.document().text_pos_at(node.range().start);
    format!("{}:{}", pos.row, pos.col)
}

/// XML parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema text
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<roxmltree::Error> for ParseError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        ParseError::new(err.to_string()).with_location(format!("{}:{}", pos.row, pos.col))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource: {}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
