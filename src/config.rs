//! Generator configuration
//!
//! [`GeneratorConfig`] carries everything a schema run needs: where the
//! schema comes from, extra namespace bindings, transform policies and
//! resource limits. It can be built in code with the `with_*` methods or
//! read from a JSON file:
//!
//! ```json
//! {
//!   "schemaFile": "schemas/order.xsd",
//!   "namespaces": { "tns": "http://example.com/order" },
//!   "duplicateKeys": "last-wins",
//!   "missingIdentifier": "reject",
//!   "allowDtd": false,
//!   "limits": { "maxXmlDepth": 128 }
//! }
//! ```

use crate::documents::ParseOptions;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::SchemaSource;
use crate::names::is_valid_ncname;
use crate::namespaces::NamespaceBindings;
use crate::transform::{DuplicateKeyPolicy, MissingIdentifierPolicy, TransformOptions};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of one schema run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Remote schema location (exclusive with `schema_file`)
    pub schema_url: Option<String>,
    /// Local schema path (exclusive with `schema_url`)
    pub schema_file: Option<PathBuf>,
    /// Extra prefix to URI bindings; `xs` cannot be rebound
    pub namespaces: IndexMap<String, String>,
    /// Duplicate sibling key handling
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Handling of constructs without `name` or `ref`
    pub missing_identifier: MissingIdentifierPolicy,
    /// Allow a DTD in the schema document
    pub allow_dtd: bool,
    /// Resource limits
    pub limits: Limits,
}

impl GeneratorConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::Resource {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the schema URL
    pub fn with_schema_url(mut self, url: impl Into<String>) -> Self {
        self.schema_url = Some(url.into());
        self
    }

    /// Set the schema file
    pub fn with_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_file = Some(path.into());
        self
    }

    /// Add a namespace binding
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Set the duplicate key policy
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }

    /// Set the missing identifier policy
    pub fn with_missing_identifier(mut self, policy: MissingIdentifierPolicy) -> Self {
        self.missing_identifier = policy;
        self
    }

    /// Set whether a DTD is allowed
    pub fn with_allow_dtd(mut self, allow: bool) -> Self {
        self.allow_dtd = allow;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The schema source; exactly one of URL and file must be set
    ///
    /// Performs no I/O.
    pub fn source(&self) -> Result<SchemaSource> {
        match (&self.schema_url, &self.schema_file) {
            (Some(_), Some(_)) => Err(Error::Config(
                "schemaUrl and schemaFile are mutually exclusive".to_string(),
            )),
            (None, None) => Err(Error::Config(
                "one of schemaUrl or schemaFile is required".to_string(),
            )),
            (Some(url), None) => SchemaSource::url(url),
            (None, Some(path)) => Ok(SchemaSource::File(path.clone())),
        }
    }

    /// Namespace bindings: `xs` plus the configured prefixes
    pub fn bindings(&self) -> Result<NamespaceBindings> {
        for prefix in self.namespaces.keys() {
            if !is_valid_ncname(prefix) {
                return Err(Error::Namespace(format!("invalid namespace prefix '{}'", prefix)));
            }
        }
        Ok(NamespaceBindings::with_user_bindings(
            self.namespaces.iter().map(|(p, u)| (p.as_str(), u.as_str())),
        ))
    }

    /// Options for the transformer
    pub fn transform_options(&self) -> Result<TransformOptions> {
        Ok(TransformOptions {
            duplicate_keys: self.duplicate_keys,
            missing_identifier: self.missing_identifier,
            limits: self.limits.clone(),
            namespaces: self.bindings()?,
        })
    }

    /// Options for the XML parser
    pub fn parse_options(&self) -> ParseOptions {
        let options = ParseOptions::new().with_allow_dtd(self.allow_dtd);
        match (&self.schema_file, &self.schema_url) {
            (Some(path), _) => options.with_source_name(path.display().to_string()),
            (None, Some(url)) => options.with_source_name(url.clone()),
            (None, None) => options,
        }
    }
}
