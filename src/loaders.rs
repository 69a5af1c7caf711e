//! Schema text loading
//!
//! This module reads the raw schema text from a [`SchemaSource`]. Only local
//! files are supported; URL sources fail with
//! [`Error::UnsupportedSource`].

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::SchemaSource;
use std::fs;
use tracing::debug;

/// Resource loader for schema documents
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a schema as a string
    pub fn load(&self, source: &SchemaSource) -> Result<String> {
        match source {
            SchemaSource::File(path) => {
                debug!(path = %path.display(), "reading schema file");
                let content = fs::read_to_string(path).map_err(|e| Error::Resource {
                    path: path.clone(),
                    source: e,
                })?;

                self.limits.check_xml_size(content.len())?;

                Ok(content)
            }
            SchemaSource::Url(url) => Err(Error::UnsupportedSource(format!(
                "loading schemas from URLs is not supported: {}",
                url
            ))),
        }
    }
}
