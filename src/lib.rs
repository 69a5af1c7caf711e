//! # xsdgen
//!
//! Turns XML Schema (XSD) documents into a nested object model and drives
//! external code generators from it.
//!
//! The core is a recursive transformer that walks the schema DOM and folds it
//! into [`ObjectContext`]s. A [`DispatchTable`] decides, per element kind,
//! whether a construct gets its own nested context (keyed by its `name` or
//! `ref`), which attributes are left out, and what extra scalars are
//! recorded. Unknown kinds such as `sequence` are folded into their parent.
//!
//! ## Features
//!
//! - Recursive transform with an explicit, replaceable dispatch table
//! - Namespace-aware path queries over the schema DOM
//! - Duplicate-key and missing-name detection with opt-in lenient modes
//! - Static catalog of the XSD built-in datatypes
//! - JSON model dump and per-construct emitters
//! - Resource limits on size, depth and attribute count
//!
//! ## Example
//!
//! ```rust,no_run
//! use xsdgen::{process_schema, GeneratorConfig, JsonEmitter};
//!
//! # fn main() -> xsdgen::Result<()> {
//! let config = GeneratorConfig::new().with_schema_file("schemas/order.xsd");
//!
//! // one JSON line per top-level construct
//! let mut emitter = JsonEmitter::new(std::io::stdout());
//! let model = process_schema(&config, &mut emitter)?;
//!
//! println!("{}", model.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod loaders;
pub mod documents;

// Path queries
pub mod query;

// Transform
pub mod context;
pub mod dispatch;
pub mod transform;

// Model and reference data
pub mod builtins;
pub mod model;

// Running a schema
pub mod config;
pub mod emit;
pub mod driver;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use context::{ObjectContext, ScalarInsertion, Value};
pub use dispatch::{Descent, DispatchRule, DispatchTable, Scope, XsdTag};
pub use driver::{load_model, load_model_with, process_schema, transform_document, transform_text};
pub use emit::{CommandEmitter, Emitter, JsonEmitter};
pub use error::{Error, ParseError, Result};
pub use limits::Limits;
pub use locations::SchemaSource;
pub use model::SchemaModel;
pub use namespaces::{NamespaceBindings, QName};
pub use transform::{DuplicateKeyPolicy, MissingIdentifierPolicy, TransformOptions, Transformer};

/// Version of the xsdgen library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace, always bound to the `xs` prefix
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

