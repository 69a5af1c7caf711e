//! Schema driver
//!
//! One run: validate the configuration, load the schema text, parse it,
//! locate the `xs:schema` root, fold it into a [`SchemaModel`] and hand each
//! top-level construct to an [`Emitter`].

use crate::config::GeneratorConfig;
use crate::context::ObjectContext;
use crate::dispatch::DispatchTable;
use crate::documents::{self, ParseOptions};
use crate::emit::Emitter;
use crate::error::{ParseError, Result};
use crate::loaders::Loader;
use crate::model::SchemaModel;
use crate::query::Query;
use crate::transform::{TransformOptions, Transformer};
use once_cell::sync::Lazy;
use roxmltree::Document;
use tracing::{debug, info};

static SCHEMA_ROOT: Lazy<Query> =
    Lazy::new(|| Query::parse("/xs:schema").expect("/xs:schema is a valid query"));

/// Fold every `xs:schema` root of `doc` into one model
///
/// A document without an `xs:schema` root element is rejected.
pub fn transform_document(
    doc: &Document<'_>,
    options: &TransformOptions,
    table: &DispatchTable,
) -> Result<SchemaModel> {
    documents::check_attribute_counts(doc, &options.limits)?;

    let transformer = Transformer::new(table, options);
    let mut root = ObjectContext::new();
    let mut roots = 0;

    for schema in SCHEMA_ROOT.select(doc.root(), &options.namespaces).nodes() {
        roots += 1;
        transformer.transform(&mut root, schema, &[])?;
    }

    if roots == 0 {
        let found = doc.root_element().tag_name();
        return Err(ParseError::new(format!(
            "expected an xs:schema root element, found '{}'",
            found.name()
        ))
        .with_location(crate::error::node_location(doc.root_element()))
        .into());
    }

    Ok(SchemaModel::new(root))
}

/// Parse schema text and fold it into a model
pub fn transform_text(
    text: &str,
    parse_options: &ParseOptions,
    options: &TransformOptions,
    table: &DispatchTable,
) -> Result<SchemaModel> {
    let doc = documents::parse(text, parse_options)?;
    transform_document(&doc, options, table)
}

/// Load and transform the configured schema with the built-in rules
pub fn load_model(config: &GeneratorConfig) -> Result<SchemaModel> {
    load_model_with(config, &DispatchTable::standard())
}

/// Load and transform the configured schema with a custom dispatch table
pub fn load_model_with(config: &GeneratorConfig, table: &DispatchTable) -> Result<SchemaModel> {
    // all configuration checks happen before any I/O
    let source = config.source()?;
    let options = config.transform_options()?;

    info!(source = %source, "loading schema");
    let text = Loader::new()
        .with_limits(config.limits.clone())
        .load(&source)?;

    let model = transform_text(&text, &config.parse_options(), &options, table)?;
    info!(constructs = model.len(), "schema transformed");
    Ok(model)
}

/// Run the configured schema through `emitter`, once per top-level construct
pub fn process_schema<E>(config: &GeneratorConfig, emitter: &mut E) -> Result<SchemaModel>
where
    E: Emitter + ?Sized,
{
    let model = load_model(config)?;

    for (name, construct) in model.elements.contexts() {
        debug!(name, "emitting construct");
        emitter.emit(name, construct)?;
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transform::DuplicateKeyPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn standard(text: &str) -> Result<SchemaModel> {
        transform_text(
            text,
            &ParseOptions::new(),
            &TransformOptions::default(),
            &DispatchTable::standard(),
        )
    }

    #[test]
    fn test_single_element() {
        let model = standard(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Foo" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&model).unwrap(),
            json!({ "elements": { "Foo": { "type": "xs:string" } } })
        );
    }

    #[test]
    fn test_schema_attributes_land_on_root() {
        let model = standard(
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                           targetNamespace="urn:t" elementFormDefault="qualified">
                 <xsd:element name="Foo"/>
               </xsd:schema>"#,
        )
        .unwrap();

        assert_eq!(model.elements.scalar("targetNamespace"), Some("urn:t"));
        assert_eq!(model.top_level_names().collect::<Vec<_>>(), vec!["Foo"]);
    }

    #[test]
    fn test_not_a_schema() {
        let err = standard("<html/>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        // right local name, wrong namespace
        let err = standard(r#"<schema xmlns="urn:other"/>"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_malformed_xml() {
        let err = standard("<xs:schema").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_config_checked_before_io() {
        let config = GeneratorConfig::new()
            .with_schema_url("https://example.com/s.xsd")
            .with_schema_file("/definitely/not/here.xsd");
        assert!(matches!(load_model(&config), Err(Error::Config(_))));

        assert!(matches!(load_model(&GeneratorConfig::new()), Err(Error::Config(_))));
    }

    #[test]
    fn test_url_source_unsupported() {
        let config = GeneratorConfig::new().with_schema_url("https://example.com/s.xsd");
        assert!(matches!(load_model(&config), Err(Error::UnsupportedSource(_))));
    }

    #[test]
    fn test_process_schema_emits_each_construct() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="A"/>
                 <xs:complexType name="B"/>
                 <xs:element name="A" type="xs:int"/>
               </xs:schema>"#
        )
        .unwrap();

        let config = GeneratorConfig::new().with_schema_file(file.path());
        let mut names = Vec::new();
        let mut record = |name: &str, _: &ObjectContext| -> Result<()> {
            names.push(name.to_string());
            Ok(())
        };
        let err = process_schema(&config, &mut record).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));

        let config = config.with_duplicate_keys(DuplicateKeyPolicy::LastWins);
        let model = process_schema(&config, &mut record).unwrap();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(model.get("A").unwrap().scalar("type"), Some("xs:int"));
    }
}
