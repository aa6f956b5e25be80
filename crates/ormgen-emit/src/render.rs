//! Render driver: resolves a schema document and assembles both artifacts.

use ormgen_core::{SchemaDocument, resolve_document};

use crate::config::GeneratorConfig;
use crate::errors::Result;
use crate::model::render_table;
use crate::registry::render_registry;
use crate::wire_schema::render_wire_schema;

/// First line of every generated artifact.
pub const GENERATED_MARKER: &str = "@generated by ormgen. Do not edit.";

/// Text of the two generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub model: String,
    pub wire_schema: String,
}

/// Validate, resolve and render the document.
///
/// Nothing is produced unless every table resolves, so callers never see a
/// partially rendered pair.
pub fn render(document: &SchemaDocument, config: &GeneratorConfig) -> Result<RenderedArtifacts> {
    config.validate()?;
    let schema = resolve_document(document)?;

    let mut model = vec![
        format!("// {GENERATED_MARKER}"),
        String::new(),
        "#[allow(unused_imports)]".to_string(),
        "use chrono::{NaiveDate, NaiveDateTime};".to_string(),
        "#[allow(unused_imports)]".to_string(),
        "use rust_decimal::Decimal;".to_string(),
        "#[allow(unused_imports)]".to_string(),
        format!(
            "use {}::{{self as support, Related, TableAccessor}};",
            config.support_module
        ),
        "#[allow(unused_imports)]".to_string(),
        format!("use {}::*;", config.proto_module),
        String::new(),
    ];
    model.extend(render_registry(&schema));
    for table in &schema.tables {
        model.push(String::new());
        model.extend(render_table(table));
    }

    let mut wire_schema = vec![format!("// {GENERATED_MARKER}"), String::new()];
    wire_schema.extend(render_wire_schema(&schema, config));

    tracing::info!(
        tables = schema.tables.len(),
        model_lines = model.len(),
        wire_lines = wire_schema.len(),
        "rendered artifacts"
    );

    Ok(RenderedArtifacts {
        model: join_lines(&model),
        wire_schema: join_lines(&wire_schema),
    })
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
