//! Registry emitter: one handle constant per table plus a lookup table.

use ormgen_core::ResolvedSchema;

use crate::model::accessor_name;
use crate::naming::{REGISTRY_STATIC, comment_lines, handle_const_ident};

pub fn render_registry(schema: &ResolvedSchema) -> Vec<String> {
    let mut lines = Vec::new();

    for table in &schema.tables {
        let accessor = accessor_name(table);
        lines.extend(comment_lines(table.comment.as_deref(), "///"));
        lines.push(format!(
            "/// Handle for `{}.{}` in database `{}`.",
            table.schema_name, table.storage_name, table.database_name
        ));
        lines.push(format!(
            "pub const {}: {accessor} = {accessor};",
            handle_const_ident(&table.handle_name)
        ));
    }

    lines.push(String::new());
    lines.push("/// Every table handle, keyed by handle name.".to_string());
    lines.push(format!(
        "pub static {REGISTRY_STATIC}: &[(&str, &(dyn TableAccessor + Sync))] = &["
    ));
    for table in &schema.tables {
        lines.push(format!(
            "    ({:?}, &{}),",
            table.handle_name,
            handle_const_ident(&table.handle_name)
        ));
    }
    lines.push("];".to_string());

    tracing::debug!(handles = schema.tables.len(), "rendered registry");
    lines
}
