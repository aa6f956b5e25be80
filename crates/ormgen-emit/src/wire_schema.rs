//! Wire schema emitter: proto3 messages and the RPC service.

use ormgen_core::{ResolvedSchema, ResolvedTable};

use crate::config::GeneratorConfig;
use crate::naming::{comment_lines, wire_field_name};

const INDENT: &str = "  ";

pub fn select_request_name(table: &ResolvedTable) -> String {
    format!("Select{}Request", table.type_name)
}

pub fn select_reply_name(table: &ResolvedTable) -> String {
    format!("Select{}Reply", table.type_name)
}

/// Fixed preamble: syntax, package and shared imports.
pub fn preamble_lines(config: &GeneratorConfig) -> Vec<String> {
    let mut lines = vec![
        "syntax = \"proto3\";".to_string(),
        String::new(),
        format!("package {};", config.proto_package),
    ];
    if !config.shared_imports.is_empty() {
        lines.push(String::new());
        lines.extend(
            config
                .shared_imports
                .iter()
                .map(|import| format!("import {import:?};")),
        );
    }
    lines
}

/// Wire message whose field numbers are the resolved tags.
pub fn message_lines(table: &ResolvedTable) -> Vec<String> {
    let mut lines = comment_lines(table.comment.as_deref(), "//");
    lines.push(format!("message {} {{", table.wire_message_name()));

    for column in &table.columns {
        lines.extend(comment_lines(
            column.comment.as_deref(),
            &format!("{INDENT}//"),
        ));
        lines.push(format!(
            "{INDENT}{} {} = {};",
            column.wire.proto_type(),
            wire_field_name(&column.field_name),
            column.tag
        ));
    }
    for relationship in &table.relationships {
        lines.push(format!(
            "{INDENT}{} {} = {};",
            relationship.wire_message_name(),
            wire_field_name(&relationship.field.field_name),
            relationship.tag
        ));
    }

    lines.push("}".to_string());
    lines
}

/// Request/reply pair used by the select RPCs.
pub fn select_message_lines(table: &ResolvedTable) -> Vec<String> {
    vec![
        format!("message {} {{", select_request_name(table)),
        format!("{INDENT}string request = 1;"),
        "}".to_string(),
        String::new(),
        format!("message {} {{", select_reply_name(table)),
        format!(
            "{INDENT}repeated {} objects = 1;",
            table.wire_message_name()
        ),
        format!("{INDENT}string error_message = 2;"),
        "}".to_string(),
    ]
}

/// Unary select and server-streaming select for one table.
pub fn rpc_lines(table: &ResolvedTable) -> Vec<String> {
    let request = select_request_name(table);
    vec![
        format!(
            "rpc Select{} ({request}) returns ({});",
            table.type_name,
            select_reply_name(table)
        ),
        format!(
            "rpc Stream{} ({request}) returns (stream {});",
            table.type_name,
            table.wire_message_name()
        ),
    ]
}

/// Render the complete wire schema document body.
pub fn render_wire_schema(schema: &ResolvedSchema, config: &GeneratorConfig) -> Vec<String> {
    let mut lines = preamble_lines(config);

    lines.push(String::new());
    lines.push(format!("service {} {{", config.service_name));
    for table in &schema.tables {
        lines.extend(
            rpc_lines(table)
                .into_iter()
                .map(|line| format!("{INDENT}{line}")),
        );
    }
    lines.push("}".to_string());

    for table in &schema.tables {
        lines.push(String::new());
        lines.extend(message_lines(table));
        lines.push(String::new());
        lines.extend(select_message_lines(table));

        tracing::debug!(
            table = %table.type_name,
            fields = table.columns.len() + table.relationships.len(),
            "rendered wire message"
        );
    }

    lines
}
