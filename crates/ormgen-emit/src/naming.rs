pub use ormgen_core::naming::{REGISTRY_STATIC, handle_const_ident, wire_field_name};

/// Keywords that must be written as raw identifiers in generated Rust.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers and get a trailing underscore.
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "super"];

/// Rust identifier for a generated field, matching the name the protobuf
/// compiler gives the same message field.
pub fn rust_field_ident(field_name: &str) -> String {
    let name = wire_field_name(field_name);
    if RESERVED_PATH_KEYWORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

/// Render a comment as one prefixed line per source line.
pub fn comment_lines(comment: Option<&str>, prefix: &str) -> Vec<String> {
    comment
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| {
            text.lines()
                .map(|line| format!("{prefix} {}", line.trim_end()).trim_end().to_string())
                .collect()
        })
        .unwrap_or_default()
}
