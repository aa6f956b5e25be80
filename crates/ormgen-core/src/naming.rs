//! Names shared by every generated artifact.
//!
//! Validation and the emitters both go through these functions, so a schema
//! that validates cannot render two items under the same name.

use heck::{ToShoutySnakeCase, ToSnakeCase};

/// Name of the generated static listing every table handle.
pub const REGISTRY_STATIC: &str = "TABLES";

/// Field name shared by the record struct and the wire message.
pub fn wire_field_name(field_name: &str) -> String {
    field_name.to_snake_case()
}

/// Constant name for a registry handle.
pub fn handle_const_ident(handle_name: &str) -> String {
    handle_name.to_shouty_snake_case()
}
