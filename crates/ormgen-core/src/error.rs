use thiserror::Error;

/// Core error type shared across ormgen crates.
///
/// Every variant is fatal for a generation run.
#[derive(Debug, Error)]
pub enum Error {
    /// The native type declaration matches no recognized family.
    #[error("unknown type `{native_type}` for column {column}")]
    UnknownType { native_type: String, column: String },
    /// A foreign key names a `from` column that the table does not declare.
    #[error("foreign key on {table} references missing column {column}")]
    DanglingForeignKey { table: String, column: String },
    /// Two tables share the same registry handle name.
    #[error("duplicate handle name: {handle}")]
    DuplicateHandle { handle: String },
    /// The input tree is malformed (missing or colliding attributes).
    #[error("invalid schema document: {0}")]
    Structural(String),
    /// A dynamic value could not be converted between representations.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias for results returned by ormgen crates.
pub type Result<T> = std::result::Result<T, Error>;
