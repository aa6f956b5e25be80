use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Column;

/// Canonical, storage-agnostic type family of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    ShortInt,
    Int,
    LongInt,
    Decimal,
    Float,
    Double,
    String,
    Date,
    Timestamp,
    Bytes,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::ShortInt => "short_int",
            SemanticType::Int => "int",
            SemanticType::LongInt => "long_int",
            SemanticType::Decimal => "decimal",
            SemanticType::Float => "float",
            SemanticType::Double => "double",
            SemanticType::String => "string",
            SemanticType::Date => "date",
            SemanticType::Timestamp => "timestamp",
            SemanticType::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// In-memory representation: a semantic type, optionally nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InMemoryType {
    pub semantic: SemanticType,
    pub nullable: bool,
}

impl InMemoryType {
    pub fn new(semantic: SemanticType, nullable: bool) -> Self {
        Self { semantic, nullable }
    }

    pub fn required(semantic: SemanticType) -> Self {
        Self::new(semantic, false)
    }

    pub fn nullable(semantic: SemanticType) -> Self {
        Self::new(semantic, true)
    }
}

const NUMERIC_PREFIXES: &[&str] = &["number"];
const FLOAT_PREFIXES: &[&str] = &["float", "binary_float"];
const DOUBLE_PREFIXES: &[&str] = &["binary_double"];
const STRING_PREFIXES: &[&str] = &["varchar2", "nvarchar2", "char", "nchar", "clob", "nclob"];
const TIMESTAMP_PREFIXES: &[&str] = &["timestamp"];
const DATE_PREFIXES: &[&str] = &["date"];
const BYTES_PREFIXES: &[&str] = &["blob", "raw", "long raw"];

/// Suffix marking identifier columns, which always resolve to `Int`.
const IDENTIFIER_SUFFIX: &str = "ID";

/// Largest precision (in digits) of each integer bucket.
const SHORT_INT_MAX_PRECISION: u32 = 4;
const INT_MAX_PRECISION: u32 = 9;
const LONG_INT_MAX_PRECISION: u32 = 18;

/// Resolve a native type declaration to its semantic type.
///
/// Matching is case-insensitive and ignores surrounding and repeated
/// whitespace. Unrecognized declarations fail with [`Error::UnknownType`].
pub fn resolve(native_type: &str, column_name: &str) -> Result<SemanticType> {
    let declaration = normalize(native_type);

    if starts_with_any(&declaration, NUMERIC_PREFIXES) {
        if column_name.ends_with(IDENTIFIER_SUFFIX) {
            return Ok(SemanticType::Int);
        }
        return Ok(resolve_numeric(&declaration));
    }
    if starts_with_any(&declaration, FLOAT_PREFIXES) {
        return Ok(SemanticType::Float);
    }
    if starts_with_any(&declaration, DOUBLE_PREFIXES) {
        return Ok(SemanticType::Double);
    }
    if starts_with_any(&declaration, STRING_PREFIXES) {
        return Ok(SemanticType::String);
    }
    if starts_with_any(&declaration, TIMESTAMP_PREFIXES) {
        return Ok(SemanticType::Timestamp);
    }
    if starts_with_any(&declaration, DATE_PREFIXES) {
        return Ok(SemanticType::Date);
    }
    if starts_with_any(&declaration, BYTES_PREFIXES) {
        return Ok(SemanticType::Bytes);
    }

    Err(Error::UnknownType {
        native_type: native_type.to_string(),
        column: column_name.to_string(),
    })
}

/// Resolve a column to its in-memory type, applying nullable wrapping.
pub fn resolve_column(column: &Column) -> Result<InMemoryType> {
    let semantic = resolve(&column.database_type, &column.name)?;
    Ok(InMemoryType::new(semantic, column.nullable))
}

fn normalize(native_type: &str) -> String {
    native_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn starts_with_any(declaration: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| declaration.starts_with(prefix))
}

fn resolve_numeric(declaration: &str) -> SemanticType {
    let Some((precision, scale)) = numeric_arguments(declaration) else {
        return SemanticType::Decimal;
    };

    if scale.is_some_and(|scale| scale > 0) {
        return SemanticType::Decimal;
    }

    match precision {
        Some(p) if p <= SHORT_INT_MAX_PRECISION => SemanticType::ShortInt,
        Some(p) if p <= INT_MAX_PRECISION => SemanticType::Int,
        Some(p) if p <= LONG_INT_MAX_PRECISION => SemanticType::LongInt,
        _ => SemanticType::Decimal,
    }
}

/// Parse `(precision[, scale])`. A lone precision implies scale 0.
///
/// Returns `None` when the declaration carries no argument list.
fn numeric_arguments(declaration: &str) -> Option<(Option<u32>, Option<i32>)> {
    let open = declaration.find('(')?;
    let close = open + declaration[open..].find(')')?;
    let parts: Vec<&str> = declaration[open + 1..close]
        .split(',')
        .map(str::trim)
        .collect();

    let precision = parts.first().and_then(|part| part.parse::<u32>().ok());
    let scale = match parts.as_slice() {
        [_] => Some(0),
        [_, scale] => scale.parse::<i32>().ok(),
        _ => None,
    };

    Some((precision, scale))
}
