use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{InMemoryType, SemanticType};

/// Wire message carrying a decimal value.
pub const DECIMAL_MESSAGE: &str = "DecimalProto";
/// Wire message carrying a calendar date.
pub const DATE_MESSAGE: &str = "DateProto";

/// Primitive proto3 scalar kinds used by generated messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Int32,
    Int64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarKind {
    pub fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }
}

/// Multi-field wire types whose presence is the message field's own presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Decimal,
    Date,
}

impl CompositeKind {
    pub fn message_name(self) -> &'static str {
        match self {
            CompositeKind::Decimal => DECIMAL_MESSAGE,
            CompositeKind::Date => DATE_MESSAGE,
        }
    }
}

/// Type used to carry a field across the serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum WireType {
    Scalar(ScalarKind),
    Optional(ScalarKind),
    Composite(CompositeKind),
}

impl WireType {
    /// Field type as written in a proto3 message, including the `optional` label.
    pub fn proto_type(self) -> String {
        match self {
            WireType::Scalar(kind) => kind.proto_name().to_string(),
            WireType::Optional(kind) => format!("optional {}", kind.proto_name()),
            WireType::Composite(kind) => kind.message_name().to_string(),
        }
    }

    /// True when absence is observable on the wire.
    pub fn has_presence(self) -> bool {
        !matches!(self, WireType::Scalar(_))
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.proto_type())
    }
}

/// Project an in-memory type onto its wire type.
///
/// Composite types ignore nullability; every other type becomes `optional`
/// when nullable.
pub fn to_wire_type(ty: InMemoryType) -> WireType {
    let scalar = match ty.semantic {
        SemanticType::Decimal => return WireType::Composite(CompositeKind::Decimal),
        SemanticType::Date => return WireType::Composite(CompositeKind::Date),
        SemanticType::ShortInt | SemanticType::Int => ScalarKind::Int32,
        SemanticType::LongInt => ScalarKind::Int64,
        SemanticType::Float => ScalarKind::Float,
        SemanticType::Double | SemanticType::Timestamp => ScalarKind::Double,
        SemanticType::String => ScalarKind::String,
        SemanticType::Bytes => ScalarKind::Bytes,
    };

    if ty.nullable {
        WireType::Optional(scalar)
    } else {
        WireType::Scalar(scalar)
    }
}

/// How a value moves between its in-memory and wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    /// Same representation on both sides.
    Copy,
    /// `ShortInt` travels widened to int32 and is narrowed back.
    Widen,
    /// Converted through a composite message.
    Composite(CompositeKind),
    /// Date-time travels as epoch seconds.
    EpochSeconds,
}

/// Conversion rule for an in-memory type.
pub fn conversion_for(ty: InMemoryType) -> Conversion {
    match ty.semantic {
        SemanticType::ShortInt => Conversion::Widen,
        SemanticType::Decimal => Conversion::Composite(CompositeKind::Decimal),
        SemanticType::Date => Conversion::Composite(CompositeKind::Date),
        SemanticType::Timestamp => Conversion::EpochSeconds,
        SemanticType::Int
        | SemanticType::LongInt
        | SemanticType::Float
        | SemanticType::Double
        | SemanticType::String
        | SemanticType::Bytes => Conversion::Copy,
    }
}
