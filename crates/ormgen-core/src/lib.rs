//! Core contracts for ormgen.
//!
//! This crate defines the schema document consumed by the generator, the type
//! resolution rules mapping native column declarations to in-memory and wire
//! types, and the resolved plan every emitter renders from.

pub mod codec;
pub mod error;
pub mod naming;
pub mod relations;
pub mod resolved;
pub mod schema;
pub mod types;
pub mod validation;
pub mod wire;

pub use codec::{DateWire, DecimalValue, DecimalWire, Record, Value, WireMessage, WireValue};
pub use error::{Error, Result};
pub use relations::{RelationshipField, resolve_relationships};
pub use resolved::{
    ResolvedColumn, ResolvedRelationship, ResolvedSchema, ResolvedTable, resolve_document,
    resolve_table, wire_message_name,
};
pub use schema::{Column, Database, ForeignKey, Schema, SchemaDocument, Table};
pub use types::{InMemoryType, SemanticType, resolve, resolve_column};
pub use validation::validate_document;
pub use wire::{CompositeKind, Conversion, ScalarKind, WireType, conversion_for, to_wire_type};
