//! Resolved generation plan shared by every emitter.
//!
//! Each column and foreign key is resolved exactly once here; emitters only
//! read the result, so the model, wire schema and registry cannot disagree on
//! a field's type, nullability or wire tag.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::relations::{RelationshipField, resolve_relationships};
use crate::schema::{Column, SchemaDocument, Table};
use crate::types::{InMemoryType, resolve_column};
use crate::validation::validate_document;
use crate::wire::{Conversion, WireType, conversion_for, to_wire_type};

/// Suffix appended to a generated type name to form its wire message name.
pub const WIRE_MESSAGE_SUFFIX: &str = "Proto";

/// Fully resolved document, tables in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    pub tables: Vec<ResolvedTable>,
}

impl ResolvedSchema {
    /// Look up a table by generated type name.
    pub fn table(&self, type_name: &str) -> Option<&ResolvedTable> {
        self.tables.iter().find(|table| table.type_name == type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTable {
    pub database_name: String,
    pub schema_name: String,
    pub storage_name: String,
    pub type_name: String,
    pub handle_name: String,
    pub comment: Option<String>,
    pub columns: Vec<ResolvedColumn>,
    pub relationships: Vec<ResolvedRelationship>,
}

impl ResolvedTable {
    /// Name of the wire message mirroring this table's record type.
    pub fn wire_message_name(&self) -> String {
        wire_message_name(&self.type_name)
    }

    /// Wire tags in field order: columns first, then relationships.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.columns
            .iter()
            .map(|column| column.tag)
            .chain(self.relationships.iter().map(|relationship| relationship.tag))
    }

    pub fn column(&self, field_name: &str) -> Option<&ResolvedColumn> {
        self.columns
            .iter()
            .find(|column| column.field_name == field_name)
    }

    pub fn relationship(&self, field_name: &str) -> Option<&ResolvedRelationship> {
        self.relationships
            .iter()
            .find(|relationship| relationship.field.field_name == field_name)
    }
}

/// Scalar field backed by a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub storage_name: String,
    pub field_name: String,
    pub comment: Option<String>,
    pub in_memory: InMemoryType,
    pub wire: WireType,
    pub conversion: Conversion,
    pub database_generated: bool,
    /// 1-based wire field number.
    pub tag: u32,
}

/// Relationship field backed by a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRelationship {
    pub field: RelationshipField,
    /// 1-based wire field number.
    pub tag: u32,
    /// The target type can reach the owning type through relationships, so
    /// the compiled wire message holds this field boxed.
    pub boxed: bool,
}

impl ResolvedRelationship {
    pub fn wire_message_name(&self) -> String {
        wire_message_name(&self.field.target_type)
    }
}

pub fn wire_message_name(type_name: &str) -> String {
    format!("{type_name}{WIRE_MESSAGE_SUFFIX}")
}

/// Validate and resolve a schema document.
///
/// Stops at the first unresolved type, dangling key, duplicate handle or
/// structural problem.
pub fn resolve_document(document: &SchemaDocument) -> Result<ResolvedSchema> {
    validate_document(document)?;

    let tables = document
        .tables()
        .map(|(database, schema, table)| resolve_table(&database.name, &schema.name, table))
        .collect::<Result<Vec<_>>>()?;

    let mut schema = ResolvedSchema { tables };
    mark_recursive_relationships(&mut schema);
    Ok(schema)
}

/// Resolve one table; wire tags restart at 1 for every table.
///
/// Only direct self references are marked boxed here; cycles through other
/// tables are detected by [`resolve_document`].
pub fn resolve_table(database_name: &str, schema_name: &str, table: &Table) -> Result<ResolvedTable> {
    let mut types = BTreeMap::new();
    let mut columns = Vec::with_capacity(table.columns.len());
    let mut next_tag = 1_u32;

    for column in &table.columns {
        let in_memory = resolve_column(column)?;
        types.insert(column.name.clone(), in_memory);
        columns.push(resolved_column(column, in_memory, next_tag));
        next_tag += 1;
    }

    let relationships = resolve_relationships(table, &types)?
        .into_iter()
        .map(|field| {
            let tag = next_tag;
            next_tag += 1;
            let boxed = field.target_type == table.class_name;
            ResolvedRelationship { field, tag, boxed }
        })
        .collect();

    Ok(ResolvedTable {
        database_name: database_name.to_string(),
        schema_name: schema_name.to_string(),
        storage_name: table.name.clone(),
        type_name: table.class_name.clone(),
        handle_name: table.handle_name.clone(),
        comment: table.comment.clone(),
        columns,
        relationships,
    })
}

/// Box every relationship whose target type leads back to its owner.
fn mark_recursive_relationships(schema: &mut ResolvedSchema) {
    let edges: BTreeMap<String, Vec<String>> = schema
        .tables
        .iter()
        .map(|table| {
            let targets = table
                .relationships
                .iter()
                .map(|relationship| relationship.field.target_type.clone())
                .collect();
            (table.type_name.clone(), targets)
        })
        .collect();

    for table in &mut schema.tables {
        for relationship in &mut table.relationships {
            relationship.boxed = reaches(&edges, &relationship.field.target_type, &table.type_name);
        }
    }
}

fn reaches(edges: &BTreeMap<String, Vec<String>>, from: &str, to: &str) -> bool {
    let mut visited = BTreeSet::new();
    let mut stack = vec![from];
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(targets) = edges.get(current) {
            stack.extend(targets.iter().map(String::as_str));
        }
    }
    false
}

fn resolved_column(column: &Column, in_memory: InMemoryType, tag: u32) -> ResolvedColumn {
    ResolvedColumn {
        storage_name: column.name.clone(),
        field_name: column.field_name.clone(),
        comment: column.comment.clone(),
        in_memory,
        wire: to_wire_type(in_memory),
        conversion: conversion_for(in_memory),
        database_generated: column.is_database_generated(),
        tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{Database, ForeignKey, Schema};
    use crate::types::SemanticType;
    use crate::wire::ScalarKind;

    fn column(name: &str, database_type: &str, nullable: bool) -> Column {
        Column {
            name: name.to_string(),
            field_name: name.to_lowercase(),
            database_type: database_type.to_string(),
            nullable,
            default: None,
            comment: None,
        }
    }

    fn document() -> SchemaDocument {
        let countries = Table {
            name: "COUNTRIES".to_string(),
            class_name: "Country".to_string(),
            handle_name: "Countries".to_string(),
            comment: None,
            columns: vec![column("COUNTRY_ID", "NUMBER", false)],
            foreign_keys: Vec::new(),
        };
        let customers = Table {
            name: "CUSTOMERS".to_string(),
            class_name: "Customer".to_string(),
            handle_name: "Customers".to_string(),
            comment: Some("dimension table".to_string()),
            columns: vec![
                column("CUST_ID", "NUMBER", false),
                column("CUST_CREDIT_LIMIT", "NUMBER", true),
                column("COUNTRY_ID", "NUMBER", true),
            ],
            foreign_keys: vec![ForeignKey {
                from_column: "COUNTRY_ID".to_string(),
                to_class_name: "Country".to_string(),
                field_name: "Country".to_string(),
            }],
        };

        SchemaDocument {
            databases: vec![Database {
                name: "ORCL".to_string(),
                schemas: vec![Schema {
                    name: "SH".to_string(),
                    tables: vec![countries, customers],
                }],
            }],
        }
    }

    #[test]
    fn numbers_columns_then_relationships() {
        let resolved = resolve_document(&document()).expect("resolve document");
        let customer = resolved.table("Customer").expect("customer table");

        assert_eq!(customer.tags().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(customer.relationships[0].tag, 4);
        assert!(customer.relationships[0].field.nullable);
        assert_eq!(customer.relationships[0].wire_message_name(), "CountryProto");

        let country = resolved.table("Country").expect("country table");
        assert_eq!(country.tags().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn carries_types_into_plan() {
        let resolved = resolve_document(&document()).expect("resolve document");
        let customer = resolved.table("Customer").expect("customer table");

        let id = customer.column("cust_id").expect("id column");
        assert_eq!(id.in_memory, InMemoryType::required(SemanticType::Int));
        assert_eq!(id.wire, WireType::Scalar(ScalarKind::Int32));

        let limit = customer.column("cust_credit_limit").expect("limit column");
        assert_eq!(limit.in_memory, InMemoryType::nullable(SemanticType::Decimal));
        assert_eq!(limit.wire.proto_type(), "DecimalProto");
    }

    #[test]
    fn boxes_relationships_on_reference_cycles() {
        let mut doc = document();
        let tables = &mut doc.databases[0].schemas[0].tables;
        tables[0].columns.push(column("HQ_CUST_ID", "NUMBER", true));
        tables[0].foreign_keys.push(ForeignKey {
            from_column: "HQ_CUST_ID".to_string(),
            to_class_name: "Customer".to_string(),
            field_name: "Headquarters".to_string(),
        });

        let resolved = resolve_document(&doc).expect("resolve document");
        let customer = resolved.table("Customer").expect("customer table");
        let country = resolved.table("Country").expect("country table");
        assert!(customer.relationship("Country").expect("relationship").boxed);
        assert!(country.relationship("Headquarters").expect("relationship").boxed);
    }

    #[test]
    fn leaves_acyclic_relationships_unboxed() {
        let resolved = resolve_document(&document()).expect("resolve document");
        let customer = resolved.table("Customer").expect("customer table");
        assert!(!customer.relationship("Country").expect("relationship").boxed);
    }

    #[test]
    fn unknown_type_aborts_resolution() {
        let mut doc = document();
        doc.databases[0].schemas[0].tables[0].columns[0].database_type = "XMLTYPE".to_string();

        let err = resolve_document(&doc).unwrap_err();
        assert!(matches!(err, Error::UnknownType { native_type, .. } if native_type == "XMLTYPE"));
    }
}
