use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Table;
use crate::types::InMemoryType;

/// Relationship field derived from a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipField {
    pub field_name: String,
    /// Generated type the field refers to.
    pub target_type: String,
    /// Storage name of the local key column.
    pub from_column: String,
    /// Mirrors the nullability of the key column.
    pub nullable: bool,
}

/// Derive relationship fields for every foreign key of `table`.
///
/// `columns` maps storage names to already-resolved column types. A foreign
/// key whose `from` column is missing fails with
/// [`Error::DanglingForeignKey`].
pub fn resolve_relationships(
    table: &Table,
    columns: &BTreeMap<String, InMemoryType>,
) -> Result<Vec<RelationshipField>> {
    table
        .foreign_keys
        .iter()
        .map(|fk| {
            let column = columns
                .get(&fk.from_column)
                .ok_or_else(|| Error::DanglingForeignKey {
                    table: table.name.clone(),
                    column: fk.from_column.clone(),
                })?;

            Ok(RelationshipField {
                field_name: fk.field_name.clone(),
                target_type: fk.to_class_name.clone(),
                from_column: fk.from_column.clone(),
                nullable: column.nullable,
            })
        })
        .collect()
}
