use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::naming::{REGISTRY_STATIC, handle_const_ident, wire_field_name};
use crate::schema::{SchemaDocument, Table};

/// Validate internal consistency of a schema document.
///
/// This checks:
/// - required names are present
/// - duplicate generated type names and handle constants
/// - duplicate column storage names and colliding generated field names
/// - foreign key columns and target types exist
pub fn validate_document(document: &SchemaDocument) -> Result<()> {
    let mut type_names = BTreeSet::new();
    let mut handles: BTreeMap<String, &str> = BTreeMap::new();

    for (database, schema, table) in document.tables() {
        let location = format!("{}.{}.{}", database.name, schema.name, table.name);
        require(&table.name, "table name", &location)?;
        require(&table.class_name, "class_name", &location)?;
        require(&table.handle_name, "handle_name", &location)?;

        if !type_names.insert(table.class_name.as_str()) {
            return Err(Error::Structural(format!(
                "duplicate generated type name: {} ({location})",
                table.class_name
            )));
        }
        claim_handle(&mut handles, &table.handle_name, &location)?;

        validate_members(table, &location)?;
    }

    for (database, schema, table) in document.tables() {
        for fk in &table.foreign_keys {
            if !type_names.contains(fk.to_class_name.as_str()) {
                return Err(Error::Structural(format!(
                    "foreign key target type not declared: {} ({}.{}.{}.{})",
                    fk.to_class_name, database.name, schema.name, table.name, fk.field_name
                )));
            }
        }
    }

    Ok(())
}

fn validate_members(table: &Table, location: &str) -> Result<()> {
    let mut storage_names = BTreeSet::new();
    let mut field_names: BTreeMap<String, &str> = BTreeMap::new();

    for column in &table.columns {
        let column_location = format!("{location}.{}", column.name);
        require(&column.name, "column name", &column_location)?;
        require(&column.field_name, "field_name", &column_location)?;
        require(&column.database_type, "database_type", &column_location)?;

        if !storage_names.insert(column.name.as_str()) {
            return Err(Error::Structural(format!(
                "duplicate column name: {column_location}"
            )));
        }
        claim_field_name(&mut field_names, &column.field_name, location)?;
    }

    for fk in &table.foreign_keys {
        let fk_location = format!("{location}.{}", fk.field_name);
        require(&fk.field_name, "foreign key field_name", &fk_location)?;
        require(&fk.to_class_name, "to_class_name", &fk_location)?;

        if !storage_names.contains(fk.from_column.as_str()) {
            return Err(Error::DanglingForeignKey {
                table: table.name.clone(),
                column: fk.from_column.clone(),
            });
        }
        claim_field_name(&mut field_names, &fk.field_name, location)?;
    }

    Ok(())
}

/// Every handle renders as a registry constant next to the registry static.
fn claim_handle<'a>(
    claimed: &mut BTreeMap<String, &'a str>,
    handle_name: &'a str,
    location: &str,
) -> Result<()> {
    let ident = handle_const_ident(handle_name);
    if ident == REGISTRY_STATIC {
        return Err(Error::Structural(format!(
            "handle {handle_name} collides with the registry static {REGISTRY_STATIC} ({location})"
        )));
    }
    if claimed.insert(ident, handle_name).is_some() {
        return Err(Error::DuplicateHandle {
            handle: handle_name.to_string(),
        });
    }
    Ok(())
}

/// Generated field names must stay distinct after snake casing.
fn claim_field_name<'a>(
    claimed: &mut BTreeMap<String, &'a str>,
    field_name: &'a str,
    location: &str,
) -> Result<()> {
    if let Some(existing) = claimed.insert(wire_field_name(field_name), field_name) {
        return Err(Error::Structural(format!(
            "generated field names collide: {existing} and {field_name} ({location})"
        )));
    }
    Ok(())
}

fn require(value: &str, attribute: &str, location: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Structural(format!(
            "missing {attribute} at {location}"
        )));
    }
    Ok(())
}
