use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default marker for columns filled in by the database on insert.
const DATABASE_GENERATED_DEFAULT: &str = "current_timestamp()";

/// Root of a schema document: the single source of truth for generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDocument {
    pub databases: Vec<Database>,
}

impl SchemaDocument {
    /// Parse a JSON schema document.
    ///
    /// Shape errors (missing attributes, wrong value kinds) are reported as
    /// [`Error::Structural`].
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|err| Error::Structural(err.to_string()))
    }

    /// Iterate `(database, schema, table)` triples in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = (&Database, &Schema, &Table)> {
        self.databases.iter().flat_map(|database| {
            database.schemas.iter().flat_map(move |schema| {
                schema
                    .tables
                    .iter()
                    .map(move |table| (database, schema, table))
            })
        })
    }
}

/// Named container of schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

/// Named container of tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A table together with the names its generated items carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Storage name of the table.
    pub name: String,
    /// Name of the generated record type.
    pub class_name: String,
    /// External handle used by the registry.
    pub handle_name: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Look up a column by storage name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Column metadata for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    /// Storage name, unique within the owning table.
    pub name: String,
    /// Name of the generated field.
    pub field_name: String,
    /// Native type declaration, e.g. `NUMBER(10,2)`.
    pub database_type: String,
    #[serde(default)]
    pub nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    /// True when the database fills the column itself on insert.
    pub fn is_database_generated(&self) -> bool {
        self.default
            .as_deref()
            .map(|value| value.trim().eq_ignore_ascii_case(DATABASE_GENERATED_DEFAULT))
            .unwrap_or(false)
    }
}

/// Relationship from a local column to another generated type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    /// Storage name of the local column holding the key.
    pub from_column: String,
    /// Generated type the relationship points at.
    pub to_class_name: String,
    /// Name of the generated relationship field.
    pub field_name: String,
}
