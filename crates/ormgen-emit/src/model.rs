//! Model emitter: record structs, wire conversions and table accessors.

use ormgen_core::{
    CompositeKind, Conversion, InMemoryType, ResolvedColumn, ResolvedRelationship, ResolvedTable,
    SemanticType,
};

use crate::naming::{comment_lines, rust_field_ident, wire_field_name};

const INDENT: &str = "    ";

/// Suffix of the generated table accessor type.
pub const ACCESSOR_SUFFIX: &str = "Table";

/// Name of the accessor type generated for a table.
pub fn accessor_name(table: &ResolvedTable) -> String {
    format!("{}{ACCESSOR_SUFFIX}", table.type_name)
}

/// Rust type of a field with the given in-memory type.
pub fn rust_type(ty: InMemoryType) -> String {
    let base = match ty.semantic {
        SemanticType::ShortInt => "i16",
        SemanticType::Int => "i32",
        SemanticType::LongInt => "i64",
        SemanticType::Decimal => "Decimal",
        SemanticType::Float => "f32",
        SemanticType::Double => "f64",
        SemanticType::String => "String",
        SemanticType::Date => "NaiveDate",
        SemanticType::Timestamp => "NaiveDateTime",
        SemanticType::Bytes => "Vec<u8>",
    };
    if ty.nullable {
        format!("Option<{base}>")
    } else {
        base.to_string()
    }
}

/// Rust type of a relationship field.
pub fn relationship_type(relationship: &ResolvedRelationship) -> String {
    let related = format!("Related<{}>", relationship.field.target_type);
    if relationship.field.nullable {
        format!("Option<{related}>")
    } else {
        related
    }
}

/// Render the record, its conversions and its accessor for one table.
pub fn render_table(table: &ResolvedTable) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(record_lines(table));
    lines.push(String::new());
    lines.extend(constructor_lines(table));
    lines.push(String::new());
    lines.extend(from_wire_lines(table));
    lines.push(String::new());
    lines.extend(accessor_lines(table));

    tracing::debug!(
        table = %table.type_name,
        columns = table.columns.len(),
        relationships = table.relationships.len(),
        "rendered model record"
    );
    lines
}

fn record_lines(table: &ResolvedTable) -> Vec<String> {
    let mut lines = comment_lines(table.comment.as_deref(), "///");
    lines.push("#[derive(Debug, Clone, Default, PartialEq)]".to_string());
    lines.push(format!("pub struct {} {{", table.type_name));

    for column in &table.columns {
        lines.extend(comment_lines(
            column.comment.as_deref(),
            &format!("{INDENT}///"),
        ));
        lines.push(format!(
            "{INDENT}pub {}: {},",
            rust_field_ident(&column.field_name),
            rust_type(column.in_memory)
        ));
    }
    for relationship in &table.relationships {
        lines.push(format!(
            "{INDENT}pub {}: {},",
            rust_field_ident(&relationship.field.field_name),
            relationship_type(relationship)
        ));
    }

    lines.push("}".to_string());
    lines
}

fn constructor_lines(table: &ResolvedTable) -> Vec<String> {
    let message = table.wire_message_name();
    let mut lines = vec![
        format!("impl {} {{", table.type_name),
        format!("{INDENT}pub fn new() -> Self {{"),
        format!("{INDENT}{INDENT}Self::default()"),
        format!("{INDENT}}}"),
        String::new(),
        format!("{INDENT}pub fn to_proto(&self) -> {message} {{"),
        format!("{INDENT}{INDENT}let mut message = {message}::default();"),
    ];

    let body = format!("{INDENT}{INDENT}");
    for column in &table.columns {
        lines.push(format!("{body}{}", column_to_wire(column)));
    }
    for relationship in &table.relationships {
        lines.extend(
            relationship_to_wire(relationship)
                .into_iter()
                .map(|line| format!("{body}{line}")),
        );
    }

    lines.push(format!("{body}message"));
    lines.push(format!("{INDENT}}}"));
    lines.push("}".to_string());
    lines
}

fn from_wire_lines(table: &ResolvedTable) -> Vec<String> {
    let message = table.wire_message_name();
    let mut lines = vec![
        format!("impl TryFrom<{message}> for {} {{", table.type_name),
        format!("{INDENT}type Error = support::WireError;"),
        String::new(),
        format!("{INDENT}fn try_from(message: {message}) -> Result<Self, Self::Error> {{"),
        format!("{INDENT}{INDENT}let mut value = Self::new();"),
    ];

    let body = format!("{INDENT}{INDENT}");
    for column in &table.columns {
        lines.extend(
            column_from_wire(column)
                .into_iter()
                .map(|line| format!("{body}{line}")),
        );
    }
    for relationship in &table.relationships {
        lines.extend(
            relationship_from_wire(relationship)
                .into_iter()
                .map(|line| format!("{body}{line}")),
        );
    }

    lines.push(format!("{body}Ok(value)"));
    lines.push(format!("{INDENT}}}"));
    lines.push("}".to_string());
    lines
}

fn accessor_lines(table: &ResolvedTable) -> Vec<String> {
    let accessor = accessor_name(table);
    let body = format!("{INDENT}{INDENT}");
    let mut lines = vec![
        "#[derive(Debug, Clone, Copy, Default)]".to_string(),
        format!("pub struct {accessor};"),
        String::new(),
        format!("impl TableAccessor for {accessor} {{"),
        format!("{INDENT}fn table_name(&self) -> &'static str {{"),
        format!("{body}{:?}", table.storage_name),
        format!("{INDENT}}}"),
        String::new(),
        format!("{INDENT}fn schema_name(&self) -> &'static str {{"),
        format!("{body}{:?}", table.schema_name),
        format!("{INDENT}}}"),
        String::new(),
        format!("{INDENT}fn fields(&self) -> &'static [(&'static str, &'static str)] {{"),
        format!("{body}&["),
    ];

    for column in &table.columns {
        lines.push(format!(
            "{body}{INDENT}({:?}, {:?}),",
            wire_field_name(&column.field_name),
            column.storage_name
        ));
    }
    lines.push(format!("{body}]"));
    lines.push(format!("{INDENT}}}"));
    lines.push(String::new());

    let generated: Vec<String> = table
        .columns
        .iter()
        .filter(|column| column.database_generated)
        .map(|column| format!("{:?}", column.storage_name))
        .collect();
    lines.push(format!(
        "{INDENT}fn database_generated(&self) -> &'static [&'static str] {{"
    ));
    lines.push(format!("{body}&[{}]", generated.join(", ")));
    lines.push(format!("{INDENT}}}"));
    lines.push("}".to_string());
    lines
}

fn column_to_wire(column: &ResolvedColumn) -> String {
    let ident = rust_field_ident(&column.field_name);
    let nullable = column.in_memory.nullable;
    let expr = match column.conversion {
        Conversion::Copy if is_copy(column.in_memory.semantic) => format!("self.{ident}"),
        Conversion::Copy => format!("self.{ident}.clone()"),
        Conversion::Widen if nullable => format!("self.{ident}.map(i32::from)"),
        Conversion::Widen => format!("i32::from(self.{ident})"),
        Conversion::Composite(kind) if nullable => {
            format!("self.{ident}.as_ref().map(support::{})", to_wire_fn(kind))
        }
        Conversion::Composite(kind) => {
            format!("Some(support::{}(&self.{ident}))", to_wire_fn(kind))
        }
        Conversion::EpochSeconds if nullable => {
            format!("self.{ident}.as_ref().map(support::timestamp_to_wire)")
        }
        Conversion::EpochSeconds => format!("support::timestamp_to_wire(&self.{ident})"),
    };
    format!("message.{ident} = {expr};")
}

fn column_from_wire(column: &ResolvedColumn) -> Vec<String> {
    let ident = rust_field_ident(&column.field_name);
    let convert = |source: &str| match column.conversion {
        Conversion::Copy => source.to_string(),
        Conversion::Widen => format!("support::short_from_wire({source})?"),
        Conversion::Composite(kind) => format!("support::{}(&{source})?", from_wire_fn(kind)),
        Conversion::EpochSeconds => format!("support::timestamp_from_wire({source})?"),
    };

    if column.in_memory.nullable {
        return guarded(&ident, &format!("Some({})", convert("v")));
    }
    if let Conversion::Composite(_) = column.conversion {
        return vec![
            format!("let Some(v) = message.{ident} else {{"),
            format!(
                "{INDENT}return Err(support::missing_field({:?}));",
                wire_field_name(&column.field_name)
            ),
            "};".to_string(),
            format!("value.{ident} = {};", convert("v")),
        ];
    }
    vec![format!(
        "value.{ident} = {};",
        convert(&format!("message.{ident}"))
    )]
}

fn relationship_to_wire(relationship: &ResolvedRelationship) -> Vec<String> {
    let ident = rust_field_ident(&relationship.field.field_name);
    let source = if relationship.field.nullable {
        format!("self.{ident}.as_ref().and_then(Related::get)")
    } else {
        format!("self.{ident}.get()")
    };
    let nested = if relationship.boxed {
        "Box::new(related.to_proto())"
    } else {
        "related.to_proto()"
    };

    vec![
        format!("if let Some(related) = {source} {{"),
        format!("{INDENT}message.{ident} = Some({nested});"),
        "}".to_string(),
    ]
}

fn relationship_from_wire(relationship: &ResolvedRelationship) -> Vec<String> {
    let ident = rust_field_ident(&relationship.field.field_name);
    let source = if relationship.boxed {
        "*v"
    } else {
        "v"
    };
    let loaded = format!(
        "Related::loaded({}::try_from({source})?)",
        relationship.field.target_type
    );
    let assigned = if relationship.field.nullable {
        format!("Some({loaded})")
    } else {
        loaded
    };
    guarded(&ident, &assigned)
}

/// Assignment wrapped in a presence check on the wire field.
fn guarded(ident: &str, assigned: &str) -> Vec<String> {
    vec![
        format!("if let Some(v) = message.{ident} {{"),
        format!("{INDENT}value.{ident} = {assigned};"),
        "}".to_string(),
    ]
}

fn is_copy(semantic: SemanticType) -> bool {
    !matches!(semantic, SemanticType::String | SemanticType::Bytes)
}

fn to_wire_fn(kind: CompositeKind) -> &'static str {
    match kind {
        CompositeKind::Decimal => "decimal_to_wire",
        CompositeKind::Date => "date_to_wire",
    }
}

fn from_wire_fn(kind: CompositeKind) -> &'static str {
    match kind {
        CompositeKind::Decimal => "decimal_from_wire",
        CompositeKind::Date => "date_from_wire",
    }
}

#[cfg(test)]
mod tests {
    use ormgen_core::{SchemaDocument, resolve_document};

    use super::*;

    const EMPLOYEES: &str = r#"{
  "databases": [{
    "name": "HR",
    "schemas": [{
      "name": "HR",
      "tables": [
        {
          "name": "EMPLOYEES",
          "class_name": "Employee",
          "handle_name": "Employees",
          "columns": [
            { "name": "EMPLOYEE_ID", "field_name": "EmployeeId", "database_type": "NUMBER(6,0)" },
            { "name": "TYPE", "field_name": "Type", "database_type": "VARCHAR2(10)" },
            { "name": "GRADE", "field_name": "Grade", "database_type": "NUMBER(3)" },
            { "name": "HIRED", "field_name": "Hired", "database_type": "DATE" },
            { "name": "LAST_REVIEW", "field_name": "LastReview", "database_type": "TIMESTAMP(6)" },
            { "name": "SALARY", "field_name": "Salary", "database_type": "NUMBER(8,2)", "nullable": true },
            { "name": "MANAGER_ID", "field_name": "ManagerId", "database_type": "NUMBER(6,0)", "nullable": true },
            { "name": "DEPARTMENT_ID", "field_name": "DepartmentId", "database_type": "NUMBER(4,0)" }
          ],
          "foreign_keys": [
            { "from_column": "MANAGER_ID", "to_class_name": "Employee", "field_name": "Manager" },
            { "from_column": "DEPARTMENT_ID", "to_class_name": "Department", "field_name": "Department" }
          ]
        },
        {
          "name": "DEPARTMENTS",
          "class_name": "Department",
          "handle_name": "Departments",
          "columns": [
            { "name": "DEPARTMENT_ID", "field_name": "DepartmentId", "database_type": "NUMBER(4,0)" },
            { "name": "MANAGER_ID", "field_name": "ManagerId", "database_type": "NUMBER(6,0)", "nullable": true }
          ],
          "foreign_keys": [
            { "from_column": "MANAGER_ID", "to_class_name": "Employee", "field_name": "Manager" }
          ]
        },
        {
          "name": "LOCATIONS",
          "class_name": "Location",
          "handle_name": "Locations",
          "columns": [
            { "name": "LOCATION_ID", "field_name": "LocationId", "database_type": "NUMBER(4,0)" },
            { "name": "DEPARTMENT_ID", "field_name": "DepartmentId", "database_type": "NUMBER(4,0)" }
          ],
          "foreign_keys": [
            { "from_column": "DEPARTMENT_ID", "to_class_name": "Department", "field_name": "Department" }
          ]
        }
      ]
    }]
  }]
}"#;

    fn table_lines(index: usize) -> Vec<String> {
        let document = SchemaDocument::from_json_str(EMPLOYEES).expect("parse document");
        let schema = resolve_document(&document).expect("resolve document");
        render_table(&schema.tables[index])
    }

    fn employee_lines() -> Vec<String> {
        table_lines(0)
    }

    fn has_line(lines: &[String], expected: &str) -> bool {
        lines.iter().any(|line| line == expected)
    }

    #[test]
    fn maps_in_memory_types() {
        assert_eq!(rust_type(InMemoryType::required(SemanticType::ShortInt)), "i16");
        assert_eq!(rust_type(InMemoryType::nullable(SemanticType::Bytes)), "Option<Vec<u8>>");
        assert_eq!(
            rust_type(InMemoryType::nullable(SemanticType::Timestamp)),
            "Option<NaiveDateTime>"
        );
    }

    #[test]
    fn self_reference_is_boxed() {
        let lines = employee_lines();
        assert!(has_line(&lines, "    pub manager: Option<Related<Employee>>,"));
        assert!(has_line(
            &lines,
            "            message.manager = Some(Box::new(related.to_proto()));"
        ));
        assert!(has_line(
            &lines,
            "            value.manager = Some(Related::loaded(Employee::try_from(*v)?));"
        ));
    }

    #[test]
    fn mutual_references_are_boxed_on_both_sides() {
        let employee = employee_lines();
        assert!(has_line(&employee, "    pub department: Related<Department>,"));
        assert!(has_line(
            &employee,
            "            message.department = Some(Box::new(related.to_proto()));"
        ));
        assert!(has_line(
            &employee,
            "            value.department = Related::loaded(Department::try_from(*v)?);"
        ));

        let department = table_lines(1);
        assert!(has_line(
            &department,
            "            message.manager = Some(Box::new(related.to_proto()));"
        ));
        assert!(has_line(
            &department,
            "            value.manager = Some(Related::loaded(Employee::try_from(*v)?));"
        ));
    }

    #[test]
    fn references_into_a_cycle_stay_unboxed() {
        let location = table_lines(2);
        assert!(has_line(
            &location,
            "            message.department = Some(related.to_proto());"
        ));
        assert!(has_line(
            &location,
            "            value.department = Related::loaded(Department::try_from(v)?);"
        ));
    }

    #[test]
    fn keyword_fields_use_raw_identifiers() {
        let lines = employee_lines();
        assert!(has_line(&lines, "    pub r#type: String,"));
        assert!(has_line(&lines, "        message.r#type = self.r#type.clone();"));
        assert!(has_line(&lines, "            (\"type\", \"TYPE\"),"));
    }

    #[test]
    fn wire_conversion_is_fallible() {
        let lines = employee_lines();
        assert!(has_line(&lines, "impl TryFrom<EmployeeProto> for Employee {"));
        assert!(has_line(&lines, "    type Error = support::WireError;"));
        assert!(has_line(
            &lines,
            "    fn try_from(message: EmployeeProto) -> Result<Self, Self::Error> {"
        ));
        assert!(has_line(&lines, "        Ok(value)"));
    }

    #[test]
    fn short_ints_narrow_with_a_range_check() {
        let lines = employee_lines();
        assert!(has_line(&lines, "    pub grade: i16,"));
        assert!(has_line(&lines, "        message.grade = i32::from(self.grade);"));
        assert!(has_line(
            &lines,
            "        value.grade = support::short_from_wire(message.grade)?;"
        ));
        assert!(!lines.iter().any(|line| line.contains(" as i16")));
    }

    #[test]
    fn timestamps_decode_through_a_checked_helper() {
        let lines = employee_lines();
        assert!(has_line(
            &lines,
            "        message.last_review = support::timestamp_to_wire(&self.last_review);"
        ));
        assert!(has_line(
            &lines,
            "        value.last_review = support::timestamp_from_wire(message.last_review)?;"
        ));
    }

    #[test]
    fn composites_convert_through_support() {
        let lines = employee_lines();
        assert!(has_line(
            &lines,
            "        message.hired = Some(support::date_to_wire(&self.hired));"
        ));
        assert!(has_line(&lines, "        let Some(v) = message.hired else {"));
        assert!(has_line(
            &lines,
            "            return Err(support::missing_field(\"hired\"));"
        ));
        assert!(has_line(&lines, "        value.hired = support::date_from_wire(&v)?;"));
        assert!(has_line(
            &lines,
            "        message.salary = self.salary.as_ref().map(support::decimal_to_wire);"
        ));
        assert!(has_line(
            &lines,
            "            value.salary = Some(support::decimal_from_wire(&v)?);"
        ));
        assert!(has_line(&lines, "        &[]"));
    }
}
