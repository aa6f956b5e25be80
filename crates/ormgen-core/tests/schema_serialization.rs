use ormgen_core::{Database, Schema, SchemaDocument};

#[test]
fn serializes_document_deterministically() {
    let document = SchemaDocument {
        databases: vec![Database {
            name: "ORCL".to_string(),
            schemas: vec![Schema {
                name: "SH".to_string(),
                tables: Vec::new(),
            }],
        }],
    };

    let json = serde_json::to_string_pretty(&document).expect("serialize document");
    let expected = r#"{
  "databases": [
    {
      "name": "ORCL",
      "schemas": [
        {
          "name": "SH",
          "tables": []
        }
      ]
    }
  ]
}"#;
    assert_eq!(json, expected);

    let parsed = SchemaDocument::from_json_str(&json).expect("parse document");
    assert_eq!(parsed, document);
}
