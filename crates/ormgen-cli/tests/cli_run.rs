use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../ormgen-core/tests/fixtures/sales_history.schema.json")
}

fn ormgen(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ormgen"));
    command.current_dir(dir).env("RUST_LOG", "warn");
    command
}

#[test]
fn writes_both_documents_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");

    let status = ormgen(dir.path())
        .arg(fixture_path())
        .status()
        .expect("run ormgen");
    assert!(status.success());

    let model = fs::read_to_string(dir.path().join("generated/model.rs")).expect("model");
    let wire = fs::read_to_string(dir.path().join("generated/orm.proto")).expect("wire");
    assert!(model.contains("pub struct Customer {"));
    assert!(wire.contains("message CustomerProto {"));
}

#[test]
fn honours_config_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("ormgen.toml");
    fs::write(
        &config,
        "model_output = \"out/sales.rs\"\nwire_output = \"out/sales.proto\"\nproto_package = \"sales\"\n",
    )
    .expect("write config");

    let status = ormgen(dir.path())
        .arg(fixture_path())
        .arg("--config")
        .arg(&config)
        .arg("--log-json")
        .status()
        .expect("run ormgen");
    assert!(status.success());

    let wire = fs::read_to_string(dir.path().join("out/sales.proto")).expect("wire");
    assert!(wire.lines().any(|line| line == "package sales;"));
    assert!(dir.path().join("out/sales.rs").exists());
}

#[test]
fn invalid_schema_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = dir.path().join("broken.json");
    let contents = fs::read_to_string(fixture_path())
        .expect("fixture")
        .replace("\"BINARY_FLOAT\"", "\"SDO_GEOMETRY\"");
    fs::write(&schema, contents).expect("write schema");

    let output = ormgen(dir.path()).arg(&schema).output().expect("run ormgen");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("SDO_GEOMETRY"));
    assert!(!dir.path().join("generated").exists());
}
