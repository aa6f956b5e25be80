use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{EmitError, Result};

pub const DEFAULT_MODEL_OUTPUT: &str = "generated/model.rs";
pub const DEFAULT_WIRE_OUTPUT: &str = "generated/orm.proto";
pub const DEFAULT_PROTO_PACKAGE: &str = "ormgen.data";
pub const DEFAULT_SERVICE_NAME: &str = "Orm";
pub const DEFAULT_PROTO_MODULE: &str = "crate::proto";
pub const DEFAULT_SUPPORT_MODULE: &str = "crate::orm";
pub const DEFAULT_SHARED_IMPORT: &str = "shared.proto";

/// Options for the emitters and the output writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path of the generated model source.
    pub model_output: PathBuf,
    /// Path of the generated proto3 schema.
    pub wire_output: PathBuf,
    /// Package declared by the proto3 schema.
    pub proto_package: String,
    /// Name of the single service gathering every table's RPCs.
    pub service_name: String,
    /// Rust path of the module holding the compiled wire messages.
    pub proto_module: String,
    /// Rust path of the module providing `Related`, `TableAccessor` and the
    /// composite conversions.
    pub support_module: String,
    /// Proto files imported for the shared composite messages.
    pub shared_imports: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_output: PathBuf::from(DEFAULT_MODEL_OUTPUT),
            wire_output: PathBuf::from(DEFAULT_WIRE_OUTPUT),
            proto_package: DEFAULT_PROTO_PACKAGE.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            proto_module: DEFAULT_PROTO_MODULE.to_string(),
            support_module: DEFAULT_SUPPORT_MODULE.to_string(),
            shared_imports: vec![DEFAULT_SHARED_IMPORT.to_string()],
        }
    }
}

impl GeneratorConfig {
    /// Reject settings that would render an unusable document.
    pub fn validate(&self) -> Result<()> {
        if self.model_output == self.wire_output {
            return Err(EmitError::InvalidConfig(
                "model_output and wire_output must differ".to_string(),
            ));
        }
        if !self.proto_package.split('.').all(is_identifier) {
            return Err(EmitError::InvalidConfig(format!(
                "invalid proto_package: {}",
                self.proto_package
            )));
        }
        if !is_identifier(&self.service_name) {
            return Err(EmitError::InvalidConfig(format!(
                "invalid service_name: {}",
                self.service_name
            )));
        }
        for path in [&self.proto_module, &self.support_module] {
            if !path.split("::").all(is_identifier) {
                return Err(EmitError::InvalidConfig(format!(
                    "invalid module path: {path}"
                )));
            }
        }
        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
