use std::path::Path;

use ormgen_emit::GeneratorConfig;

use crate::CliError;

/// Load generator settings, falling back to the built-in defaults when no
/// config file was given.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, CliError> {
    let Some(path) = path else {
        return Ok(GeneratorConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    Ok(config)
}
