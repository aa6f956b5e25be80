mod logging;
mod output;
mod settings;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use ormgen_core::SchemaDocument;
use ormgen_emit::{EmitError, render};
use thiserror::Error;

use output::{StagedFile, write_all_or_nothing};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid output path: {0}")]
    InvalidOutput(PathBuf),
    #[error("schema error: {0}")]
    Core(#[from] ormgen_core::Error),
    #[error("render error: {0}")]
    Emit(#[from] EmitError),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "ormgen",
    version,
    about = "Generate a Rust data model and proto3 schema from a database schema description"
)]
struct Cli {
    /// Schema description (JSON) to generate from.
    #[arg(value_name = "SCHEMA_PATH")]
    schema_path: PathBuf,
    /// TOML file overriding the generator settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(cli.log_json).map_err(CliError::Logging) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "run_failed", error = %err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let timer = Instant::now();
    tracing::info!(event = "run_started", schema = %cli.schema_path.display());

    let config = settings::load_config(cli.config.as_deref())?;
    tracing::info!(
        event = "config_loaded",
        source = cli
            .config
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    let content = std::fs::read_to_string(&cli.schema_path).map_err(|source| CliError::Read {
        path: cli.schema_path.clone(),
        source,
    })?;
    let document = SchemaDocument::from_json_str(&content)?;
    tracing::info!(event = "schema_loaded", tables = document.tables().count());

    let artifacts = render(&document, &config)?;

    write_all_or_nothing(&[
        StagedFile {
            path: &config.model_output,
            contents: &artifacts.model,
        },
        StagedFile {
            path: &config.wire_output,
            contents: &artifacts.wire_schema,
        },
    ])?;

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
    Ok(())
}
