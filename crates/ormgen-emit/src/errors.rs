use thiserror::Error;

/// Errors emitted while rendering generated artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Core(#[from] ormgen_core::Error),
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
}

/// Result type for emit operations.
pub type Result<T> = std::result::Result<T, EmitError>;
