use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input not found: {} (place the registry extract there and re-run the pipeline)", .path.display())]
    SourceMissing { path: PathBuf },

    #[error("could not decode {} with any configured encoding ({tried}): {source}", .path.display())]
    Decode {
        path: PathBuf,
        tried: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("schema mismatch: required columns missing after renaming: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Failures on the consumer side of the artifact contract.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("artifact not found: {} (run the pipeline first to produce it)", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("artifact schema violation: missing columns: {}", .missing.join(", "))]
    SchemaViolation { missing: Vec<String> },

    #[error("artifact column `{column}` has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
