//! Ingestion errors.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems while reading a trajectory log.
///
/// Incomplete timesteps are not errors; they are dropped during alignment.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no NAME header line found before the first data row")]
    MissingHeader,
    #[error("header has no `{column}` column")]
    MissingColumn { column: &'static str },
    #[error("line {line}: missing value for column `{column}`")]
    MissingField { line: usize, column: String },
    #[error("line {line}: column `{column}` is not a number: {value:?}")]
    Malformed {
        line: usize,
        column: String,
        value: String,
    },
    #[error("line {line}: repeat-identifier placeholder with no previous row")]
    OrphanPlaceholder { line: usize },
}

pub type Result<T> = std::result::Result<T, IngestError>;
