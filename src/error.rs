use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading, normalizing, combining, or writing tables.
///
/// `NotFound`, `UnsupportedFormat` and `SchemaCollision` are the expected
/// failure modes. Everything else falls into the unexpected class (see
/// [`MergeError::is_unexpected`]).
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(
        "Unsupported file type: {extension} ({}). Supported types: {}",
        path.display(),
        crate::io_utils::SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Column '{column}' is produced by more than one source header: {}", sources.join(", "))]
    SchemaCollision {
        column: String,
        sources: Vec<String>,
    },

    #[error("Malformed input {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MergeError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MergeError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_unexpected(&self) -> bool {
        !matches!(
            self,
            MergeError::NotFound { .. }
                | MergeError::UnsupportedFormat { .. }
                | MergeError::SchemaCollision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
