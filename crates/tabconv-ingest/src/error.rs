//! Error types for table ingestion and conversion.

use std::path::PathBuf;

use tabconv_core::ConvertError;
use thiserror::Error;

/// Errors raised while reading, converting or writing tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === CSV Errors ===
    /// The csv reader failed on this file.
    #[error("failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The csv writer failed on this file.
    #[error("failed to write CSV {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Flushing the writer failed.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No delimiter was configured and the extension is neither `.csv` nor `.tsv`.
    #[error("unsupported table extension (expected .csv or .tsv): {path}")]
    UnsupportedExtension { path: PathBuf },

    /// The file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyTable { path: PathBuf },

    /// A header cell is blank.
    #[error("column {index} of {path} has no name")]
    UnnamedColumn { path: PathBuf, index: usize },

    /// Two header cells share a name.
    #[error("column '{column}' appears more than once in {path}")]
    DuplicateColumn { path: PathBuf, column: String },

    // === Conversion Errors ===
    /// The table options could not be applied to the profile.
    #[error("invalid profile configuration")]
    Config(#[source] ConvertError),

    /// Fitting the profile failed.
    #[error("failed to fit profile")]
    Fit(#[source] ConvertError),

    /// Converting one row failed.
    #[error("failed to convert row {row}")]
    Convert {
        row: usize,
        #[source]
        source: ConvertError,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
