//! Pipeline error types.
//!
//! Only unrecoverable conditions live here. Join gaps and degenerate ratios
//! are not errors: they are resolved by the fill policies in [`crate::merge`]
//! and [`crate::scoring`] and surface as `warn!` events instead.

use std::path::PathBuf;

/// Fatal errors raised while loading sources, validating the grading
/// policy, or writing section tables.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input file absent or unreadable.
    #[error("failed to read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A column the downstream computation depends on is missing.
    #[error("{}: missing required column {column:?}", .path.display())]
    Schema { path: PathBuf, column: String },

    /// CSV-level failure that cannot be skipped (e.g. an unreadable header).
    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The grade weight table does not sum to 1.0.
    #[error("grade weights must sum to 1.0, got {sum}")]
    Weights { sum: f64 },

    /// The output directory could not be created.
    #[error("failed to create {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output table could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
