//! Error types for Trueno-Preview
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-Preview error types
#[derive(Error, Debug)]
pub enum Error {
    /// Slot index skips ahead of the contiguous fill
    #[error("Invalid preview index {index}: collection has {len} slots, so the index must be <= {len}")]
    InvalidIndex {
        /// Requested slot index
        index: usize,
        /// Number of slots at the time of the call
        len: usize,
    },

    /// Measurement names disagree with the collection contract
    #[error("Measurement name mismatch: all previews must provide {expected:?}, got {found:?}")]
    ContractMismatch {
        /// Contract established by the first non-empty preview
        expected: Vec<String>,
        /// Names offered by the rejected preview
        found: Vec<String>,
    },

    /// Entry access on a collection without children
    #[error("Preview collection is empty: set at least one preview before reading entries")]
    EmptyCollection,

    /// Entry index beyond the available entries
    #[error("Entry index {index} out of range: preview has {len} entries")]
    EntryOutOfRange {
        /// Requested entry index
        index: usize,
        /// Number of available entries
        len: usize,
    },

    /// Leaf row width disagrees with the measurement names
    #[error("Row {row} has {found} values but {expected} measurement names were given")]
    RowLength {
        /// Offending row index
        row: usize,
        /// Number of measurement names
        expected: usize,
        /// Number of values in the row
        found: usize,
    },

    /// Mean aggregation over nested collections needs parameter values
    #[error("Cannot average folds: the collection has no varied parameter values")]
    MissingVariedParameter,

    /// Invalid collection configuration
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
