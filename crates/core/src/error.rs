//! Error types for HydroNet

use thiserror::Error;

/// Main error type for HydroNet operations.
///
/// These are whole-call failures: input contract violations detected before
/// any traversal begins, or a policy in
/// [`NetworkOptions`](crate::network::NetworkOptions) that turns a structural
/// warning into a hard failure. Per-node problems that the policy allows to
/// continue are reported as [`Diagnostics`](crate::network::Diagnostics)
/// instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {name}")]
    MissingColumn { name: String },

    #[error("Column '{name}' has an incompatible type: {reason}")]
    IncompatibleColumn { name: String, reason: String },

    #[error("Column length mismatch for '{name}': expected {expected}, got {actual}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid identifier at row {row}: {reason}")]
    InvalidIdentifier { row: usize, reason: String },

    #[error("Identifier {id} is claimed by {count} rows")]
    DuplicateIdentifier { id: String, count: usize },

    #[error("Invalid weight in column '{column}' at row {row}: {value}")]
    InvalidWeight {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("Missing weight in column '{column}' for node {id}")]
    MissingWeight { column: String, id: String },

    #[error("Cycle detected through nodes [{}]", .ids.join(", "))]
    CycleDetected { ids: Vec<String> },

    #[error("Unable to determine flow direction for segment {segment}: {reason}")]
    FlowDirection { segment: String, reason: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for HydroNet operations
pub type Result<T> = std::result::Result<T, Error>;
