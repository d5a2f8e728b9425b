//! Error types for dsmviz

use thiserror::Error;

/// Result type alias for dsmviz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while shaping or rendering DSMs
///
/// All variants are detected eagerly at the start of the responsible
/// operation and carry the offending sizes; nothing is retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// A single DSM had more than two dimensions (or zero).
    #[error("invalid shape {shape:?} for DSM: expected 1-D condensed or 2-D square")]
    Shape { shape: Vec<usize> },

    /// A condensed vector length is not a triangular number n(n-1)/2.
    #[error("condensed DSM of length {len} does not correspond to a whole number of items")]
    Condensed { len: usize },

    /// A 2-D DSM was not square.
    #[error("DSM matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    /// The DSM tensor was not 3-dimensional.
    #[error("dsms have to be 3-dimensional [n_sensors, n_samples, n_entries], got shape {shape:?}")]
    TensorShape { shape: Vec<usize> },

    /// A count-paired input has a mismatched length.
    #[error("number of {what} ({got}) does not match the number of {against} ({expected})")]
    Arity {
        what: &'static str,
        against: &'static str,
        got: usize,
        expected: usize,
    },

    /// A time window is empty or extends past the time axis.
    #[error("invalid time window [{start}, {end}): start must be below end and end within {n_samples} samples")]
    Window {
        start: usize,
        end: usize,
        n_samples: usize,
    },

    /// Metadata or layout deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The drawing toolkit reported a failure while rasterizing.
    #[error("render error: {0}")]
    Render(String),
}
