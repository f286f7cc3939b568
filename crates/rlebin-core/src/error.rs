//! Error types for rlebin-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Size and dimensionality problems are reported before any row is
//! processed; bounds problems are reported at the point of access and are
//! never clamped.

use thiserror::Error;

/// rlebin-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive or unrepresentable array dimensions
    #[error("invalid array dimensions: {0:?}")]
    InvalidDimension(Vec<u32>),

    /// Position outside the array bounds
    #[error("position {pos:?} out of bounds for size {size:?}")]
    PositionOutOfBounds { pos: Vec<i32>, size: Vec<u32> },

    /// Number of coordinates does not match the array dimensionality
    #[error("dimensionality mismatch: expected {expected}, got {actual}")]
    DimensionalityMismatch { expected: usize, actual: usize },

    /// Two arrays of different shape were combined
    #[error("incompatible array sizes: {0:?} vs {1:?}")]
    IncompatibleSizes(Vec<u32>, Vec<u32>),

    /// Run with start after end
    #[error("invalid run: start {start} > end {end}")]
    InvalidRun { start: i32, end: i32 },

    /// Row content that is not in canonical (sorted, merged) form
    #[error("non-canonical row: {0}")]
    NonCanonicalRow(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized data could not be decoded
    #[error("decode error: {0}")]
    DecodeError(String),
}

/// Result type alias for rlebin-core operations
pub type Result<T> = std::result::Result<T, Error>;
