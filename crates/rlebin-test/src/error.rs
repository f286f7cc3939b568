//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building fixtures or references
#[derive(Debug, Error)]
pub enum TestError {
    /// Error from the array layer
    #[error("array error: {0}")]
    Core(#[from] rlebin_core::Error),

    /// Fixture or reference parameters are unusable
    #[error("invalid test parameter: {0}")]
    InvalidParameter(String),

    /// Arrays of different shape handed to a reference operator
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<u32>, Vec<u32>),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
