//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// A test image could not be built
    #[error("failed to build test image: {0}")]
    ImageBuild(#[from] ndmorph_core::Error),

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Image comparison failed
    #[error("image comparison failed at index {index}: {detail}")]
    ImageMismatch { index: usize, detail: String },

    /// One or more comparisons of a regression test failed
    #[error("{test}_reg failed {count} comparison(s)")]
    Failed { test: String, count: usize },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
