//! Error types for ndmorph-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] ndmorph_core::Error),

    /// Anchor morphology was asked to run a kernel without a line decomposition
    #[error("anchor morphology only works with decomposable structuring elements")]
    NotDecomposable,

    /// A zero vector reached the line rasterizer
    #[error("degenerate line direction {0}")]
    DegenerateDirection(String),

    /// Invalid structuring element
    #[error("invalid structuring element: {0}")]
    InvalidKernel(String),

    /// Dimension of an argument does not match the image dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Engine or execution settings that can never run
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Invalid sequence format
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// Worker thread pool could not be created
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

impl MorphError {
    /// Whether the error comes from the filter configuration rather than the data
    ///
    /// Configuration errors are deterministic: rerunning without changing
    /// the structuring element or the settings cannot succeed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MorphError::NotDecomposable
                | MorphError::InvalidKernel(_)
                | MorphError::InvalidConfig(_)
        )
    }
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
