//! Error types for ndmorph-core
//!
//! Provides a unified error type for the geometry and pixel buffer types.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// ndmorph-core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Region with an unusable shape for the requested operation
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Index outside the buffered region of an image
    #[error("index {index} outside region {region}")]
    IndexOutOfBounds { index: String, region: String },

    /// Pixel data length does not match the region size
    #[error("data length mismatch: expected {expected} pixels, got {actual}")]
    DataLengthMismatch { expected: usize, actual: usize },

    /// Requested region is not inside the buffered region
    #[error("requested region {requested} not inside buffered region {buffered}")]
    RequestedRegionOutside { requested: String, buffered: String },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for ndmorph-core operations
pub type Result<T> = std::result::Result<T, Error>;
