//! Error types for printmatch.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for printmatch operations.
pub type PrintMatchResult<T> = std::result::Result<T, PrintMatchError>;

/// Errors reported while normalizing, scoring, or enrolling images.
#[derive(Debug, Error, PartialEq)]
pub enum PrintMatchError {
    /// The input bytes are not a parseable image in a supported format.
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },
    /// The image could not be read from its source path.
    #[error("failed to read image {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
    /// Grids of different lengths reached the scorer.
    #[error("grid length mismatch: {left} vs {right} samples")]
    GridLenMismatch { left: usize, right: usize },
    /// Zero-length grids cannot be scored.
    #[error("cannot score zero-length grids")]
    EmptyGrid,
    /// A canonical dimension is zero or the sample count overflows.
    #[error("invalid canonical dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// A sample buffer does not match its declared dimensions.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    SampleCountMismatch { expected: usize, got: usize },
    /// The decision threshold is outside [0, 100].
    #[error("threshold {value} is outside [0, 100]")]
    InvalidThreshold { value: f64 },
    /// An id is already present in the registry.
    #[error("duplicate reference id: {id}")]
    DuplicateId { id: String },
}
