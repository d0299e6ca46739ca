//! Encoding error types.

use thiserror::Error;

/// Breakpoint selection and encoding errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Projection space {space} out of range (table has {num_spaces})")]
    InvalidSpace { space: usize, num_spaces: usize },

    #[error("Cannot select breakpoints from an empty sample")]
    EmptySample,

    #[error("Breakpoints must be non-decreasing with 2 to 257 entries")]
    InvalidBreakpoints,
}

pub type EncodingResult<T> = Result<T, EncodingError>;
