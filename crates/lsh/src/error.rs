//! LSH error types.

use thiserror::Error;

/// Hash family errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LshError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Projection space {space} out of range (family has {num_spaces})")]
    InvalidSpace { space: usize, num_spaces: usize },
}

pub type LshResult<T> = Result<T, LshError>;
