//! DE-Tree error types.

use thiserror::Error;

/// Tree construction and query errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Index is empty")]
    EmptyIndex,

    #[error("Projection space {space} out of range (forest has {num_spaces})")]
    InvalidSpace { space: usize, num_spaces: usize },
}

pub type TreeResult<T> = Result<T, TreeError>;
