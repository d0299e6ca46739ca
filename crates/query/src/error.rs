//! Query error types.

use detlsh_encoding::EncodingError;
use detlsh_lsh::LshError;
use detlsh_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Hash family error: {0}")]
    Lsh(#[from] LshError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot build an index from an empty dataset")]
    EmptyDataset,

    #[error("Projection space {0} has an empty tree")]
    EmptyIndex(usize),

    #[error("No answer after {passes} radius expansions (last radius {radius}, {candidates} candidates)")]
    IterationCapExceeded {
        passes: usize,
        radius: f32,
        candidates: usize,
    },

    #[error("Query cancelled")]
    Cancelled,
}

pub type QueryResult<T> = Result<T, QueryError>;
