//! Hash family parameters.

use crate::error::{LshError, LshResult};
use serde::{Deserialize, Serialize};

/// Parameters for generating a hash family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LshParams {
    /// Hash functions per projection space (K).
    pub num_hashes: usize,

    /// Number of independent projection spaces (L).
    pub num_spaces: usize,

    /// Input vector dimension (d).
    pub dim: usize,

    /// Bucket width (w). Larger widths make nearby points collide more often.
    pub bucket_width: f32,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl LshParams {
    /// Create parameters without a fixed seed.
    pub fn new(num_hashes: usize, num_spaces: usize, dim: usize, bucket_width: f32) -> Self {
        Self {
            num_hashes,
            num_spaces,
            dim,
            bucket_width,
            seed: None,
        }
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> LshResult<()> {
        if self.num_hashes == 0 {
            return Err(LshError::InvalidParams("num_hashes (K) must be > 0".into()));
        }
        if self.num_spaces == 0 {
            return Err(LshError::InvalidParams("num_spaces (L) must be > 0".into()));
        }
        if self.dim == 0 {
            return Err(LshError::InvalidParams("dim (d) must be > 0".into()));
        }
        if !(self.bucket_width.is_finite() && self.bucket_width > 0.0) {
            return Err(LshError::InvalidParams(format!(
                "bucket_width (w) must be a positive number, got {}",
                self.bucket_width
            )));
        }
        Ok(())
    }
}
