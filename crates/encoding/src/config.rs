//! Breakpoint selection parameters.

use crate::error::{EncodingError, EncodingResult};
use serde::{Deserialize, Serialize};

/// Largest region count that still fits a `u8` bucket index.
pub const MAX_REGIONS: usize = 256;

/// Parameters for selecting breakpoints and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingParams {
    /// Number of projected values sampled per hashed dimension (ns).
    /// All points are used when the dataset is smaller.
    pub sample_size: usize,

    /// Number of regions per hashed dimension (Nr).
    /// Powers of two select breakpoints by recursive halving.
    pub num_regions: usize,

    /// Random seed for the sample.
    pub seed: Option<u64>,
}

impl EncodingParams {
    pub fn new(sample_size: usize, num_regions: usize) -> Self {
        Self {
            sample_size,
            num_regions,
            seed: None,
        }
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> EncodingResult<()> {
        if self.sample_size == 0 {
            return Err(EncodingError::InvalidParams(
                "sample_size (ns) must be > 0".into(),
            ));
        }
        if self.num_regions == 0 || self.num_regions > MAX_REGIONS {
            return Err(EncodingError::InvalidParams(format!(
                "num_regions (Nr) must be in [1, {}], got {}",
                MAX_REGIONS, self.num_regions
            )));
        }
        Ok(())
    }
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self::new(1024, 16)
    }
}
