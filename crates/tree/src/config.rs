//! DE-Tree configuration.

use crate::error::{TreeError, TreeResult};
use detlsh_core::CodeMetric;
use serde::{Deserialize, Serialize};

/// Parameters for building DE-Trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Leaf capacity. A leaf holding more entries is split unless every
    /// entry carries the same code.
    pub max_leaf_size: usize,

    /// Coded distance used for bounds and range queries.
    #[serde(default)]
    pub metric: CodeMetric,
}

impl TreeParams {
    pub fn new(max_leaf_size: usize) -> Self {
        Self {
            max_leaf_size,
            metric: CodeMetric::default(),
        }
    }

    /// Set the coded-distance metric.
    pub fn with_metric(mut self, metric: CodeMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> TreeResult<()> {
        if self.max_leaf_size == 0 {
            return Err(TreeError::InvalidParams(
                "max_leaf_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new(32)
    }
}
