//! Unified configuration for building and querying a detlsh index.
//!
//! `DetLshConfig` groups everything needed to build an index (hash family,
//! breakpoints, tree shape) and the default query-time parameters. The
//! individual crates take their own narrower parameter structs; the query
//! crate converts these settings into them.

use crate::metric::CodeMetric;
use serde::{Deserialize, Serialize};

/// Master configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetLshConfig {
    /// Index construction settings.
    #[serde(default)]
    pub index: IndexSettings,

    /// Default query parameters.
    #[serde(default)]
    pub query: QuerySettings,
}

/// Index construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Hash functions per projection space (K).
    pub num_hashes: usize,

    /// Number of projection spaces, one tree each (L).
    pub num_spaces: usize,

    /// LSH bucket width (w).
    pub bucket_width: f32,

    /// Sample size used to select breakpoints (ns).
    pub sample_size: usize,

    /// Regions per hashed dimension (Nr). At most 256; powers of two are
    /// selected faster.
    pub num_regions: usize,

    /// Leaf capacity before a split is attempted.
    pub max_leaf_size: usize,

    /// Distance between encoded codes used for tree pruning.
    pub code_metric: CodeMetric,

    /// Random seed for reproducible builds.
    pub seed: Option<u64>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            num_hashes: 8,
            num_spaces: 4,
            bucket_width: 4.0,
            sample_size: 1024,
            num_regions: 16,
            max_leaf_size: 32,
            code_metric: CodeMetric::Manhattan,
            seed: None,
        }
    }
}

/// Default query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Approximation ratio (c > 1). Also the radius growth factor of c²-k-ANN.
    pub approximation_ratio: f32,

    /// Starting radius of c²-k-ANN, and the radius of (r,c)-ANN.
    pub initial_radius: f32,

    /// Scale from true radius to coded search radius (epsilon).
    pub radius_scale: f32,

    /// Candidate budget as a fraction of the dataset (beta).
    pub candidate_fraction: f32,

    /// Number of neighbors returned by c²-k-ANN.
    pub top_k: usize,

    /// Maximum radius expansions of c²-k-ANN before giving up.
    pub max_expansions: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            approximation_ratio: 1.5,
            initial_radius: 1.0,
            radius_scale: 1.0,
            candidate_fraction: 0.01,
            top_k: 10,
            max_expansions: 64,
        }
    }
}

impl DetLshConfig {
    /// More spaces and a larger candidate budget.
    pub fn high_recall() -> Self {
        Self {
            index: IndexSettings {
                num_spaces: 8,
                ..Default::default()
            },
            query: QuerySettings {
                candidate_fraction: 0.05,
                approximation_ratio: 1.2,
                ..Default::default()
            },
        }
    }

    /// Builder: fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.index.seed = Some(seed);
        self
    }

    /// Builder: choose the coded-distance metric.
    pub fn with_code_metric(mut self, metric: CodeMetric) -> Self {
        self.index.code_metric = metric;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let index = &self.index;
        if index.num_hashes == 0 || index.num_spaces == 0 {
            return Err("num_hashes and num_spaces must be > 0".to_string());
        }
        if !(index.bucket_width.is_finite() && index.bucket_width > 0.0) {
            return Err("bucket_width must be a positive number".to_string());
        }
        if index.sample_size == 0 {
            return Err("sample_size must be > 0".to_string());
        }
        if index.num_regions == 0 || index.num_regions > 256 {
            return Err("num_regions must be in [1, 256]".to_string());
        }
        if index.max_leaf_size == 0 {
            return Err("max_leaf_size must be > 0".to_string());
        }

        let query = &self.query;
        if !(query.approximation_ratio > 1.0) {
            return Err("approximation_ratio must be > 1".to_string());
        }
        if !(query.initial_radius > 0.0 && query.radius_scale > 0.0) {
            return Err("initial_radius and radius_scale must be > 0".to_string());
        }
        if query.candidate_fraction < 0.0 {
            return Err("candidate_fraction must be >= 0".to_string());
        }
        if query.top_k == 0 || query.max_expansions == 0 {
            return Err("top_k and max_expansions must be > 0".to_string());
        }

        Ok(())
    }
}
