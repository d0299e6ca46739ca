//! Query parameters.

use crate::error::{QueryError, QueryResult};
use detlsh_core::QuerySettings;
use serde::{Deserialize, Serialize};

/// Parameters of an (r,c)-ANN query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcAnnParams {
    /// Search radius (r).
    pub radius: f32,

    /// Approximation ratio (c > 1); any point within `c * r` is an answer.
    pub approximation_ratio: f32,

    /// Scale from true radius to coded radius (epsilon).
    pub radius_scale: f32,

    /// Candidate budget as a fraction of the dataset (beta). The query stops
    /// once more than `beta * n` candidates were seen.
    pub candidate_fraction: f32,
}

impl RcAnnParams {
    pub fn new(radius: f32, approximation_ratio: f32) -> Self {
        let defaults = QuerySettings::default();
        Self {
            radius,
            approximation_ratio,
            radius_scale: defaults.radius_scale,
            candidate_fraction: defaults.candidate_fraction,
        }
    }

    pub fn with_radius_scale(mut self, epsilon: f32) -> Self {
        self.radius_scale = epsilon;
        self
    }

    pub fn with_candidate_fraction(mut self, beta: f32) -> Self {
        self.candidate_fraction = beta;
        self
    }

    pub fn validate(&self) -> QueryResult<()> {
        check_common(self.approximation_ratio, self.radius_scale, self.candidate_fraction)?;
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(QueryError::InvalidParams(format!(
                "radius (r) must be a positive number, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

impl From<&QuerySettings> for RcAnnParams {
    fn from(settings: &QuerySettings) -> Self {
        Self {
            radius: settings.initial_radius,
            approximation_ratio: settings.approximation_ratio,
            radius_scale: settings.radius_scale,
            candidate_fraction: settings.candidate_fraction,
        }
    }
}

/// Parameters of a c²-k-ANN query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct C2KAnnParams {
    /// Number of neighbors (k).
    pub k: usize,

    /// Approximation ratio (c > 1), also the radius growth factor.
    pub approximation_ratio: f32,

    /// Radius of the first pass (r_min).
    pub initial_radius: f32,

    /// Scale from true radius to coded radius (epsilon).
    pub radius_scale: f32,

    /// Candidate budget as a fraction of the dataset (beta).
    pub candidate_fraction: f32,

    /// Passes allowed before giving up.
    pub max_expansions: usize,
}

impl C2KAnnParams {
    pub fn new(k: usize) -> Self {
        let mut params = Self::from(&QuerySettings::default());
        params.k = k;
        params
    }

    pub fn with_approximation_ratio(mut self, c: f32) -> Self {
        self.approximation_ratio = c;
        self
    }

    pub fn with_initial_radius(mut self, r_min: f32) -> Self {
        self.initial_radius = r_min;
        self
    }

    pub fn with_radius_scale(mut self, epsilon: f32) -> Self {
        self.radius_scale = epsilon;
        self
    }

    pub fn with_candidate_fraction(mut self, beta: f32) -> Self {
        self.candidate_fraction = beta;
        self
    }

    pub fn with_max_expansions(mut self, passes: usize) -> Self {
        self.max_expansions = passes;
        self
    }

    /// Validate against a dataset of `n` points.
    pub fn validate(&self, n: usize) -> QueryResult<()> {
        check_common(self.approximation_ratio, self.radius_scale, self.candidate_fraction)?;
        if self.k == 0 || self.k > n {
            return Err(QueryError::InvalidParams(format!(
                "k must be in [1, {}], got {}",
                n, self.k
            )));
        }
        if !(self.initial_radius.is_finite() && self.initial_radius > 0.0) {
            return Err(QueryError::InvalidParams(format!(
                "initial_radius (r_min) must be a positive number, got {}",
                self.initial_radius
            )));
        }
        if self.max_expansions == 0 {
            return Err(QueryError::InvalidParams(
                "max_expansions must be > 0".into(),
            ));
        }
        Ok(())
    }
}

impl From<&QuerySettings> for C2KAnnParams {
    fn from(settings: &QuerySettings) -> Self {
        Self {
            k: settings.top_k,
            approximation_ratio: settings.approximation_ratio,
            initial_radius: settings.initial_radius,
            radius_scale: settings.radius_scale,
            candidate_fraction: settings.candidate_fraction,
            max_expansions: settings.max_expansions,
        }
    }
}

fn check_common(c: f32, epsilon: f32, beta: f32) -> QueryResult<()> {
    if !(c.is_finite() && c > 1.0) {
        return Err(QueryError::InvalidParams(format!(
            "approximation_ratio (c) must be > 1, got {}",
            c
        )));
    }
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(QueryError::InvalidParams(format!(
            "radius_scale (epsilon) must be > 0, got {}",
            epsilon
        )));
    }
    if !(beta.is_finite() && beta >= 0.0) {
        return Err(QueryError::InvalidParams(format!(
            "candidate_fraction (beta) must be >= 0, got {}",
            beta
        )));
    }
    Ok(())
}

/// Coded search radius for a true radius: `floor(epsilon * r)`, saturating.
#[inline]
pub fn coded_radius(radius: f32, radius_scale: f32) -> u32 {
    (radius * radius_scale).floor() as u32
}
