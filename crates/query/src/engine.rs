//! Query execution engine.

use crate::candidates::CandidateSet;
use crate::config::{coded_radius, C2KAnnParams, RcAnnParams};
use crate::error::{QueryError, QueryResult};
use crate::index::DeIndex;
use detlsh_core::{Neighbor, Position};
use detlsh_tree::TreeError;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag for stopping a running c²-k-ANN query between passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Answers (r,c)-ANN and c²-k-ANN queries over a shared index.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<DeIndex>,
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(index: Arc<DeIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &DeIndex {
        &self.index
    }

    /// (r,c)-ANN: a point within `c * r` of `query`, or `None`.
    ///
    /// Spaces are searched in order with coded radius `epsilon * r`. After
    /// each space the query stops when the candidate budget `beta * n + 1` is
    /// reached (returning the closest candidate) or when some candidate lies
    /// within `c * r` (returning the closest such candidate).
    pub fn rc_ann(&self, query: &[f32], params: &RcAnnParams) -> QueryResult<Option<Neighbor>> {
        params.validate()?;
        self.index.check_query(query)?;

        let budget = params.candidate_fraction * self.index.len() as f32 + 1.0;
        let accept = params.approximation_ratio * params.radius;
        let radius = coded_radius(params.radius, params.radius_scale);
        let mut candidates = CandidateSet::new();

        for space in 0..self.index.num_spaces() {
            let positions = self.space_candidates(query, space, radius)?;
            candidates.extend(&positions, |p| self.index.distance(query, p));

            if candidates.len() as f32 >= budget {
                tracing::debug!(
                    "(r,c)-ANN: candidate budget reached in space {} ({} candidates)",
                    space,
                    candidates.len()
                );
                return Ok(candidates.closest());
            }
            if let Some(hit) = candidates.closest_within(accept) {
                tracing::debug!("(r,c)-ANN: answer within c*r found in space {}", space);
                return Ok(Some(hit));
            }
        }

        Ok(None)
    }

    /// c²-k-ANN: `k` approximate nearest neighbors, ascending by distance.
    pub fn c2_k_ann(&self, query: &[f32], params: &C2KAnnParams) -> QueryResult<Vec<Neighbor>> {
        self.run_c2_k_ann(query, params, None)
    }

    /// [`QueryEngine::c2_k_ann`] that checks `cancel` before every pass.
    pub fn c2_k_ann_cancellable(
        &self,
        query: &[f32],
        params: &C2KAnnParams,
        cancel: &CancelToken,
    ) -> QueryResult<Vec<Neighbor>> {
        self.run_c2_k_ann(query, params, Some(cancel))
    }

    /// Radius expansion: each pass queries all L trees in parallel with coded
    /// radius `epsilon * r`, then returns the `k` closest candidates once
    /// there are at least `beta * n + k` candidates or `k` of them lie within
    /// `c * r`. Otherwise `r` grows by `c`.
    fn run_c2_k_ann(
        &self,
        query: &[f32],
        params: &C2KAnnParams,
        cancel: Option<&CancelToken>,
    ) -> QueryResult<Vec<Neighbor>> {
        params.validate(self.index.len())?;
        self.index.check_query(query)?;

        let k = params.k;
        let c = params.approximation_ratio;
        let budget = params.candidate_fraction * self.index.len() as f32 + k as f32;
        let mut radius = params.initial_radius;
        let mut candidates = CandidateSet::new();

        for pass in 1..=params.max_expansions {
            if cancel.map_or(false, CancelToken::is_cancelled) {
                return Err(QueryError::Cancelled);
            }

            let coded = coded_radius(radius, params.radius_scale);
            let per_space = (0..self.index.num_spaces())
                .into_par_iter()
                .map(|space| self.space_candidates(query, space, coded))
                .collect::<QueryResult<Vec<_>>>()?;
            for positions in &per_space {
                candidates.extend(positions, |p| self.index.distance(query, p));
            }

            tracing::debug!(
                "c2-k-ANN pass {}: radius={}, coded radius={}, {} candidates",
                pass,
                radius,
                coded,
                candidates.len()
            );

            if candidates.len() as f32 >= budget || candidates.count_within(c * radius) >= k {
                return Ok(candidates.k_smallest(k));
            }

            if pass < params.max_expansions {
                radius *= c;
            }
        }

        tracing::warn!(
            "c2-k-ANN gave up after {} passes at radius {} with {} candidates",
            params.max_expansions,
            radius,
            candidates.len()
        );
        Err(QueryError::IterationCapExceeded {
            passes: params.max_expansions,
            radius,
            candidates: candidates.len(),
        })
    }

    /// Range query in one space. An empty tree contributes no candidates.
    fn space_candidates(&self, query: &[f32], space: usize, radius: u32) -> QueryResult<Vec<Position>> {
        let code = self.index.encode_query(query, space)?;
        match self.index.forest().range_query(space, &code, radius) {
            Ok(positions) => Ok(positions),
            Err(TreeError::EmptyIndex) => {
                tracing::warn!("{}", QueryError::EmptyIndex(space));
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
