//! Index build pipeline.
//!
//! vectors → projection (L spaces × K hashes) → sampled breakpoints →
//! encoded codes → one DE-Tree per space.

use crate::error::{QueryError, QueryResult};
use detlsh_core::{l2_distance, IndexSettings, Position};
use detlsh_encoding::{encode_code, encode_dataset, BreakpointTable, EncodingParams};
use detlsh_lsh::{HashFamily, LshParams};
use detlsh_tree::{DeForest, TreeParams, TreeStats};
use std::time::Instant;

/// Everything needed to answer queries over one dataset.
///
/// Built once; a changed dataset needs a new index.
#[derive(Debug)]
pub struct DeIndex {
    vectors: Vec<Vec<f32>>,
    dim: usize,
    settings: IndexSettings,
    family: HashFamily,
    breakpoints: BreakpointTable,
    forest: DeForest,
}

impl DeIndex {
    /// Build an index over `vectors`. Positions are indices into `vectors`.
    pub fn build(vectors: Vec<Vec<f32>>, settings: &IndexSettings) -> QueryResult<Self> {
        let dim = vectors.first().map(Vec::len).ok_or(QueryError::EmptyDataset)?;
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(QueryError::DimensionMismatch {
                expected: dim,
                got: bad.len(),
            });
        }

        let start = Instant::now();
        tracing::info!(
            "Building index: {} vectors, dim={}, L={}, K={}, Nr={}",
            vectors.len(),
            dim,
            settings.num_spaces,
            settings.num_hashes,
            settings.num_regions
        );

        let mut lsh_params = LshParams::new(
            settings.num_hashes,
            settings.num_spaces,
            dim,
            settings.bucket_width,
        );
        let mut encoding_params = EncodingParams::new(settings.sample_size, settings.num_regions);
        if let Some(seed) = settings.seed {
            lsh_params = lsh_params.with_seed(seed);
            encoding_params = encoding_params.with_seed(seed.wrapping_add(1));
        }
        let tree_params = TreeParams::new(settings.max_leaf_size).with_metric(settings.code_metric);
        lsh_params.validate()?;
        encoding_params.validate()?;
        tree_params.validate()?;

        let family = HashFamily::new(&lsh_params)?;
        let projected = family.project_all(&vectors)?;
        tracing::info!("Projected dataset in {:?}", start.elapsed());

        let stage = Instant::now();
        let breakpoints = BreakpointTable::select(&projected, &encoding_params)?;
        let encoded = encode_dataset(&projected, &breakpoints)?;
        drop(projected);
        tracing::info!("Selected breakpoints and encoded in {:?}", stage.elapsed());

        let stage = Instant::now();
        let spaces: Vec<&[u8]> = encoded.iter().map(|s| s.codes.as_slice()).collect();
        let forest = DeForest::build(&spaces, settings.num_hashes, &tree_params)?;
        tracing::info!("Built {} trees in {:?}", forest.num_spaces(), stage.elapsed());

        tracing::info!("Index ready in {:?}", start.elapsed());

        Ok(Self {
            vectors,
            dim,
            settings: settings.clone(),
            family,
            breakpoints,
            forest,
        })
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_spaces(&self) -> usize {
        self.forest.num_spaces()
    }

    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn vector(&self, position: Position) -> Option<&[f32]> {
        self.vectors.get(position).map(Vec::as_slice)
    }

    pub fn family(&self) -> &HashFamily {
        &self.family
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    pub fn forest(&self) -> &DeForest {
        &self.forest
    }

    pub fn tree_stats(&self) -> Vec<TreeStats> {
        self.forest.stats()
    }

    /// True distance from `query` to an indexed vector.
    #[inline]
    pub fn distance(&self, query: &[f32], position: Position) -> f32 {
        l2_distance(query, &self.vectors[position])
    }

    /// Encoded code of `query` in one space: projected with that space's hash
    /// functions, then bucketed with that space's breakpoints.
    pub fn encode_query(&self, query: &[f32], space: usize) -> QueryResult<Vec<u8>> {
        self.check_query(query)?;
        let projected = self.family.project(query, space)?;
        Ok(encode_code(&projected, &self.breakpoints, space)?)
    }

    pub(crate) fn check_query(&self, query: &[f32]) -> QueryResult<()> {
        if query.len() != self.dim {
            return Err(QueryError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }
        Ok(())
    }
}
