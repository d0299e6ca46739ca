//! One DE-Tree per projection space.

use crate::error::{TreeError, TreeResult};
use crate::{DeTree, TreeParams, TreeStats};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// L DE-Trees, built once and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeForest {
    trees: Vec<DeTree>,
}

impl DeForest {
    /// Build one tree per space in parallel.
    ///
    /// `spaces[i]` holds the flattened codes of every point in space `i`.
    pub fn build(spaces: &[&[u8]], num_hashes: usize, params: &TreeParams) -> TreeResult<Self> {
        params.validate()?;
        if spaces.is_empty() {
            return Err(TreeError::InvalidParams(
                "a forest needs at least one space".into(),
            ));
        }

        let trees = spaces
            .par_iter()
            .map(|codes| DeTree::build(codes, num_hashes, params))
            .collect::<TreeResult<Vec<_>>>()?;

        let degenerate: usize = trees
            .iter()
            .map(|t| t.report().degenerate_splits.len())
            .sum();
        tracing::info!(
            "Built DE-Forest: {} trees, {} total nodes, {} degenerate leaves",
            trees.len(),
            trees.iter().map(|t| t.num_nodes()).sum::<usize>(),
            degenerate
        );

        Ok(Self { trees })
    }

    /// Wrap already built trees.
    pub fn from_trees(trees: Vec<DeTree>) -> Self {
        Self { trees }
    }

    pub fn num_spaces(&self) -> usize {
        self.trees.len()
    }

    /// Tree of one space.
    pub fn tree(&self, space: usize) -> TreeResult<&DeTree> {
        self.trees.get(space).ok_or(TreeError::InvalidSpace {
            space,
            num_spaces: self.trees.len(),
        })
    }

    pub fn trees(&self) -> &[DeTree] {
        &self.trees
    }

    /// Range query in one space.
    ///
    /// Fails with [`TreeError::EmptyIndex`] when that space's tree holds no
    /// entries.
    pub fn range_query(&self, space: usize, query: &[u8], radius: u32) -> TreeResult<Vec<usize>> {
        let tree = self.tree(space)?;
        if tree.is_empty() {
            return Err(TreeError::EmptyIndex);
        }
        tree.range_query(query, radius)
    }

    /// Per-tree statistics.
    pub fn stats(&self) -> Vec<TreeStats> {
        self.trees.iter().map(DeTree::stats).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_forest() {
        let a: Vec<u8> = (0..30u8).flat_map(|i| [i % 5, i % 7]).collect();
        let b: Vec<u8> = (0..30u8).flat_map(|i| [i % 3, i % 11]).collect();
        let forest = DeForest::build(&[a.as_slice(), b.as_slice()], 2, &TreeParams::new(4)).unwrap();

        assert_eq!(forest.num_spaces(), 2);
        assert_eq!(forest.tree(0).unwrap().len(), 30);
        assert_eq!(forest.stats().len(), 2);
        assert!(matches!(
            forest.tree(2),
            Err(TreeError::InvalidSpace { space: 2, num_spaces: 2 })
        ));

        let hits = forest.range_query(1, &[0, 0], 0).unwrap();
        assert!(hits.contains(&0));
    }

    #[test]
    fn test_empty_space_reports_empty_index() {
        let empty: Vec<u8> = Vec::new();
        let forest = DeForest::build(&[empty.as_slice()], 3, &TreeParams::new(4)).unwrap();
        assert_eq!(forest.range_query(0, &[0, 0, 0], 5), Err(TreeError::EmptyIndex));
    }

    #[test]
    fn test_no_spaces_rejected() {
        assert!(DeForest::build(&[], 2, &TreeParams::new(4)).is_err());
    }
}
