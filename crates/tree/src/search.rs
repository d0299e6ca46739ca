//! Range queries with admissible lower and upper bounds.
//!
//! Every bound is measured with the tree's [`CodeMetric`]:
//! - a leaf's lower bound is the smallest distance from the query to any of
//!   its entries, its upper bound the largest;
//! - an internal node bounds only the child the query does not fall in, by the
//!   distance along the split dimension alone.
//!
//! Subtrees whose lower bound exceeds the radius are skipped; leaves whose
//! upper bound is within the radius are accepted whole.
//!
//! [`CodeMetric`]: detlsh_core::CodeMetric

use crate::error::{TreeError, TreeResult};
use crate::node::{Leaf, Node, NodeId};
use crate::DeTree;

/// Coded-distance bounds of one leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafBounds {
    pub lower: u32,
    pub upper: u32,
}

impl DeTree {
    /// Lower bound on the coded distance from `query` to the entries under `node`.
    ///
    /// Leaves return the exact minimum, or `u32::MAX` when empty. An internal
    /// node contains the query's own side of its split, so its bound is `0`;
    /// see [`DeTree::child_bounds`] for the per-child bounds used in pruning.
    pub fn lower_bound(&self, query: &[u8], node: NodeId) -> u32 {
        match &self.nodes[node.index()] {
            Node::Leaf(leaf) => self
                .scan_bounds(query, leaf)
                .map_or(u32::MAX, |b| b.lower),
            Node::Internal { .. } => 0,
        }
    }

    /// Upper bound on the coded distance from `query` to a leaf's entries.
    ///
    /// `None` for internal nodes and empty leaves.
    pub fn upper_bound(&self, query: &[u8], node: NodeId) -> Option<u32> {
        let leaf = self.nodes[node.index()].as_leaf()?;
        self.scan_bounds(query, leaf).map(|b| b.upper)
    }

    /// The two children of an internal node with their lower bounds.
    ///
    /// The child on the query's side of the split comes first with bound `0`;
    /// the other child carries the split-dimension gap.
    pub fn child_bounds(&self, query: &[u8], node: NodeId) -> Option<[(NodeId, u32); 2]> {
        match &self.nodes[node.index()] {
            Node::Internal {
                split_dim,
                threshold,
                left,
                right,
            } => {
                let q = query[*split_dim];
                let gap = self.params.metric.split_gap(q, *threshold);
                if q <= *threshold {
                    Some([(*left, 0), (*right, gap)])
                } else {
                    Some([(*right, 0), (*left, gap)])
                }
            }
            Node::Leaf(_) => None,
        }
    }

    /// Positions of all entries within coded distance `radius` of `query`.
    ///
    /// Traverses iteratively with an explicit stack. An empty tree yields an
    /// empty result.
    pub fn range_query(&self, query: &[u8], radius: u32) -> TreeResult<Vec<usize>> {
        self.check_query(query)?;

        let mut result = Vec::new();
        let mut stack = vec![(self.root, 0u32)];

        while let Some((id, bound)) = stack.pop() {
            if bound > radius {
                continue;
            }
            match &self.nodes[id.index()] {
                Node::Leaf(leaf) => self.collect_leaf(query, leaf, radius, &mut result),
                Node::Internal { .. } => {
                    if let Some([near, far]) = self.child_bounds(query, id) {
                        stack.push((far.0, bound.max(far.1)));
                        stack.push((near.0, bound.max(near.1)));
                    }
                }
            }
        }

        Ok(result)
    }

    /// Unpruned reference for [`DeTree::range_query`]: checks every entry.
    pub fn range_query_scan(&self, query: &[u8], radius: u32) -> TreeResult<Vec<usize>> {
        self.check_query(query)?;

        let metric = self.params.metric;
        let k = self.num_hashes;
        Ok(self
            .nodes
            .iter()
            .filter_map(Node::as_leaf)
            .flat_map(|leaf| leaf.entries(k))
            .filter(|(code, _)| metric.distance(query, code) <= radius)
            .map(|(_, position)| position)
            .collect())
    }

    fn collect_leaf(&self, query: &[u8], leaf: &Leaf, radius: u32, out: &mut Vec<usize>) {
        let Some(bounds) = self.scan_bounds(query, leaf) else {
            return;
        };
        if bounds.lower > radius {
            return;
        }
        if bounds.upper <= radius {
            out.extend_from_slice(&leaf.positions);
            return;
        }

        let metric = self.params.metric;
        out.extend(
            leaf.entries(self.num_hashes)
                .filter(|(code, _)| metric.distance(query, code) <= radius)
                .map(|(_, position)| position),
        );
    }

    /// Both leaf bounds in one pass. `None` for an empty leaf.
    fn scan_bounds(&self, query: &[u8], leaf: &Leaf) -> Option<LeafBounds> {
        let metric = self.params.metric;
        leaf.codes
            .chunks_exact(self.num_hashes)
            .map(|code| metric.distance(query, code))
            .fold(None, |acc: Option<LeafBounds>, d| {
                Some(match acc {
                    None => LeafBounds { lower: d, upper: d },
                    Some(b) => LeafBounds {
                        lower: b.lower.min(d),
                        upper: b.upper.max(d),
                    },
                })
            })
    }

    fn check_query(&self, query: &[u8]) -> TreeResult<()> {
        if query.len() != self.num_hashes {
            return Err(TreeError::DimensionMismatch {
                expected: self.num_hashes,
                got: query.len(),
            });
        }
        Ok(())
    }
}
