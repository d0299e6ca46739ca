//! DE-Tree partition trees over encoded LSH codes for detlsh.
//!
//! A DE-Tree indexes the encoded codes of one projection space. Leaves hold
//! up to `max_leaf_size` (code, position) entries; internal nodes split on a
//! single hashed dimension at the median bucket value. Range queries prune
//! with admissible coded-distance bounds, so they return exactly the entries
//! within the radius.
//!
//! # Example
//! ```ignore
//! use detlsh_tree::{DeForest, DeTree, TreeParams};
//!
//! let tree = DeTree::build(&encoded.codes, num_hashes, &TreeParams::new(32))?;
//! let positions = tree.range_query(&query_code, 4)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod forest;
pub mod node;
pub mod search;

pub use config::TreeParams;
pub use error::{TreeError, TreeResult};
pub use forest::DeForest;
pub use node::{BuildReport, DegenerateSplit, Leaf, Node, NodeId};
pub use search::LeafBounds;

use detlsh_core::CodeMetric;
use serde::{Deserialize, Serialize};

/// A single DE-Tree stored as an arena of nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeTree {
    /// Code length (K).
    pub(crate) num_hashes: usize,

    pub(crate) params: TreeParams,

    /// All nodes; children are referenced by index.
    pub(crate) nodes: Vec<Node>,

    pub(crate) root: NodeId,

    /// Number of inserted entries.
    pub(crate) len: usize,

    pub(crate) report: BuildReport,
}

/// Shape statistics of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub entries: usize,
    /// Longest root-to-leaf path, counted in edges.
    pub depth: usize,
    pub max_leaf_size: usize,
    pub degenerate_leaves: usize,
}

impl DeTree {
    /// Create an empty tree: a single empty leaf.
    pub fn new(num_hashes: usize, params: TreeParams) -> TreeResult<Self> {
        params.validate()?;
        if num_hashes == 0 {
            return Err(TreeError::InvalidParams("num_hashes must be > 0".into()));
        }

        Ok(Self {
            num_hashes,
            params,
            nodes: vec![Node::Leaf(Leaf::default())],
            root: NodeId(0),
            len: 0,
            report: BuildReport::default(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn metric(&self) -> CodeMetric {
        self.params.metric
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Warnings recorded while building.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Leaf ids in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Compute shape statistics.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            nodes: self.nodes.len(),
            entries: self.len,
            ..Default::default()
        };

        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            stats.depth = stats.depth.max(depth);
            match &self.nodes[id.index()] {
                Node::Leaf(leaf) => {
                    stats.leaves += 1;
                    stats.max_leaf_size = stats.max_leaf_size.max(leaf.len());
                    if leaf.degenerate {
                        stats.degenerate_leaves += 1;
                    }
                }
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }

        stats
    }
}
