//! DE-Tree construction by insertion with median splits.

use crate::error::{TreeError, TreeResult};
use crate::node::{DegenerateSplit, Leaf, Node, NodeId};
use crate::{DeTree, TreeParams};

/// Split chosen for an overfull leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Split {
    dim: usize,
    threshold: u8,
    imbalance: usize,
}

impl DeTree {
    /// Build a tree from flattened codes, inserting them in position order.
    ///
    /// `codes` holds one code of `num_hashes` bucket indices per point; the
    /// point at offset `i * num_hashes` gets position `i`.
    pub fn build(codes: &[u8], num_hashes: usize, params: &TreeParams) -> TreeResult<Self> {
        let mut tree = Self::new(num_hashes, params.clone())?;
        if codes.len() % num_hashes != 0 {
            return Err(TreeError::DimensionMismatch {
                expected: num_hashes,
                got: codes.len() % num_hashes,
            });
        }

        for (position, code) in codes.chunks_exact(num_hashes).enumerate() {
            tree.insert(code, position)?;
        }

        tracing::debug!(
            "Built DE-Tree: {} entries, {} nodes, {} degenerate leaves",
            tree.len(),
            tree.num_nodes(),
            tree.report().degenerate_splits.len()
        );

        Ok(tree)
    }

    /// Insert one encoded code.
    ///
    /// The entry goes to the leaf reached by descending split decisions. If
    /// the leaf then exceeds `max_leaf_size` it is split, and any child still
    /// over capacity is split in turn.
    pub fn insert(&mut self, code: &[u8], position: usize) -> TreeResult<()> {
        if code.len() != self.num_hashes {
            return Err(TreeError::DimensionMismatch {
                expected: self.num_hashes,
                got: code.len(),
            });
        }

        let leaf_id = self.descend(code);
        let k = self.num_hashes;
        let needs_split = match &mut self.nodes[leaf_id.index()] {
            Node::Leaf(leaf) => {
                // A degenerate leaf only becomes splittable once a different code arrives.
                let retry = !leaf.degenerate || leaf.code(0, k) != code;
                leaf.push(code, position);
                retry && leaf.len() > self.params.max_leaf_size
            }
            Node::Internal { .. } => false,
        };
        self.len += 1;

        if needs_split {
            self.split_cascade(leaf_id);
        }
        Ok(())
    }

    /// Leaf that `code` belongs to.
    fn descend(&self, code: &[u8]) -> NodeId {
        let mut current = self.root;
        while let Node::Internal {
            split_dim,
            threshold,
            left,
            right,
        } = &self.nodes[current.index()]
        {
            current = if code[*split_dim] <= *threshold {
                *left
            } else {
                *right
            };
        }
        current
    }

    fn split_cascade(&mut self, start: NodeId) {
        let k = self.num_hashes;
        let max_size = self.params.max_leaf_size;
        // The flag marks leaves split off a degenerate parent; their identical
        // codes were already reported.
        let mut stack = vec![(start, false)];

        while let Some((id, inherited)) = stack.pop() {
            let leaf = match &mut self.nodes[id.index()] {
                Node::Leaf(leaf) if leaf.len() > max_size => leaf,
                _ => continue,
            };

            let Some(split) = choose_split(leaf, k) else {
                if !leaf.degenerate {
                    leaf.degenerate = true;
                    if inherited {
                        continue;
                    }
                    let entries = leaf.len();
                    tracing::warn!(
                        "Leaf {:?} holds {} identical codes and cannot be split (capacity {})",
                        id,
                        entries,
                        max_size
                    );
                    self.report
                        .degenerate_splits
                        .push(DegenerateSplit { node: id, entries });
                }
                continue;
            };

            let leaf = std::mem::take(leaf);
            let inherited = inherited || leaf.degenerate;
            let mut left = Leaf::default();
            let mut right = Leaf::default();
            for (code, position) in leaf.entries(k) {
                if code[split.dim] <= split.threshold {
                    left.push(code, position);
                } else {
                    right.push(code, position);
                }
            }

            let left_id = self.push_node(Node::Leaf(left));
            let right_id = self.push_node(Node::Leaf(right));
            self.nodes[id.index()] = Node::Internal {
                split_dim: split.dim,
                threshold: split.threshold,
                left: left_id,
                right: right_id,
            };

            stack.push((right_id, inherited));
            stack.push((left_id, inherited));
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

/// Pick the split dimension and threshold for a leaf.
///
/// Constant dimensions are skipped. The threshold is the median bucket value
/// (`sorted[len / 2]`), lowered to the largest value below the maximum when
/// the median is the maximum. The dimension with the most even partition
/// wins, ties going to the lowest dimension. Returns `None` when every
/// dimension is constant.
fn choose_split(leaf: &Leaf, num_hashes: usize) -> Option<Split> {
    let len = leaf.len();
    let mut column = Vec::with_capacity(len);
    let mut best: Option<Split> = None;

    for dim in 0..num_hashes {
        column.clear();
        column.extend(leaf.codes.chunks_exact(num_hashes).map(|code| code[dim]));
        column.sort_unstable();

        let min = column[0];
        let max = column[len - 1];
        if min == max {
            continue;
        }

        let mut threshold = column[len / 2];
        if threshold == max {
            let below_max = column.partition_point(|&v| v < max);
            threshold = column[below_max - 1];
        }

        let left = column.partition_point(|&v| v <= threshold);
        let imbalance = left.abs_diff(len - left);
        if best.map_or(true, |b| imbalance < b.imbalance) {
            best = Some(Split {
                dim,
                threshold,
                imbalance,
            });
        }
    }

    best
}
