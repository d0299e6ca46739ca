//! DE-Tree arena nodes.

use serde::{Deserialize, Serialize};

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A leaf holding encoded codes and their dataset positions.
///
/// Codes are stored flattened with stride `num_hashes`; entry `i` is
/// `codes[i * num_hashes..(i + 1) * num_hashes]` with position `positions[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaf {
    pub codes: Vec<u8>,
    pub positions: Vec<usize>,

    /// Set when the leaf exceeds capacity but every entry carries the same
    /// code, so no split can separate them.
    pub degenerate: bool,
}

impl Leaf {
    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Code of entry `i`.
    #[inline]
    pub fn code(&self, i: usize, num_hashes: usize) -> &[u8] {
        &self.codes[i * num_hashes..(i + 1) * num_hashes]
    }

    /// Append an entry.
    #[inline]
    pub fn push(&mut self, code: &[u8], position: usize) {
        self.codes.extend_from_slice(code);
        self.positions.push(position);
    }

    /// Iterate over `(code, position)` pairs.
    pub fn entries(&self, num_hashes: usize) -> impl Iterator<Item = (&[u8], usize)> + '_ {
        self.codes
            .chunks_exact(num_hashes)
            .zip(self.positions.iter().copied())
    }
}

/// A node of a DE-Tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf(Leaf),
    /// Entries with `code[split_dim] <= threshold` live under `left`, the rest
    /// under `right`.
    Internal {
        split_dim: usize,
        threshold: u8,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal { .. } => None,
        }
    }
}

/// A leaf that could not be split because all of its entries share one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateSplit {
    pub node: NodeId,
    /// Entries in the leaf when the split was abandoned.
    pub entries: usize,
}

/// Diagnostics collected while building a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub degenerate_splits: Vec<DegenerateSplit>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.degenerate_splits.is_empty()
    }
}
