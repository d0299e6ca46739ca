//! Core type definitions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Position of a vector in the dataset the index was built from.
pub type Position = usize;

/// A search hit: dataset position plus true Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: Position,
    pub distance: f32,
}

impl Neighbor {
    pub fn new(position: Position, distance: f32) -> Self {
        Self { position, distance }
    }

    /// Ascending distance, ties broken by position so orderings are stable.
    pub fn cmp_by_distance(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// Sort neighbors by ascending distance.
pub fn sort_neighbors(neighbors: &mut [Neighbor]) {
    neighbors.sort_by(Neighbor::cmp_by_distance);
}
