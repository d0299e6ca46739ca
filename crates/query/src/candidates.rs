//! Query-scoped candidate set.

use detlsh_core::{sort_neighbors, Neighbor, Position};
use std::collections::HashSet;

/// Candidates gathered by one query, deduplicated by dataset position.
///
/// Each member carries its true Euclidean distance to the query. Identity is
/// the position alone: equal or near-equal vectors stored at different
/// positions are separate members.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<Position>,
    members: Vec<Neighbor>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every unseen position, computing its distance with `distance`.
    /// Returns how many were new.
    pub fn extend<F>(&mut self, positions: &[Position], mut distance: F) -> usize
    where
        F: FnMut(Position) -> f32,
    {
        let before = self.members.len();
        for &position in positions {
            if self.seen.insert(position) {
                self.members.push(Neighbor::new(position, distance(position)));
            }
        }
        self.members.len() - before
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.seen.contains(&position)
    }

    /// Closest member.
    pub fn closest(&self) -> Option<Neighbor> {
        self.members
            .iter()
            .min_by(|a, b| a.cmp_by_distance(b))
            .copied()
    }

    /// Closest member within `radius`.
    pub fn closest_within(&self, radius: f32) -> Option<Neighbor> {
        self.closest().filter(|n| n.distance <= radius)
    }

    /// Number of members within `radius`.
    pub fn count_within(&self, radius: f32) -> usize {
        self.members.iter().filter(|n| n.distance <= radius).count()
    }

    /// The `k` closest members, ascending.
    pub fn k_smallest(&self, k: usize) -> Vec<Neighbor> {
        let mut members = self.members.clone();
        if k < members.len() {
            members.select_nth_unstable_by(k, Neighbor::cmp_by_distance);
            members.truncate(k);
        }
        sort_neighbors(&mut members);
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance_of(position: Position) -> f32 {
        [3.0, 0.5, 2.0, 9.0, 1.0][position]
    }

    #[test]
    fn test_dedup_by_position() {
        let mut set = CandidateSet::new();
        assert_eq!(set.extend(&[0, 1, 2], distance_of), 3);
        assert_eq!(set.extend(&[2, 1, 4], distance_of), 1);
        assert_eq!(set.len(), 4);
        assert!(set.contains(4));
        assert!(!set.contains(3));
    }

    #[test]
    fn test_equal_vectors_at_different_positions_both_kept() {
        let vectors = [[1.0f32, 2.0], [1.0, 2.0 + 1e-7], [5.0, 5.0]];
        let query = [1.0f32, 2.0];
        let mut set = CandidateSet::new();
        set.extend(&[0, 1, 2], |p| detlsh_core::l2_distance(&query, &vectors[p]));

        let mut top: Vec<Position> = set.k_smallest(2).iter().map(|n| n.position).collect();
        top.sort_unstable();
        assert_eq!(set.len(), 3);
        assert_eq!(top, vec![0, 1]);
    }

    #[test]
    fn test_closest_and_within() {
        let mut set = CandidateSet::new();
        assert!(set.closest().is_none());

        set.extend(&[0, 2, 3], distance_of);
        assert_eq!(set.closest(), Some(Neighbor::new(2, 2.0)));
        assert_eq!(set.closest_within(2.0), Some(Neighbor::new(2, 2.0)));
        assert_eq!(set.closest_within(1.5), None);
        assert_eq!(set.count_within(3.0), 2);
    }

    #[test]
    fn test_k_smallest() {
        let mut set = CandidateSet::new();
        set.extend(&[0, 1, 2, 3, 4], distance_of);

        let top: Vec<Position> = set.k_smallest(3).iter().map(|n| n.position).collect();
        assert_eq!(top, vec![1, 4, 2]);
        assert_eq!(set.k_smallest(10).len(), 5);
    }
}
