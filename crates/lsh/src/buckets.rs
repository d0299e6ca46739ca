//! Exact-signature LSH buckets.
//!
//! Points are grouped by their full projected signature in each space; a query
//! collides with every point sharing its signature in at least one space.

use crate::error::LshResult;
use crate::family::HashFamily;
use rayon::prelude::*;
use std::collections::HashMap;

/// Per-space hash tables from projected signature to dataset positions.
#[derive(Debug, Clone)]
pub struct LshBuckets {
    tables: Vec<HashMap<Vec<i32>, Vec<usize>>>,
}

impl LshBuckets {
    /// Hash every point into every space of `family`.
    pub fn build(family: &HashFamily, points: &[Vec<f32>]) -> LshResult<Self> {
        let projected = family.project_all(points)?;

        let tables: Vec<HashMap<Vec<i32>, Vec<usize>>> = projected
            .par_iter()
            .map(|space| {
                let mut table: HashMap<Vec<i32>, Vec<usize>> = HashMap::new();
                for position in 0..space.len() {
                    table
                        .entry(space.code(position).to_vec())
                        .or_default()
                        .push(position);
                }
                table
            })
            .collect();

        tracing::debug!(
            "Built LSH buckets: {} spaces, {} buckets total",
            tables.len(),
            tables.iter().map(|t| t.len()).sum::<usize>()
        );

        Ok(Self { tables })
    }

    /// Positions colliding with `query` in at least one space, sorted and
    /// deduplicated.
    pub fn candidates(&self, family: &HashFamily, query: &[f32]) -> LshResult<Vec<usize>> {
        let mut result = Vec::new();
        for (space, table) in self.tables.iter().enumerate() {
            let signature = family.project(query, space)?;
            if let Some(bucket) = table.get(&signature) {
                result.extend_from_slice(bucket);
            }
        }
        result.sort_unstable();
        result.dedup();
        Ok(result)
    }

    /// Number of spaces.
    pub fn num_spaces(&self) -> usize {
        self.tables.len()
    }

    /// Number of distinct signatures in one space.
    pub fn num_buckets(&self, space: usize) -> usize {
        self.tables.get(space).map_or(0, |t| t.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LshParams;

    #[test]
    fn test_point_collides_with_itself() {
        let params = LshParams::new(4, 3, 8, 4.0).with_seed(2);
        let family = HashFamily::new(&params).unwrap();
        let points: Vec<Vec<f32>> = (0..30)
            .map(|i| (0..8).map(|j| ((i * 7 + j * 3) % 11) as f32).collect())
            .collect();

        let buckets = LshBuckets::build(&family, &points).unwrap();
        assert_eq!(buckets.num_spaces(), 3);

        for (i, point) in points.iter().enumerate() {
            let candidates = buckets.candidates(&family, point).unwrap();
            assert!(candidates.contains(&i));
            assert!(candidates.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_duplicates_share_bucket() {
        let params = LshParams::new(6, 2, 3, 1.0).with_seed(4);
        let family = HashFamily::new(&params).unwrap();
        let points = vec![
            vec![1.0, 2.0, 3.0],
            vec![100.0, -50.0, 20.0],
            vec![1.0, 2.0, 3.0],
        ];

        let buckets = LshBuckets::build(&family, &points).unwrap();
        let candidates = buckets.candidates(&family, &[1.0, 2.0, 3.0]).unwrap();
        assert!(candidates.contains(&0));
        assert!(candidates.contains(&2));
        assert!(buckets.num_buckets(0) <= 2);
    }

    #[test]
    fn test_query_dimension_checked() {
        let params = LshParams::new(2, 1, 3, 1.0).with_seed(4);
        let family = HashFamily::new(&params).unwrap();
        let buckets = LshBuckets::build(&family, &[vec![0.0; 3]]).unwrap();
        assert!(buckets.candidates(&family, &[0.0; 2]).is_err());
    }
}
