//! Benchmark utilities for detlsh.

use detlsh_core::{l2_distance, sort_neighbors, Neighbor, Position};
use rand::prelude::*;
use rand_distr::StandardNormal;
use rayon::prelude::*;

/// Generate a random vector with given dimension.
pub fn random_vector(dim: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect()
}

/// Generate a batch of random vectors.
pub fn random_vectors(count: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..count).map(|_| random_vector(dim)).collect()
}

/// Seeded vectors uniform in `[0, scale)` on every coordinate.
pub fn uniform_vectors(count: usize, dim: usize, scale: f32, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dim).map(|_| rng.gen::<f32>() * scale).collect())
        .collect()
}

/// Seeded Gaussian clusters.
///
/// Centers are uniform in `[0, scale)`; each of the `count` points picks a
/// center at random and adds noise with standard deviation `spread`.
pub fn clustered_vectors(
    count: usize,
    dim: usize,
    num_clusters: usize,
    scale: f32,
    spread: f32,
    seed: u64,
) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = uniform_vectors(num_clusters.max(1), dim, scale, rng.gen());

    (0..count)
        .map(|_| {
            let center = &centers[rng.gen_range(0..centers.len())];
            center
                .iter()
                .map(|c| c + spread * rng.sample::<f32, _>(StandardNormal))
                .collect()
        })
        .collect()
}

/// Exact k nearest neighbors by linear scan.
pub fn brute_force_knn(vectors: &[Vec<f32>], query: &[f32], k: usize) -> Vec<Neighbor> {
    let mut all: Vec<Neighbor> = vectors
        .par_iter()
        .enumerate()
        .map(|(i, v)| Neighbor::new(i, l2_distance(query, v)))
        .collect();
    sort_neighbors(&mut all);
    all.truncate(k);
    all
}

/// Fraction of `truth` positions present in `found`.
pub fn recall(found: &[Neighbor], truth: &[Neighbor]) -> f64 {
    if truth.is_empty() {
        return 1.0;
    }
    let hits = truth
        .iter()
        .filter(|t| found.iter().any(|f| f.position == t.position))
        .count();
    hits as f64 / truth.len() as f64
}

/// Positions of a neighbor list.
pub fn positions(neighbors: &[Neighbor]) -> Vec<Position> {
    neighbors.iter().map(|n| n.position).collect()
}
