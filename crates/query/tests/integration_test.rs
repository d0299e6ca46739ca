//! Integration tests for the detlsh build pipeline and query engine.

use detlsh_core::{l2_distance, CodeMetric, DetLshConfig, IndexSettings, Position};
use detlsh_query::{C2KAnnParams, CancelToken, DeIndex, QueryEngine, QueryError, RcAnnParams};
use rand::prelude::*;
use rand_distr::Normal;
use std::sync::Arc;

fn uniform_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen_range(0.0..100.0)).collect())
        .collect()
}

fn cluster(n: usize, dim: usize, center: f32, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(center, 1.0f32).unwrap();
    (0..n)
        .map(|_| (0..dim).map(|_| normal.sample(&mut rng)).collect())
        .collect()
}

fn settings(seed: u64) -> IndexSettings {
    IndexSettings {
        num_hashes: 8,
        num_spaces: 4,
        bucket_width: 4.0,
        sample_size: 256,
        num_regions: 16,
        max_leaf_size: 16,
        seed: Some(seed),
        ..Default::default()
    }
}

fn engine_for(vectors: Vec<Vec<f32>>, settings: &IndexSettings) -> QueryEngine {
    QueryEngine::new(Arc::new(DeIndex::build(vectors, settings).unwrap()))
}

#[test]
fn test_rc_ann_stays_in_query_cluster() {
    let dim = 8;
    let mut vectors = cluster(100, dim, 0.0, 1);
    vectors.extend(cluster(100, dim, 50.0, 2));
    let engine = engine_for(vectors.clone(), &settings(7));

    let params = RcAnnParams::new(1.0, 2.0).with_candidate_fraction(0.05);
    let noise = cluster(20, dim, 0.0, 3);
    for (i, offset) in noise.iter().enumerate() {
        let query: Vec<f32> = vectors[i]
            .iter()
            .zip(offset)
            .map(|(x, d)| x + 0.2 * d)
            .collect();

        if let Some(hit) = engine.rc_ann(&query, &params).unwrap() {
            assert!(hit.position < 100, "query near cluster A returned {}", hit.position);
            assert!((hit.distance - l2_distance(&query, &vectors[hit.position])).abs() < 1e-4);
        }
    }

    // An indexed point always collides with itself.
    for position in [0usize, 42, 99] {
        let hit = engine.rc_ann(&vectors[position], &params).unwrap().unwrap();
        assert!(hit.position < 100);
        assert_eq!(hit.distance, 0.0);
    }
}

#[test]
fn test_c2_k_ann_uniform_dataset() {
    let vectors = uniform_vectors(1000, 16, 11);
    let engine = engine_for(vectors.clone(), &settings(5));
    let params = C2KAnnParams::new(5);

    let queries = uniform_vectors(10, 16, 12);
    for query in &queries {
        let result = engine.c2_k_ann(query, &params).unwrap();

        assert_eq!(result.len(), 5);
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));

        let mut positions: Vec<Position> = result.iter().map(|n| n.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), 5);

        for n in &result {
            assert!((n.distance - l2_distance(query, &vectors[n.position])).abs() < 1e-3);
        }
    }

    let result = engine.c2_k_ann(&vectors[123], &params).unwrap();
    assert_eq!(result[0].position, 123);
    assert_eq!(result[0].distance, 0.0);
}

#[test]
fn test_hamming_metric_queries() {
    let vectors = uniform_vectors(300, 8, 21);
    let settings = IndexSettings {
        code_metric: CodeMetric::Hamming,
        ..settings(9)
    };
    let engine = engine_for(vectors.clone(), &settings);

    let result = engine.c2_k_ann(&vectors[17], &C2KAnnParams::new(3)).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0].position, 17);
}

#[test]
fn test_seeded_builds_are_reproducible() {
    let vectors = uniform_vectors(400, 12, 31);
    let a = engine_for(vectors.clone(), &settings(99));
    let b = engine_for(vectors, &settings(99));

    for space in 0..4 {
        assert_eq!(
            a.index().breakpoints().space(space).unwrap(),
            b.index().breakpoints().space(space).unwrap()
        );
    }
    assert_eq!(a.index().tree_stats(), b.index().tree_stats());

    let params = C2KAnnParams::new(4);
    for query in uniform_vectors(5, 12, 32) {
        assert_eq!(a.c2_k_ann(&query, &params), b.c2_k_ann(&query, &params));
        let rc = RcAnnParams::new(10.0, 1.5);
        assert_eq!(a.rc_ann(&query, &rc), b.rc_ann(&query, &rc));
    }
}

#[test]
fn test_iteration_cap_is_reported() {
    let vectors = uniform_vectors(200, 8, 41);
    let engine = engine_for(vectors, &settings(1));

    let params = C2KAnnParams::new(5)
        .with_initial_radius(1e-3)
        .with_candidate_fraction(1.0)
        .with_max_expansions(2);
    match engine.c2_k_ann(&[1000.0; 8], &params) {
        Err(QueryError::IterationCapExceeded { passes, radius, .. }) => {
            assert_eq!(passes, 2);
            assert!((radius - 1.5e-3).abs() < 1e-6);
        }
        other => panic!("expected IterationCapExceeded, got {:?}", other),
    }
}

#[test]
fn test_cancellation_is_reported() {
    let engine = engine_for(uniform_vectors(100, 4, 51), &settings(2));
    let token = CancelToken::new();
    let handle = token.clone();
    handle.cancel();

    assert!(token.is_cancelled());
    assert_eq!(
        engine.c2_k_ann_cancellable(&[50.0; 4], &C2KAnnParams::new(3), &token),
        Err(QueryError::Cancelled)
    );
}

#[test]
fn test_config_round_trip_builds_same_index() {
    let config = DetLshConfig::default().with_seed(77);
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: DetLshConfig = serde_json::from_str(&json).unwrap();
    assert!(parsed.validate().is_ok());

    let vectors = uniform_vectors(300, 6, 61);
    let a = engine_for(vectors.clone(), &config.index);
    let b = engine_for(vectors.clone(), &parsed.index);

    let params = C2KAnnParams::from(&parsed.query);
    assert_eq!(params.k, config.query.top_k);
    assert_eq!(
        a.c2_k_ann(&vectors[5], &params),
        b.c2_k_ann(&vectors[5], &C2KAnnParams::from(&config.query))
    );
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let vectors = uniform_vectors(500, 8, 71);
    let engine = engine_for(vectors.clone(), &settings(4));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = engine.clone();
            let query = vectors[t * 10].clone();
            std::thread::spawn(move || engine.c2_k_ann(&query, &C2KAnnParams::new(2)))
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap().unwrap();
        assert_eq!(result[0].position, t * 10);
    }
}
