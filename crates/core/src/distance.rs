//! Euclidean distance and dot product over `f32` slices.
//!
//! The loops accumulate into four independent lanes so the compiler can
//! auto-vectorize them without explicit SIMD intrinsics.

/// Squared Euclidean distance between two vectors.
///
/// Cheaper than [`l2_distance`] and order-preserving, so use it whenever
/// only the ranking matters.
#[inline]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut lanes = [0.0f32; 4];
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_tail = a_chunks.remainder();
    let b_tail = b_chunks.remainder();

    for (x, y) in a_chunks.zip(b_chunks) {
        for lane in 0..4 {
            let d = x[lane] - y[lane];
            lanes[lane] += d * d;
        }
    }

    for (x, y) in a_tail.iter().zip(b_tail.iter()) {
        let d = x - y;
        lanes[0] += d * d;
    }

    (lanes[0] + lanes[1]) + (lanes[2] + lanes[3])
}

/// Euclidean distance between two vectors.
#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    l2_distance_squared(a, b).sqrt()
}

/// Dot product of two vectors.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut lanes = [0.0f32; 4];
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let a_tail = a_chunks.remainder();
    let b_tail = b_chunks.remainder();

    for (x, y) in a_chunks.zip(b_chunks) {
        for lane in 0..4 {
            lanes[lane] += x[lane] * y[lane];
        }
    }

    for (x, y) in a_tail.iter().zip(b_tail.iter()) {
        lanes[0] += x * y;
    }

    (lanes[0] + lanes[1]) + (lanes[2] + lanes[3])
}
