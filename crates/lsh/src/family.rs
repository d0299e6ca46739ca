//! Random-projection hash family.
//!
//! Each hash function is `h(v) = floor((a · v + b) / w)` with `a` drawn from a
//! standard normal distribution and `b` uniform in `[0, w)`. A projection
//! space groups K such functions; the family holds L independent spaces.

use crate::config::LshParams;
use crate::error::{LshError, LshResult};
use detlsh_core::distance::dot_product;
use rand::distributions::Uniform;
use rand::prelude::*;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A single p-stable hash function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashFunction {
    /// Projection direction, length d.
    pub weights: Vec<f32>,
    /// Offset in `[0, w)`.
    pub offset: f32,
}

impl HashFunction {
    #[inline]
    fn hash(&self, point: &[f32], bucket_width: f32) -> i32 {
        ((dot_product(&self.weights, point) + self.offset) / bucket_width).floor() as i32
    }
}

/// K hash functions making up one projection space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashSpace {
    pub functions: Vec<HashFunction>,
}

impl HashSpace {
    /// Write the K hash values of `point` into `out`.
    #[inline]
    fn project_into(&self, point: &[f32], bucket_width: f32, out: &mut [i32]) {
        for (slot, function) in out.iter_mut().zip(self.functions.iter()) {
            *slot = function.hash(point, bucket_width);
        }
    }
}

/// Projected codes of a whole dataset in one space.
///
/// Stored flattened: the code of point `i` is `codes[i * num_hashes..(i + 1) * num_hashes]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedSpace {
    pub num_hashes: usize,
    pub codes: Vec<i32>,
}

impl ProjectedSpace {
    /// Projected code of one point.
    #[inline]
    pub fn code(&self, position: usize) -> &[i32] {
        let start = position * self.num_hashes;
        &self.codes[start..start + self.num_hashes]
    }

    /// Value of hash function `hash` for one point.
    #[inline]
    pub fn value(&self, position: usize, hash: usize) -> i32 {
        self.codes[position * self.num_hashes + hash]
    }

    /// Number of projected points.
    pub fn len(&self) -> usize {
        if self.num_hashes == 0 {
            0
        } else {
            self.codes.len() / self.num_hashes
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// L independent projection spaces of K hash functions each.
///
/// Immutable after generation and safe to share across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashFamily {
    num_hashes: usize,
    dim: usize,
    bucket_width: f32,
    spaces: Vec<HashSpace>,
}

impl HashFamily {
    /// Generate a family seeded from `params.seed`, or from entropy when unset.
    pub fn new(params: &LshParams) -> LshResult<Self> {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate(params, &mut rng)
    }

    /// Generate a family drawing every weight and offset from `rng`.
    ///
    /// Functions are drawn space by space, hash by hash, so the same RNG state
    /// always produces the same family.
    pub fn generate<R: Rng>(params: &LshParams, rng: &mut R) -> LshResult<Self> {
        params.validate()?;

        let offsets = Uniform::new(0.0f32, params.bucket_width);
        let spaces = (0..params.num_spaces)
            .map(|_| HashSpace {
                functions: (0..params.num_hashes)
                    .map(|_| {
                        let weights: Vec<f32> = (0..params.dim)
                            .map(|_| rng.sample::<f32, _>(StandardNormal))
                            .collect();
                        let offset = rng.sample(offsets);
                        HashFunction { weights, offset }
                    })
                    .collect(),
            })
            .collect();

        tracing::debug!(
            "Generated hash family: L={}, K={}, d={}, w={}",
            params.num_spaces,
            params.num_hashes,
            params.dim,
            params.bucket_width
        );

        Ok(Self {
            num_hashes: params.num_hashes,
            dim: params.dim,
            bucket_width: params.bucket_width,
            spaces,
        })
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn num_spaces(&self) -> usize {
        self.spaces.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn bucket_width(&self) -> f32 {
        self.bucket_width
    }

    /// Hash functions of one space.
    pub fn space(&self, space: usize) -> LshResult<&HashSpace> {
        self.spaces.get(space).ok_or(LshError::InvalidSpace {
            space,
            num_spaces: self.spaces.len(),
        })
    }

    /// Project a point into one space, returning its K hash values.
    pub fn project(&self, point: &[f32], space: usize) -> LshResult<Vec<i32>> {
        self.check_dim(point)?;
        let hash_space = self.space(space)?;
        let mut code = vec![0i32; self.num_hashes];
        hash_space.project_into(point, self.bucket_width, &mut code);
        Ok(code)
    }

    /// Project every point into every space.
    ///
    /// Spaces and points are processed in parallel; the result is indexed by
    /// space.
    pub fn project_all(&self, points: &[Vec<f32>]) -> LshResult<Vec<ProjectedSpace>> {
        for point in points {
            self.check_dim(point)?;
        }

        let k = self.num_hashes;
        let width = self.bucket_width;
        let projected = self
            .spaces
            .par_iter()
            .map(|space| {
                let mut codes = vec![0i32; points.len() * k];
                codes
                    .par_chunks_mut(k)
                    .zip(points.par_iter())
                    .for_each(|(out, point)| space.project_into(point, width, out));
                ProjectedSpace {
                    num_hashes: k,
                    codes,
                }
            })
            .collect();

        Ok(projected)
    }

    fn check_dim(&self, point: &[f32]) -> LshResult<()> {
        if point.len() != self.dim {
            return Err(LshError::DimensionMismatch {
                expected: self.dim,
                got: point.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_points(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen_range(-5.0..5.0)).collect())
            .collect()
    }

    #[test]
    fn test_generate_shape() {
        let params = LshParams::new(6, 3, 10, 4.0).with_seed(1);
        let family = HashFamily::new(&params).unwrap();

        assert_eq!(family.num_spaces(), 3);
        assert_eq!(family.num_hashes(), 6);
        for s in 0..3 {
            let space = family.space(s).unwrap();
            assert_eq!(space.functions.len(), 6);
            for f in &space.functions {
                assert_eq!(f.weights.len(), 10);
                assert!(f.offset >= 0.0 && f.offset < 4.0);
            }
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = LshParams::new(0, 3, 10, 4.0);
        assert!(matches!(
            HashFamily::new(&params),
            Err(LshError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let params = LshParams::new(4, 2, 8, 2.0).with_seed(99);
        let a = HashFamily::new(&params).unwrap();
        let b = HashFamily::new(&params).unwrap();

        let points = random_points(20, 8, 5);
        assert_eq!(a.project_all(&points).unwrap(), b.project_all(&points).unwrap());
    }

    #[test]
    fn test_project_matches_formula() {
        let params = LshParams::new(3, 1, 4, 2.0).with_seed(3);
        let family = HashFamily::new(&params).unwrap();
        let point = vec![0.5, -1.0, 2.0, 0.25];

        let code = family.project(&point, 0).unwrap();
        let space = family.space(0).unwrap();
        for (j, f) in space.functions.iter().enumerate() {
            let dot = dot_product(&f.weights, &point);
            let expected = ((dot + f.offset) / 2.0).floor() as i32;
            assert_eq!(code[j], expected);
        }
    }

    #[test]
    fn test_project_all_matches_project() {
        let params = LshParams::new(5, 3, 6, 1.5).with_seed(17);
        let family = HashFamily::new(&params).unwrap();
        let points = random_points(40, 6, 23);

        let projected = family.project_all(&points).unwrap();
        assert_eq!(projected.len(), 3);
        for (s, space) in projected.iter().enumerate() {
            assert_eq!(space.len(), 40);
            for (i, point) in points.iter().enumerate() {
                assert_eq!(space.code(i), family.project(point, s).unwrap().as_slice());
            }
        }
    }

    #[test]
    fn test_dimension_and_space_errors() {
        let params = LshParams::new(2, 2, 4, 1.0).with_seed(0);
        let family = HashFamily::new(&params).unwrap();

        assert_eq!(
            family.project(&[1.0, 2.0], 0),
            Err(LshError::DimensionMismatch { expected: 4, got: 2 })
        );
        assert_eq!(
            family.project(&[0.0; 4], 5),
            Err(LshError::InvalidSpace { space: 5, num_spaces: 2 })
        );
        assert!(family.project_all(&[vec![0.0; 4], vec![0.0; 3]]).is_err());
    }

    #[test]
    fn test_nearby_points_share_more_hashes() {
        let params = LshParams::new(16, 4, 32, 4.0).with_seed(8);
        let family = HashFamily::new(&params).unwrap();
        let mut rng = StdRng::seed_from_u64(77);

        let mut near_matches = 0;
        let mut far_matches = 0;
        for _ in 0..50 {
            let base: Vec<f32> = (0..32).map(|_| rng.gen_range(-10.0..10.0)).collect();
            let near: Vec<f32> = base.iter().map(|x| x + rng.gen_range(-0.05..0.05)).collect();
            let far: Vec<f32> = (0..32).map(|_| rng.gen_range(-10.0..10.0)).collect();

            for s in 0..4 {
                let b = family.project(&base, s).unwrap();
                let n = family.project(&near, s).unwrap();
                let f = family.project(&far, s).unwrap();
                near_matches += b.iter().zip(&n).filter(|(x, y)| x == y).count();
                far_matches += b.iter().zip(&f).filter(|(x, y)| x == y).count();
            }
        }
        assert!(near_matches > far_matches);
    }
}
