//! Quantile breakpoint selection.
//!
//! For each (space, hash function) pair, Nr + 1 boundaries are chosen from a
//! sample of projected values so that every region holds roughly ns / Nr
//! sampled values. Interior boundary `z` is the sample value of rank
//! `z * ns / Nr`; the outer boundaries are the sample minimum and maximum.

use crate::config::{EncodingParams, MAX_REGIONS};
use crate::error::{EncodingError, EncodingResult};
use detlsh_lsh::ProjectedSpace;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Nr + 1 non-decreasing boundaries for one hashed dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    bounds: Vec<i32>,
}

impl Breakpoints {
    /// Wrap explicit boundaries.
    pub fn from_bounds(bounds: Vec<i32>) -> EncodingResult<Self> {
        if bounds.len() < 2
            || bounds.len() > MAX_REGIONS + 1
            || bounds.windows(2).any(|w| w[0] > w[1])
        {
            return Err(EncodingError::InvalidBreakpoints);
        }
        Ok(Self { bounds })
    }

    /// Number of regions (Nr).
    pub fn num_regions(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.bounds
    }

    /// Smallest sampled value.
    pub fn min(&self) -> i32 {
        self.bounds[0]
    }

    /// Largest sampled value.
    pub fn max(&self) -> i32 {
        self.bounds[self.bounds.len() - 1]
    }
}

/// Rank of interior boundary `z` in a sorted sample of `ns` values.
#[inline]
fn quantile_rank(z: usize, ns: usize, nr: usize) -> usize {
    z * ns / nr
}

/// Select breakpoints from one dimension's sample.
///
/// The sample is reordered in place. Power-of-two region counts use
/// [`select_by_halving`], all others a full sort.
pub fn select_breakpoints(sample: &mut [i32], num_regions: usize) -> EncodingResult<Breakpoints> {
    if num_regions == 0 || num_regions > MAX_REGIONS {
        return Err(EncodingError::InvalidParams(format!(
            "num_regions (Nr) must be in [1, {}], got {}",
            MAX_REGIONS, num_regions
        )));
    }
    if sample.is_empty() {
        return Err(EncodingError::EmptySample);
    }

    if num_regions.is_power_of_two() {
        Ok(select_by_halving(sample, num_regions))
    } else {
        Ok(select_by_sort(sample, num_regions))
    }
}

/// Sort the sample and read every boundary rank directly.
pub(crate) fn select_by_sort(sample: &mut [i32], nr: usize) -> Breakpoints {
    let ns = sample.len();
    sample.sort_unstable();

    let mut bounds = Vec::with_capacity(nr + 1);
    bounds.push(sample[0]);
    for z in 1..nr {
        bounds.push(sample[quantile_rank(z, ns, nr)]);
    }
    bounds.push(sample[ns - 1]);

    Breakpoints { bounds }
}

/// Recursive halving for power-of-two `nr`.
///
/// Round `round` selects the 2^(round-1) boundaries at odd multiples of
/// `nr >> round`. Each selection runs strictly between the two boundaries
/// fixed in earlier rounds, so after `log2(nr)` rounds every boundary rank
/// holds its sorted value without sorting the sample.
pub(crate) fn select_by_halving(sample: &mut [i32], nr: usize) -> Breakpoints {
    debug_assert!(nr.is_power_of_two());
    let ns = sample.len();
    let rounds = nr.trailing_zeros();

    for round in 1..=rounds {
        let step = nr >> round;
        for b in 0..(1usize << (round - 1)) {
            let z = (2 * b + 1) * step;
            let hi = quantile_rank(z + step, ns, nr);
            let rank = quantile_rank(z, ns, nr);
            // the slot of rank `z - step` was fixed by an earlier round unless z == step
            let start = if z > step {
                quantile_rank(z - step, ns, nr) + 1
            } else {
                0
            };
            // a rank shared with a fixed neighbor needs no selection
            if start <= rank && rank < hi {
                sample[start..hi].select_nth_unstable(rank - start);
            }
        }
        tracing::trace!("Halving round {} of {} done", round, rounds);
    }

    let mut bounds = Vec::with_capacity(nr + 1);
    bounds.push(sample.iter().copied().min().unwrap_or_default());
    for z in 1..nr {
        bounds.push(sample[quantile_rank(z, ns, nr)]);
    }
    bounds.push(sample.iter().copied().max().unwrap_or_default());

    Breakpoints { bounds }
}

/// Draw the sample positions shared by every (space, dimension).
///
/// Positions are drawn without replacement and returned in ascending order.
/// When `sample_size >= n` every position is used.
pub fn sample_positions<R: Rng>(n: usize, sample_size: usize, rng: &mut R) -> Vec<usize> {
    if sample_size >= n {
        return (0..n).collect();
    }
    let mut positions = rand::seq::index::sample(rng, n, sample_size).into_vec();
    positions.sort_unstable();
    positions
}

/// Breakpoints for every (space, hash function) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointTable {
    num_regions: usize,
    num_hashes: usize,
    spaces: Vec<Vec<Breakpoints>>,
}

impl BreakpointTable {
    /// Select breakpoints for all projected spaces, in parallel over spaces.
    pub fn select(projected: &[ProjectedSpace], params: &EncodingParams) -> EncodingResult<Self> {
        params.validate()?;

        let first = projected.first().ok_or(EncodingError::EmptySample)?;
        let n = first.len();
        let num_hashes = first.num_hashes;
        if n == 0 {
            return Err(EncodingError::EmptySample);
        }
        for space in projected {
            if space.num_hashes != num_hashes {
                return Err(EncodingError::DimensionMismatch {
                    expected: num_hashes,
                    got: space.num_hashes,
                });
            }
            if space.len() != n {
                return Err(EncodingError::InvalidParams(format!(
                    "projected spaces disagree on point count: {} vs {}",
                    n,
                    space.len()
                )));
            }
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let positions = sample_positions(n, params.sample_size, &mut rng);
        let nr = params.num_regions;

        let spaces = projected
            .par_iter()
            .map(|space| {
                let mut buffer = Vec::with_capacity(positions.len());
                (0..num_hashes)
                    .map(|hash| {
                        buffer.clear();
                        buffer.extend(positions.iter().map(|&p| space.value(p, hash)));
                        select_breakpoints(&mut buffer, nr)
                    })
                    .collect::<EncodingResult<Vec<_>>>()
            })
            .collect::<EncodingResult<Vec<_>>>()?;

        tracing::debug!(
            "Selected breakpoints: {} spaces x {} hashes, Nr={}, sample={}",
            spaces.len(),
            num_hashes,
            nr,
            positions.len()
        );

        Ok(Self {
            num_regions: nr,
            num_hashes,
            spaces,
        })
    }

    /// Build a table from explicit per-space breakpoints.
    pub fn from_spaces(spaces: Vec<Vec<Breakpoints>>) -> EncodingResult<Self> {
        let first = spaces
            .first()
            .and_then(|s| s.first())
            .ok_or_else(|| EncodingError::InvalidParams("breakpoint table is empty".into()))?;
        let num_regions = first.num_regions();
        let num_hashes = spaces[0].len();

        for space in &spaces {
            if space.len() != num_hashes {
                return Err(EncodingError::DimensionMismatch {
                    expected: num_hashes,
                    got: space.len(),
                });
            }
            if space.iter().any(|b| b.num_regions() != num_regions) {
                return Err(EncodingError::InvalidBreakpoints);
            }
        }

        Ok(Self {
            num_regions,
            num_hashes,
            spaces,
        })
    }

    pub fn num_regions(&self) -> usize {
        self.num_regions
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn num_spaces(&self) -> usize {
        self.spaces.len()
    }

    /// Breakpoints of every hash function in one space.
    pub fn space(&self, space: usize) -> EncodingResult<&[Breakpoints]> {
        self.spaces
            .get(space)
            .map(|s| s.as_slice())
            .ok_or(EncodingError::InvalidSpace {
                space,
                num_spaces: self.spaces.len(),
            })
    }
}
