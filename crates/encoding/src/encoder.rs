//! Projected value to bucket index encoding.

use crate::breakpoints::{BreakpointTable, Breakpoints};
use crate::error::{EncodingError, EncodingResult};
use detlsh_lsh::ProjectedSpace;
use rayon::prelude::*;

/// Bucket index of one projected value.
///
/// Returns the greatest `i` with `bounds[i] <= value`, clamped to `0` below
/// the first boundary and to `Nr - 1` at or above the last.
#[inline]
pub fn encode_value(value: i32, breakpoints: &Breakpoints) -> u8 {
    let bounds = breakpoints.as_slice();
    let upper = bounds.partition_point(|&b| b <= value);
    upper.saturating_sub(1).min(breakpoints.num_regions() - 1) as u8
}

/// Encode one projected code with the breakpoints of `space`.
pub fn encode_code(projected: &[i32], table: &BreakpointTable, space: usize) -> EncodingResult<Vec<u8>> {
    let breakpoints = table.space(space)?;
    if projected.len() != breakpoints.len() {
        return Err(EncodingError::DimensionMismatch {
            expected: breakpoints.len(),
            got: projected.len(),
        });
    }

    Ok(projected
        .iter()
        .zip(breakpoints.iter())
        .map(|(&v, b)| encode_value(v, b))
        .collect())
}

/// Encoded codes of a whole dataset in one space.
///
/// Stored flattened with stride `num_hashes`, matching [`ProjectedSpace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSpace {
    pub num_hashes: usize,
    pub codes: Vec<u8>,
}

impl EncodedSpace {
    /// Encoded code of one point.
    #[inline]
    pub fn code(&self, position: usize) -> &[u8] {
        let start = position * self.num_hashes;
        &self.codes[start..start + self.num_hashes]
    }

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

/// Encode every projected space, in parallel over spaces and points.
pub fn encode_dataset(
    projected: &[ProjectedSpace],
    table: &BreakpointTable,
) -> EncodingResult<Vec<EncodedSpace>> {
    if projected.len() != table.num_spaces() {
        return Err(EncodingError::InvalidParams(format!(
            "{} projected spaces but breakpoints for {}",
            projected.len(),
            table.num_spaces()
        )));
    }

    projected
        .par_iter()
        .enumerate()
        .map(|(s, space)| {
            let breakpoints = table.space(s)?;
            let k = breakpoints.len();
            if space.num_hashes != k {
                return Err(EncodingError::DimensionMismatch {
                    expected: k,
                    got: space.num_hashes,
                });
            }

            let mut codes = vec![0u8; space.codes.len()];
            codes
                .par_chunks_mut(k)
                .zip(space.codes.par_chunks(k))
                .for_each(|(out, values)| {
                    for ((slot, &v), b) in out.iter_mut().zip(values).zip(breakpoints) {
                        *slot = encode_value(v, b);
                    }
                });

            Ok(EncodedSpace { num_hashes: k, codes })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingParams;

    fn bounds(values: &[i32]) -> Breakpoints {
        Breakpoints::from_bounds(values.to_vec()).unwrap()
    }

    #[test]
    fn test_encode_value_fixed_bounds() {
        let b = bounds(&[0, 10, 20, 30, 40]);
        let encoded: Vec<u8> = [-5, 0, 15, 39, 41]
            .iter()
            .map(|&v| encode_value(v, &b))
            .collect();
        assert_eq!(encoded, vec![0, 0, 1, 3, 3]);

        assert_eq!(encode_value(40, &b), 3);
        assert_eq!(encode_value(10, &b), 1);
        assert_eq!(encode_value(9, &b), 0);
    }

    #[test]
    fn test_encode_value_is_monotone() {
        let b = bounds(&[-7, -3, -3, 0, 4, 4, 4, 12, 30]);
        let mut previous = 0u8;
        for v in -20..40 {
            let code = encode_value(v, &b);
            assert!(code >= previous);
            assert!((code as usize) < b.num_regions());
            previous = code;
        }
    }

    #[test]
    fn test_single_region() {
        let b = bounds(&[3, 3]);
        assert_eq!(encode_value(-100, &b), 0);
        assert_eq!(encode_value(3, &b), 0);
        assert_eq!(encode_value(100, &b), 0);
    }

    #[test]
    fn test_encode_dataset_matches_encode_code() {
        let projected: Vec<ProjectedSpace> = (0..2)
            .map(|s| ProjectedSpace {
                num_hashes: 3,
                codes: (0..300).map(|i| (i * 7 + s * 13) % 101 - 50).collect(),
            })
            .collect();
        let table =
            BreakpointTable::select(&projected, &EncodingParams::new(50, 16).with_seed(3)).unwrap();

        let encoded = encode_dataset(&projected, &table).unwrap();
        assert_eq!(encoded.len(), 2);
        for (s, space) in encoded.iter().enumerate() {
            assert_eq!(space.len(), 100);
            for p in 0..100 {
                let expected = encode_code(projected[s].code(p), &table, s).unwrap();
                assert_eq!(space.code(p), expected.as_slice());
                assert!(space.code(p).iter().all(|&c| (c as usize) < 16));
            }
        }
    }

    #[test]
    fn test_encode_code_errors() {
        let table = BreakpointTable::from_spaces(vec![vec![bounds(&[0, 5, 10]); 2]]).unwrap();
        assert_eq!(encode_code(&[1, 7], &table, 0).unwrap(), vec![0, 1]);
        assert_eq!(
            encode_code(&[1], &table, 0),
            Err(EncodingError::DimensionMismatch { expected: 2, got: 1 })
        );
        assert!(matches!(
            encode_code(&[1, 2], &table, 4),
            Err(EncodingError::InvalidSpace { .. })
        ));
    }
}
