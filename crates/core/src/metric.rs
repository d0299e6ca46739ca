//! Distance metrics over encoded (bucket-index) codes.

use serde::{Deserialize, Serialize};

/// Distance between two encoded codes of equal length.
///
/// Trees only use this for pruning; candidates are always ranked by true
/// Euclidean distance afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeMetric {
    /// Sum of absolute bucket-index differences (L1).
    Manhattan,
    /// Number of positions whose bucket indices differ.
    Hamming,
}

impl CodeMetric {
    /// Distance between two codes.
    #[inline]
    pub fn distance(self, a: &[u8], b: &[u8]) -> u32 {
        debug_assert_eq!(a.len(), b.len(), "Code lengths must match");
        match self {
            CodeMetric::Manhattan => a
                .iter()
                .zip(b.iter())
                .map(|(&x, &y)| x.abs_diff(y) as u32)
                .sum(),
            CodeMetric::Hamming => a
                .iter()
                .zip(b.iter())
                .filter(|(x, y)| x != y)
                .count() as u32,
        }
    }

    /// Smallest possible distance contribution of one dimension when the query
    /// holds `query` there and the other side of a split at `threshold` is
    /// searched.
    ///
    /// Entries left of a split hold values `<= threshold`, entries right of it
    /// hold values `> threshold`. The returned gap only considers the split
    /// dimension, so it never exceeds the full code distance.
    #[inline]
    pub fn split_gap(self, query: u8, threshold: u8) -> u32 {
        match self {
            CodeMetric::Manhattan => {
                if query <= threshold {
                    // far side is the right child: values >= threshold + 1
                    (threshold - query) as u32 + 1
                } else {
                    query.abs_diff(threshold) as u32
                }
            }
            CodeMetric::Hamming => 1,
        }
    }
}

impl Default for CodeMetric {
    fn default() -> Self {
        CodeMetric::Manhattan
    }
}

impl std::fmt::Display for CodeMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeMetric::Manhattan => write!(f, "manhattan"),
            CodeMetric::Hamming => write!(f, "hamming"),
        }
    }
}

impl std::str::FromStr for CodeMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manhattan" | "l1" => Ok(CodeMetric::Manhattan),
            "hamming" => Ok(CodeMetric::Hamming),
            _ => Err(format!("Unknown code metric: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(CodeMetric::Manhattan.distance(&[0, 5, 3], &[2, 1, 3]), 6);
        assert_eq!(CodeMetric::Manhattan.distance(&[255], &[0]), 255);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(CodeMetric::Hamming.distance(&[0, 5, 3], &[2, 1, 3]), 2);
        assert_eq!(CodeMetric::Hamming.distance(&[7, 7], &[7, 7]), 0);
    }

    #[test]
    fn test_split_gap_is_admissible() {
        // Every code on the far side of the split must be at least `gap` away.
        for metric in [CodeMetric::Manhattan, CodeMetric::Hamming] {
            for threshold in 0u8..8 {
                for query in 0u8..10 {
                    let gap = metric.split_gap(query, threshold);
                    let far: Vec<u8> = if query <= threshold {
                        (threshold + 1..12).collect()
                    } else {
                        (0..=threshold).collect()
                    };
                    for value in far {
                        assert!(metric.distance(&[query], &[value]) >= gap);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("L1".parse::<CodeMetric>().unwrap(), CodeMetric::Manhattan);
        assert_eq!("hamming".parse::<CodeMetric>().unwrap(), CodeMetric::Hamming);
        assert!("cosine".parse::<CodeMetric>().is_err());
        assert_eq!(CodeMetric::Hamming.to_string(), "hamming");
    }
}
