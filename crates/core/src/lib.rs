//! Core vector math, code metrics and configuration for detlsh.

pub mod config;
pub mod distance;
pub mod metric;
pub mod types;

pub use config::{DetLshConfig, IndexSettings, QuerySettings};
pub use distance::{dot_product, l2_distance, l2_distance_squared};
pub use metric::CodeMetric;
pub use types::{sort_neighbors, Neighbor, Position};
