//! Index construction and query execution for detlsh.
//!
//! [`DeIndex`] runs the build pipeline (hash family, breakpoints, encoding,
//! DE-Trees) and owns the dataset. [`QueryEngine`] answers:
//! - (r,c)-ANN: any point within `c * r` of the query, or none
//! - c²-k-ANN: `k` approximate nearest neighbors by radius expansion
//!
//! Candidates come from coded-distance range queries and are always ranked by
//! true Euclidean distance.
//!
//! # Example
//! ```ignore
//! use detlsh_query::{C2KAnnParams, DeIndex, QueryEngine};
//! use std::sync::Arc;
//!
//! let index = DeIndex::build(vectors, &config.index)?;
//! let engine = QueryEngine::new(Arc::new(index));
//! let neighbors = engine.c2_k_ann(&query, &C2KAnnParams::from(&config.query))?;
//! ```

pub mod candidates;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;

pub use candidates::CandidateSet;
pub use config::{coded_radius, C2KAnnParams, RcAnnParams};
pub use engine::{CancelToken, QueryEngine};
pub use error::{QueryError, QueryResult};
pub use index::DeIndex;
