//! Random-projection locality-sensitive hashing for detlsh.
//!
//! This module implements:
//! - A family of L projection spaces, each with K p-stable hash functions
//! - Parallel projection of a whole dataset into every space
//! - Exact-signature buckets, the classic LSH candidate generator
//!
//! # Example
//! ```ignore
//! use detlsh_lsh::{HashFamily, LshParams};
//!
//! let params = LshParams::new(8, 4, 128, 4.0).with_seed(42);
//! let family = HashFamily::new(&params)?;
//! let projected = family.project_all(&vectors)?;
//! let code = family.project(&query, 0)?;
//! ```

pub mod buckets;
pub mod config;
pub mod error;
pub mod family;

pub use buckets::LshBuckets;
pub use config::LshParams;
pub use error::{LshError, LshResult};
pub use family::{HashFamily, HashFunction, HashSpace, ProjectedSpace};
