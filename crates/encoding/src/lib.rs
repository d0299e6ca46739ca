//! Breakpoint selection and bucket encoding for detlsh.
//!
//! Projected hash values are unbounded integers. This crate maps them to
//! compact bucket indices:
//! - Breakpoints: Nr + 1 sample quantiles per (space, hash function)
//! - Encoder: binary search of a value among its dimension's breakpoints
//!
//! # Example
//! ```ignore
//! use detlsh_encoding::{BreakpointTable, EncodingParams, encode_dataset};
//!
//! let projected = family.project_all(&vectors)?;
//! let table = BreakpointTable::select(&projected, &EncodingParams::new(1024, 16))?;
//! let encoded = encode_dataset(&projected, &table)?;
//! ```

pub mod breakpoints;
pub mod config;
pub mod encoder;
pub mod error;

pub use breakpoints::{sample_positions, select_breakpoints, BreakpointTable, Breakpoints};
pub use config::{EncodingParams, MAX_REGIONS};
pub use encoder::{encode_code, encode_dataset, encode_value, EncodedSpace};
pub use error::{EncodingError, EncodingResult};
