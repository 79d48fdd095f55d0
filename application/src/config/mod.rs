//! Application-level configuration.
//!
//! - [`RetrievalParams`]: merged-list cap, threshold policy

pub mod retrieval_params;

pub use retrieval_params::{DEFAULT_MAX_RESULTS, RetrievalParams};
