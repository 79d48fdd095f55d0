//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent;
pub mod dispatch;
pub mod retrieve;
pub(crate) mod shared;
