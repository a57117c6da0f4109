//! # Dedup Module
//!
//! Reduces scanned records to one survivor per duplicate group.
//!
//! ## Groups
//! Records sharing a base name (extension stripped) belong to the same
//! group, wherever they live in the tree. With deduplication disabled
//! every record is its own group, keyed by absolute path.
//!
//! ## Priority
//! See [`should_replace`]. Given a fixed set of records the survivor map
//! is the same for any arrival order, except between exact ties, where
//! the first arrival stays.

mod reducer;
mod stats;

pub use reducer::{should_replace, Decision, DedupReducer, Reduction, SurvivorMap};
pub use stats::AggregateStats;
