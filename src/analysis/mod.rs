//! Client-side derivation of dashboard values.
//!
//! `aggregator` computes category buckets and headline counts,
//! `activity` builds the activity panel projections.

pub mod activity;
pub mod aggregator;

pub use activity::*;
pub use aggregator::*;
