//! Analytics modules.
//!
//! Summary statistics are computed on demand from the stored entries.

pub mod aggregator;

pub use aggregator::summarize;
