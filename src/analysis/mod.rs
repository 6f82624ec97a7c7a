//! Analysis modules.
//!
//! The aggregator turns a categorized catalogue into validity counts and
//! averaged quality metrics.

pub mod aggregator;

pub use aggregator::*;
