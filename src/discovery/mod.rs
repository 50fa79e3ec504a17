//! Target discovery
//!
//! This module turns the input URL list into the ordered sequence of
//! target strings handed to the scan pipelines.

pub mod targets;

// Re-export commonly used items
pub use targets::{filter_static_assets, read_targets};
