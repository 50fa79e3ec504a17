//! Logging and the end-of-run summary.

pub mod logging;
pub mod summary;

pub use summary::{display_clean_summary, display_summary, render_summary};
