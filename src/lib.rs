//! urlsweep - a concurrent batch URL scanner
//!
//! Three pipelines share one dispatcher, fetcher, inspector and sink layer:
//! link harvesting, endpoint-upload probing and link liveness checks.
//!
//! # Modules
//!
//! - [`core`] - Shared types, constants and errors
//! - [`config`] - TOML configuration and CLI overrides
//! - [`discovery`] - Reading and filtering target lists
//! - [`scan`] - The fetch, inspect, dispatch and sink pipeline
//! - [`reporting`] - Logging and the end-of-run summary
//! - [`ui`] - CLI, colors, progress and completions

pub mod config;
pub mod core;
pub mod discovery;
pub mod reporting;
pub mod scan;
pub mod ui;

pub use crate::config::{CliConfig, Config};
pub use crate::core::{
    Classification, FetchError, FetchResult, MatchRecord, Outcome, Result, ScanMode, SweepError,
    WorkItem,
};
pub use crate::scan::{
    ConcurrencyPolicy, Dispatcher, HttpFetcher, RuleSet, RunStatistics, ScanReport, SinkReport,
};
