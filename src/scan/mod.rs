//! The concurrent scan pipeline: fetch, inspect, dispatch and sink.

pub mod dispatcher;
pub mod fetcher;
pub mod inspector;
pub mod jobs;
pub mod pages;
pub mod pipeline;
pub mod sink;
pub mod stats;

pub use dispatcher::{ConcurrencyPolicy, Dispatcher, ScanJob};
pub use fetcher::{FetchPlan, FetchSettings, Fetcher, HttpFetcher, Payload, UserAgent};
pub use inspector::{OverlapPolicy, Rule, RuleSet, classify_status, inspect, inspect_marker};
pub use pages::{page_file_name, remove_downloaded_pages, save_page};
pub use pipeline::{
    AliveOptions, HarvestOptions, ProbeOptions, ScanReport, run_alive, run_harvest, run_probe,
};
pub use sink::{Sink, SinkHandle, SinkReport, spawn_sink};
pub use stats::{RunStatistics, StatsCollector};
