//! End-to-end runs: build the sinks, dispatch the job, then close everything
//! down in order so no record is lost.

use log::{info, warn};
use serde::Serialize;

use crate::core::constants::sinks;
use crate::core::types::{ScanMode, WorkItem};
use crate::discovery::filter_static_assets;
use crate::scan::dispatcher::Dispatcher;
use crate::scan::fetcher::Fetcher;
use crate::scan::inspector::RuleSet;
use crate::scan::jobs::{AliveJob, HarvestJob, ProbeJob};
use crate::scan::sink::{Sink, SinkReport, spawn_sink};
use crate::scan::stats::RunStatistics;

use std::path::PathBuf;
use std::sync::Arc;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub mode: ScanMode,
    #[serde(flatten)]
    pub stats: RunStatistics,
    pub sinks: Vec<SinkReport>,
}

impl ScanReport {
    pub fn sinks_ok(&self) -> bool {
        self.sinks.iter().all(SinkReport::is_ok)
    }

    pub fn sink(&self, name: &str) -> Option<&SinkReport> {
        self.sinks.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub output: PathBuf,
    pub audit: Option<PathBuf>,
    pub keep_pages: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub output: PathBuf,
    pub endpoints: Vec<String>,
    pub marker: String,
}

#[derive(Debug, Clone)]
pub struct AliveOptions {
    pub output: PathBuf,
    pub excluded_extensions: Vec<String>,
}

pub async fn run_harvest(
    targets: Vec<String>,
    fetcher: Arc<dyn Fetcher>,
    rules: RuleSet,
    options: HarvestOptions,
    dispatcher: &Dispatcher,
) -> ScanReport {
    info!(
        "Harvesting {} page(s) with {} rule(s)",
        targets.len(),
        rules.len()
    );

    let mut open_sinks = Vec::new();
    let (links, links_sink) = spawn_sink(sinks::LINKS, options.output);
    open_sinks.push(links_sink);

    let mut job = HarvestJob::new(fetcher, rules, links);
    if let Some(path) = options.audit {
        let (audit, audit_sink) = spawn_sink(sinks::AUDIT, path);
        open_sinks.push(audit_sink);
        job = job.with_audit(audit);
    }
    if let Some(dir) = options.keep_pages {
        match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => job = job.with_keep_pages(dir),
            Err(e) => warn!("Not keeping pages, cannot create {}: {e}", dir.display()),
        }
    }

    let items = targets.into_iter().map(WorkItem::new).collect();
    let stats = dispatcher.run(items, Arc::new(job)).await;
    close(ScanMode::Harvest, stats, open_sinks).await
}

pub async fn run_probe(
    targets: Vec<String>,
    fetcher: Arc<dyn Fetcher>,
    options: ProbeOptions,
    dispatcher: &Dispatcher,
) -> ScanReport {
    let items = WorkItem::expand(&targets, &options.endpoints);
    info!(
        "Probing {} target(s) x {} endpoint(s)",
        targets.len(),
        options.endpoints.len()
    );

    let (results, results_sink) = spawn_sink(sinks::RESULTS, options.output);
    let job = ProbeJob::new(fetcher, options.marker, results);

    let stats = dispatcher.run(items, Arc::new(job)).await;
    close(ScanMode::Probe, stats, vec![results_sink]).await
}

pub async fn run_alive(
    targets: Vec<String>,
    fetcher: Arc<dyn Fetcher>,
    options: AliveOptions,
    dispatcher: &Dispatcher,
) -> ScanReport {
    let (kept, skipped) = filter_static_assets(targets, &options.excluded_extensions);
    info!(
        "Checking {} link(s), {} skipped",
        kept.len(),
        skipped.len()
    );

    let (alive, alive_sink) = spawn_sink(sinks::ALIVE, options.output);
    let job = AliveJob::new(fetcher, alive);

    let items = kept.into_iter().map(WorkItem::new).collect();
    let mut stats = dispatcher.run(items, Arc::new(job)).await;
    stats.skipped = skipped.len();
    close(ScanMode::Alive, stats, vec![alive_sink]).await
}

/// Every task has been joined and the job dropped by the time this runs, so
/// awaiting the sinks only waits for their final drain and flush.
async fn close(mode: ScanMode, stats: RunStatistics, open_sinks: Vec<Sink>) -> ScanReport {
    let mut reports = Vec::with_capacity(open_sinks.len());
    for sink in open_sinks {
        let report = sink.finish().await;
        if let Some(ref e) = report.error {
            warn!("Sink '{}' ({}) reported: {e}", report.name, report.path.display());
        }
        reports.push(report);
    }

    info!(
        "{mode} finished: {} matched, {} unmatched, {} failed in {:?}",
        stats.matched, stats.unmatched, stats.failed, stats.elapsed
    );

    ScanReport {
        mode,
        stats,
        sinks: reports,
    }
}
