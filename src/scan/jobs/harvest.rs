use async_trait::async_trait;
use log::warn;

use crate::core::types::{Outcome, WorkItem};
use crate::reporting::logging::log_target_result;
use crate::scan::dispatcher::ScanJob;
use crate::scan::fetcher::{FetchPlan, Fetcher};
use crate::scan::inspector::RuleSet;
use crate::scan::pages::save_page;
use crate::scan::sink::SinkHandle;

use std::path::PathBuf;
use std::sync::Arc;

/// GET each page and stream every tracked link it contains.
pub struct HarvestJob {
    fetcher: Arc<dyn Fetcher>,
    rules: RuleSet,
    links: SinkHandle,
    audit: Option<SinkHandle>,
    keep_pages: Option<PathBuf>,
}

impl HarvestJob {
    pub fn new(fetcher: Arc<dyn Fetcher>, rules: RuleSet, links: SinkHandle) -> Self {
        Self {
            fetcher,
            rules,
            links,
            audit: None,
            keep_pages: None,
        }
    }

    pub fn with_audit(mut self, audit: SinkHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_keep_pages(mut self, dir: PathBuf) -> Self {
        self.keep_pages = Some(dir);
        self
    }
}

/// One audit block per page with matches.
pub fn audit_entry(url: &str, links: &[String]) -> String {
    format!(
        "Downloaded URL: {url}\nFiltered links: {}\n",
        links.join(", ")
    )
}

#[async_trait]
impl ScanJob for HarvestJob {
    async fn execute(&self, item: &WorkItem) -> Outcome {
        let target = item.target();
        let result = self.fetcher.fetch(&target, &FetchPlan::Get).await;

        if let Some(ref err) = result.error {
            log_target_result(&target, Outcome::Failed, &err.to_string());
            return Outcome::Failed;
        }

        if let Some(ref dir) = self.keep_pages
            && let Err(e) = save_page(dir, &target, &result.body).await
        {
            warn!("Could not keep page for {target}: {e}");
        }

        let body = result.body_text();
        let mut found = Vec::new();
        for record in self.rules.inspect(&target, &body) {
            if let Some(link) = record.fragment {
                self.links.send(link.clone());
                found.push(link);
            }
        }

        if found.is_empty() {
            log_target_result(&target, Outcome::Unmatched, "no tracked links");
            return Outcome::Unmatched;
        }

        if let Some(ref audit) = self.audit {
            audit.send(audit_entry(&target, &found));
        }
        log_target_result(
            &target,
            Outcome::Matched,
            &format!("{} link(s)", found.len()),
        );
        Outcome::Matched
    }
}
