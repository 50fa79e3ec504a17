use async_trait::async_trait;

use crate::core::types::{Classification, Outcome, WorkItem};
use crate::reporting::logging::log_target_result;
use crate::scan::dispatcher::ScanJob;
use crate::scan::fetcher::{FetchPlan, Fetcher};
use crate::scan::inspector::classify_status;
use crate::scan::sink::SinkHandle;

use std::sync::Arc;

/// HEAD each URL and keep those answering 200.
pub struct AliveJob {
    fetcher: Arc<dyn Fetcher>,
    alive: SinkHandle,
}

impl AliveJob {
    pub fn new(fetcher: Arc<dyn Fetcher>, alive: SinkHandle) -> Self {
        Self { fetcher, alive }
    }
}

#[async_trait]
impl ScanJob for AliveJob {
    async fn execute(&self, item: &WorkItem) -> Outcome {
        let target = item.target();
        let result = self.fetcher.fetch(&target, &FetchPlan::Head).await;

        if let Some(ref err) = result.error {
            log_target_result(&target, Outcome::Failed, &err.to_string());
            return Outcome::Failed;
        }

        let status = result.status.map(|s| s.to_string()).unwrap_or_default();
        match classify_status(result.status) {
            Classification::Matched => {
                self.alive.send(target.clone());
                log_target_result(&target, Outcome::Matched, &status);
                Outcome::Matched
            }
            Classification::NoMatch => {
                log_target_result(&target, Outcome::Unmatched, &status);
                Outcome::Unmatched
            }
        }
    }
}
