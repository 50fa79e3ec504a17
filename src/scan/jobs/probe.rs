use async_trait::async_trait;

use crate::core::types::{Outcome, WorkItem};
use crate::reporting::logging::log_target_result;
use crate::scan::dispatcher::ScanJob;
use crate::scan::fetcher::{FetchPlan, Fetcher, Payload};
use crate::scan::inspector::inspect_marker;
use crate::scan::sink::SinkHandle;

use std::sync::Arc;

/// Upload the marker to `url + endpoint`, read it back and record the
/// target when the marker comes back.
pub struct ProbeJob {
    fetcher: Arc<dyn Fetcher>,
    marker: String,
    results: SinkHandle,
}

impl ProbeJob {
    pub fn new(fetcher: Arc<dyn Fetcher>, marker: impl Into<String>, results: SinkHandle) -> Self {
        Self {
            fetcher,
            marker: marker.into(),
            results,
        }
    }
}

#[async_trait]
impl ScanJob for ProbeJob {
    async fn execute(&self, item: &WorkItem) -> Outcome {
        let target = item.target();
        let payload = Payload::for_endpoint(item.endpoint().unwrap_or_default(), &self.marker);
        let result = self
            .fetcher
            .fetch(&target, &FetchPlan::WriteThenRead(payload))
            .await;

        if let Some(ref err) = result.error {
            log_target_result(&target, Outcome::Failed, &err.to_string());
            return Outcome::Failed;
        }

        let record = inspect_marker(&target, &result.body, &self.marker);
        if record.is_match() {
            self.results.send(target.clone());
            log_target_result(&target, Outcome::Matched, "marker echoed");
            Outcome::Matched
        } else {
            let status = result.status.map(|s| s.to_string()).unwrap_or_default();
            log_target_result(&target, Outcome::Unmatched, &status);
            Outcome::Unmatched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FetchError, FetchResult};
    use crate::scan::sink::spawn_sink;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Echoes the uploaded payload only for `/echo.txt`; records every plan.
    #[derive(Default)]
    struct EchoOne {
        seen: Mutex<Vec<(String, FetchPlan)>>,
    }

    #[async_trait]
    impl Fetcher for EchoOne {
        async fn fetch(&self, target: &str, plan: &FetchPlan) -> FetchResult {
            self.seen
                .lock()
                .unwrap()
                .push((target.to_string(), plan.clone()));
            if target.starts_with("http://dead.test") {
                return FetchResult::failure(target, FetchError::Timeout);
            }
            match plan {
                FetchPlan::WriteThenRead(payload) if target.ends_with("/echo.txt") => {
                    FetchResult::success(target, 200, payload.body.clone().into_bytes())
                }
                _ => FetchResult::success(target, 404, b"not found".to_vec()),
            }
        }
    }

    #[tokio::test]
    async fn test_marker_echo_is_matched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        let (results, sink) = spawn_sink("results", &path);
        let fetcher = Arc::new(EchoOne::default());
        let job = ProbeJob::new(fetcher.clone(), "bugbountytestingxyz", results);

        let echo = WorkItem::with_endpoint("http://t.test", "/echo.txt");
        let other = WorkItem::with_endpoint("http://t.test", "/other.json");
        let dead = WorkItem::with_endpoint("http://dead.test", "/echo.txt");

        assert_eq!(job.execute(&echo).await, Outcome::Matched);
        assert_eq!(job.execute(&other).await, Outcome::Unmatched);
        assert_eq!(job.execute(&dead).await, Outcome::Failed);
        drop(job);

        assert_eq!(sink.finish().await.records_written, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "http://t.test/echo.txt\n"
        );

        let seen = fetcher.seen.lock().unwrap();
        match &seen[1].1 {
            FetchPlan::WriteThenRead(payload) => {
                assert_eq!(payload.content_type, "application/json");
                assert!(payload.body.contains("bugbountytestingxyz"));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }
}
