use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::core::types::Outcome;

/// Counters for one run. Every dispatched item lands in exactly one of
/// `matched`, `unmatched` or `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
    /// Inputs dropped before dispatch (never counted as outcomes)
    pub skipped: usize,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
    /// Targets that matched, in completion order
    pub matched_targets: Vec<String>,
}

fn serialize_millis<S: serde::Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl RunStatistics {
    /// Number of dispatched items with a recorded outcome.
    pub fn total(&self) -> usize {
        self.matched + self.unmatched + self.failed
    }

    pub fn record(&mut self, outcome: Outcome, target: &str) {
        match outcome {
            Outcome::Matched => {
                self.matched += 1;
                self.matched_targets.push(target.to_string());
            }
            Outcome::Unmatched => self.unmatched += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}

/// Shared collector updated by every task through one short critical section.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<RunStatistics>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome, target: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(outcome, target);
    }

    pub fn snapshot(&self) -> RunStatistics {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consume the collector, stamping the elapsed wall time.
    pub fn finish(self, elapsed: Duration) -> RunStatistics {
        let mut stats = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        stats.elapsed = elapsed;
        stats
    }
}
