use async_trait::async_trait;
use futures::future::join_all;
use indicatif::ProgressBar;
use log::{debug, error};
use tokio::sync::Semaphore;

use crate::core::constants::defaults;
use crate::core::types::{Outcome, WorkItem};
use crate::scan::stats::{RunStatistics, StatsCollector};

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Limits on how work is handed to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyPolicy {
    /// Ceiling on tasks in flight; `None` means unbounded
    pub max_in_flight: Option<usize>,
    /// Pause between successive submissions
    pub submission_delay: Duration,
}

impl Default for ConcurrencyPolicy {
    fn default() -> Self {
        Self {
            max_in_flight: Some(num_cpus::get() * defaults::IN_FLIGHT_PER_CPU),
            submission_delay: Duration::ZERO,
        }
    }
}

impl ConcurrencyPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_in_flight: None,
            submission_delay: Duration::ZERO,
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> Self {
        self.max_in_flight = max_in_flight.filter(|n| *n > 0);
        self
    }

    pub fn with_submission_delay(mut self, delay: Duration) -> Self {
        self.submission_delay = delay;
        self
    }
}

/// Per-item work executed by the dispatcher. Implementations must not fail
/// the run: any trouble is reported as [`Outcome::Failed`].
#[async_trait]
pub trait ScanJob: Send + Sync {
    async fn execute(&self, item: &WorkItem) -> Outcome;
}

/// Runs one task per work item under a [`ConcurrencyPolicy`] and waits for all
/// of them before returning.
pub struct Dispatcher {
    policy: ConcurrencyPolicy,
    progress: Option<ProgressBar>,
}

impl Dispatcher {
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            policy,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn policy(&self) -> &ConcurrencyPolicy {
        &self.policy
    }

    pub async fn run<J>(&self, items: Vec<WorkItem>, job: Arc<J>) -> RunStatistics
    where
        J: ScanJob + 'static,
    {
        let started = Instant::now();
        let stats = Arc::new(StatsCollector::new());
        let limiter = self.policy.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        debug!(
            "Dispatching {} item(s), max_in_flight={:?}, delay={:?}",
            items.len(),
            self.policy.max_in_flight,
            self.policy.submission_delay
        );

        if let Some(pb) = &self.progress {
            pb.set_length(items.len() as u64);
        }

        let mut targets = Vec::with_capacity(items.len());
        let mut handles = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            if index > 0 && !self.policy.submission_delay.is_zero() {
                tokio::time::sleep(self.policy.submission_delay).await;
            }

            let permit = match &limiter {
                Some(semaphore) => match semaphore.clone().acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => None,
                },
                None => None,
            };

            targets.push(item.target());
            let job = job.clone();
            let stats = stats.clone();
            let progress = self.progress.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = job.execute(&item).await;
                stats.record(outcome, &item.target());
                if let Some(pb) = progress {
                    pb.inc(1);
                }
            }));
        }

        for (target, joined) in targets.iter().zip(join_all(handles).await) {
            if let Err(e) = joined {
                error!("Task for {target} did not complete: {e}");
                stats.record(Outcome::Failed, target);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
            }
        }

        let elapsed = started.elapsed();
        match Arc::try_unwrap(stats) {
            Ok(collector) => collector.finish(elapsed),
            Err(shared) => {
                let mut snapshot = shared.snapshot();
                snapshot.elapsed = elapsed;
                snapshot
            }
        }
    }
}
