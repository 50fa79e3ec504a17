use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use crate::core::types::ScanMode;

pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    scan_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::new()),
            scan_progress: None,
            enabled,
        }
    }

    /// Start the per-task bar; the returned handle is what the dispatcher advances.
    pub fn start_scan(&mut self, mode: ScanMode, total: usize) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = self.multi_progress.add(ProgressBar::new(total as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message(match mode {
            ScanMode::Harvest => "pages harvested",
            ScanMode::Probe => "endpoints probed",
            ScanMode::Alive => "links checked",
        });
        pb.enable_steady_tick(Duration::from_millis(120));
        self.scan_progress = Some(pb.clone());
        Some(pb)
    }

    pub fn finish_scan(&self, matched: usize, total: usize) {
        if let Some(ref pb) = self.scan_progress {
            pb.finish_with_message(format!("✓ done ({matched}/{total} matched)"));
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }
}
