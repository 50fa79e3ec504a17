//! End-of-run console summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::constants::output_formats;
use crate::scan::pipeline::ScanReport;
use crate::ui::color::{Colors, colorize};

use std::fmt::Write as _;
use std::path::Path;

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    report: &'a ScanReport,
    finished_at: DateTime<Utc>,
}

/// Print the summary of a finished run.
pub fn display_summary(report: &ScanReport, output_format: &str) {
    println!("{}", render_summary(report, output_format, Utc::now()));
}

/// Render the summary in `text`, `minimal` or `json` form.
pub fn render_summary(report: &ScanReport, output_format: &str, finished_at: DateTime<Utc>) -> String {
    match output_format {
        output_formats::MINIMAL => render_minimal(report),
        output_formats::JSON => render_json(report, finished_at),
        _ => render_text(report),
    }
}

fn render_minimal(report: &ScanReport) -> String {
    let stats = &report.stats;
    format!(
        "mode={} matched={} unmatched={} failed={} skipped={} elapsed_ms={}",
        report.mode,
        stats.matched,
        stats.unmatched,
        stats.failed,
        stats.skipped,
        stats.elapsed.as_millis()
    )
}

fn render_json(report: &ScanReport, finished_at: DateTime<Utc>) -> String {
    let summary = JsonSummary {
        report,
        finished_at,
    };
    serde_json::to_string_pretty(&summary).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn render_text(report: &ScanReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        colorize(&format!("{}Scan complete:{}", Colors::BOLD, Colors::RESET), Colors::BRIGHT_CYAN),
        report.mode
    );
    let _ = writeln!(
        out,
        "  {}: {}",
        colorize("Matched", Colors::BRIGHT_GREEN),
        stats.matched
    );
    let _ = writeln!(out, "  {}: {}", colorize("Not matched", Colors::YELLOW), stats.unmatched);
    let _ = writeln!(out, "  {}: {}", colorize("Failed", Colors::BRIGHT_RED), stats.failed);
    if stats.skipped > 0 {
        let _ = writeln!(out, "  {}: {}", colorize("Skipped", Colors::DIM), stats.skipped);
    }
    let _ = write!(
        out,
        "  {}: {:.2}s",
        colorize("Elapsed", Colors::BRIGHT_CYAN),
        stats.elapsed.as_secs_f64()
    );

    for sink in &report.sinks {
        let _ = write!(
            out,
            "\n  {} {} -> {} ({} record(s))",
            colorize("Output", Colors::BRIGHT_BLUE),
            sink.name,
            sink.path.display(),
            sink.records_written
        );
        if let Some(ref e) = sink.error {
            let _ = write!(out, " {}", colorize(&format!("error: {e}"), Colors::RED));
        }
    }
    out
}

/// Print the result of a `clean` run.
pub fn display_clean_summary(dir: &Path, removed: usize, output_format: &str) {
    println!("{}", render_clean_summary(dir, removed, output_format));
}

pub fn render_clean_summary(dir: &Path, removed: usize, output_format: &str) -> String {
    match output_format {
        output_formats::JSON => serde_json::json!({
            "dir": dir.display().to_string(),
            "removed": removed,
        })
        .to_string(),
        output_formats::MINIMAL => format!("removed={removed}"),
        _ => format!(
            "{}: {removed} page(s) from {}",
            colorize("Removed", Colors::BRIGHT_GREEN),
            dir.display()
        ),
    }
}
