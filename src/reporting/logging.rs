use crate::config::Config;
use crate::core::types::{Outcome, ScanMode};
use crate::scan::sink::SinkReport;
use log::{debug, error, info, warn};

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = logger_builder(verbose, quiet).build().filter();
    let _ = logger_builder(verbose, quiet).try_init();

    debug!("Logger initialized with level: {level:?}");
}

/// `--verbose` sets the default level and `RUST_LOG` overrides it; `--quiet` silences both.
fn logger_builder(verbose: bool, quiet: bool) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    if quiet {
        builder.filter_level(log::LevelFilter::Off);
    } else {
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Off // Console summary is the default output
        };
        builder.filter_level(level).parse_default_env();
    }

    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    builder
}

/// Log the settings a run starts with
pub fn log_config_info(config: &Config, mode: ScanMode) {
    let in_flight = config
        .max_in_flight()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unbounded".to_string());

    info!(
        "Configuration: mode={mode}, timeout={}s, max_in_flight={in_flight}, submit_delay={:?}",
        config.timeout_duration().as_secs(),
        config.submit_delay_duration(mode)
    );
    info!(
        "HTTP: verify_tls={}, proxy={}",
        config.verify_tls(),
        config.proxy.as_deref().unwrap_or("none")
    );
    if mode == ScanMode::Harvest {
        info!(
            "Rules: {} domain(s), {} pattern(s), overlap={}",
            config.tracked_domains().len(),
            config.custom_patterns().len(),
            config.overlap.as_deref().unwrap_or("per-rule")
        );
    }
}

/// Log input loading
pub fn log_targets_loaded(path: &str, count: usize) {
    info!("Loaded {count} target(s) from {path}");
}

/// Per-target result line
pub fn log_target_result(target: &str, outcome: Outcome, detail: &str) {
    match outcome {
        Outcome::Matched => debug!("✓ {target} -> {detail}"),
        Outcome::Unmatched => debug!("· {target} -> {detail}"),
        Outcome::Failed => debug!("✗ {target} -> {detail}"),
    }
}

/// Log sink problems once a run has closed its outputs
pub fn log_sink_reports(reports: &[SinkReport]) {
    for report in reports {
        match report.error {
            Some(ref e) => warn!(
                "Sink '{}' ({}) failed after {} record(s): {e}",
                report.name,
                report.path.display(),
                report.records_written
            ),
            None => debug!(
                "Sink '{}' wrote {} record(s) to {}",
                report.name,
                report.records_written,
                report.path.display()
            ),
        }
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}
