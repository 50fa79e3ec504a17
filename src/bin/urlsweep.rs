use clap::{CommandFactory, Parser};
use urlsweep::config::{CliConfig, Config};
use urlsweep::core::constants::output_formats;
use urlsweep::core::types::ScanMode;
use urlsweep::discovery::read_targets;
use urlsweep::reporting::logging;
use urlsweep::reporting::{display_clean_summary, display_summary};
use urlsweep::scan::{
    AliveOptions, ConcurrencyPolicy, Dispatcher, FetchSettings, Fetcher, HarvestOptions,
    HttpFetcher, ProbeOptions, RuleSet, ScanReport, remove_downloaded_pages,
    run_alive, run_harvest, run_probe,
};
use urlsweep::ui::completion::print_completions;
use urlsweep::ui::{Cli, Commands, ProgressReporter, cli_to_config};

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    match run_urlsweep_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut app = Cli::command();
            print_completions(shell, &mut app);
            Some(0)
        }
        _ => None,
    }
}

/// Main scan logic extracted from main() for testing
pub async fn run_urlsweep_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);
    let config = load_and_merge_config(&cli_config)?;

    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);

    let report = match cli.command {
        Commands::Clean { ref dir } => {
            let removed = remove_downloaded_pages(Path::new(dir));
            if !output_settings.quiet {
                display_clean_summary(Path::new(dir), removed, &output_settings.output_format);
            }
            return Ok(0);
        }
        Commands::Completions { .. } => return Ok(0),
        Commands::Harvest {
            ref links,
            ref output,
            ref save,
            ref keep_pages,
            ..
        } => {
            let targets = load_targets(links)?;
            let rules = RuleSet::from_config(&config)?;
            let fetcher = build_fetcher(&config, ScanMode::Harvest)?;
            let options = HarvestOptions {
                output: PathBuf::from(output),
                audit: save.as_ref().map(PathBuf::from),
                keep_pages: keep_pages.as_ref().map(PathBuf::from),
            };

            let mut progress = ProgressReporter::new(output_settings.show_progress);
            let dispatcher = build_dispatcher(&config, ScanMode::Harvest, &mut progress, targets.len());
            let report = run_harvest(targets, fetcher, rules, options, &dispatcher).await;
            finish_progress(&progress, &report);
            report
        }
        Commands::Probe {
            ref file,
            ref output,
            ..
        } => {
            let targets = load_targets(file)?;
            let endpoints = config.endpoints();
            let fetcher = build_fetcher(&config, ScanMode::Probe)?;
            let total = targets.len() * endpoints.len();
            let options = ProbeOptions {
                output: PathBuf::from(output),
                endpoints,
                marker: config.marker(),
            };

            let mut progress = ProgressReporter::new(output_settings.show_progress);
            let dispatcher = build_dispatcher(&config, ScanMode::Probe, &mut progress, total);
            let report = run_probe(targets, fetcher, options, &dispatcher).await;
            finish_progress(&progress, &report);
            report
        }
        Commands::Alive {
            ref links,
            ref output,
        } => {
            let targets = load_targets(links)?;
            let fetcher = build_fetcher(&config, ScanMode::Alive)?;
            let options = AliveOptions {
                output: PathBuf::from(output),
                excluded_extensions: config.excluded_extensions(),
            };

            let mut progress = ProgressReporter::new(output_settings.show_progress);
            let dispatcher = build_dispatcher(&config, ScanMode::Alive, &mut progress, targets.len());
            let report = run_alive(targets, fetcher, options, &dispatcher).await;
            finish_progress(&progress, &report);
            report
        }
    };

    logging::log_sink_reports(&report.sinks);
    if !output_settings.quiet {
        display_summary(&report, &output_settings.output_format);
    }

    // A finished run succeeds even when every target failed
    Ok(0)
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Settings for output formatting and display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub output_format: String,
    pub show_progress: bool,
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let output_format = config.output_format().to_string();
    let show_progress =
        !quiet && !cli_config.no_progress && output_format == output_formats::TEXT;

    OutputSettings {
        quiet,
        verbose: config.verbose.unwrap_or(false),
        output_format,
        show_progress,
    }
}

fn load_targets(path: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let targets = read_targets(path).inspect_err(|e| {
        logging::log_error(&format!("Could not read targets from '{path}'"), Some(e));
    })?;
    logging::log_targets_loaded(path, targets.len());
    Ok(targets)
}

fn build_fetcher(
    config: &Config,
    mode: ScanMode,
) -> Result<Arc<dyn Fetcher>, Box<dyn std::error::Error>> {
    logging::log_config_info(config, mode);
    let settings = FetchSettings::from_config(config, mode == ScanMode::Probe);
    Ok(Arc::new(HttpFetcher::new(&settings)?))
}

fn build_dispatcher(
    config: &Config,
    mode: ScanMode,
    progress: &mut ProgressReporter,
    total: usize,
) -> Dispatcher {
    let policy = ConcurrencyPolicy::unbounded()
        .with_max_in_flight(config.max_in_flight())
        .with_submission_delay(config.submit_delay_duration(mode));

    let dispatcher = Dispatcher::new(policy);
    match progress.start_scan(mode, total) {
        Some(pb) => dispatcher.with_progress(pb),
        None => dispatcher,
    }
}

fn finish_progress(progress: &ProgressReporter, report: &ScanReport) {
    progress.finish_scan(report.stats.matched, report.stats.total());
    progress.finish_and_clear();
}
