// Command-line interface definitions and parsing for urlsweep

use crate::config::CliConfig;
use crate::core::constants::{output_formats, probe};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "urlsweep",
    author,
    version,
    about,
    long_about = None,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Network & Security
    /// Per-request timeout in seconds (default: 10)
    #[arg(
        short = 't',
        long,
        global = true,
        value_name = "SECONDS",
        help_heading = "Network & Security"
    )]
    pub timeout: Option<u64>,

    /// Fixed User-Agent header (probe rotates browser agents otherwise)
    #[arg(long, global = true, value_name = "AGENT", help_heading = "Network & Security")]
    pub user_agent: Option<String>,

    /// HTTP/HTTPS proxy URL
    #[arg(long, global = true, value_name = "URL", help_heading = "Network & Security")]
    pub proxy: Option<String>,

    /// Verify TLS certificates (accepted unverified by default)
    #[arg(long, global = true, help_heading = "Network & Security")]
    pub verify_tls: bool,

    // Dispatch
    /// Tasks in flight at once, 0 for unbounded (default: CPU cores x 8)
    #[arg(long, global = true, value_name = "COUNT", help_heading = "Dispatch")]
    pub concurrency: Option<usize>,

    /// Pause between task submissions in ms (default: 10 for probe, 0 otherwise)
    #[arg(long, global = true, value_name = "MS", help_heading = "Dispatch")]
    pub submit_delay: Option<u64>,

    // Output & Verbosity
    /// Suppress the summary and progress output
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Summary format
    #[arg(long, global = true, value_name = "FORMAT", value_parser = output_formats::ALL, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Disable progress bars
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, global = true, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect links to tracked domains from each page's source
    Harvest {
        /// File with one URL per line
        #[arg(short = 'l', long, value_name = "FILE")]
        links: String,

        /// File receiving one matched link per line
        #[arg(short = 'o', long, value_name = "FILE")]
        output: String,

        /// Also write a "Downloaded URL" block per page with matches
        #[arg(short = 's', long, value_name = "FILE")]
        save: Option<String>,

        /// Keep every downloaded page in this directory
        #[arg(long, value_name = "DIR")]
        keep_pages: Option<String>,

        /// Extra tracked domain (repeatable)
        #[arg(long = "domain", value_name = "DOMAIN")]
        domains: Vec<String>,

        /// Extra link pattern as a regex (repeatable)
        #[arg(long = "pattern", value_name = "REGEX")]
        patterns: Vec<String>,

        /// Use only --domain/--pattern rules, not the built-in domains
        #[arg(long)]
        only_custom: bool,

        /// How a link matching several rules is reported
        #[arg(long, value_name = "POLICY", value_parser = ["per-rule", "distinct"])]
        overlap: Option<String>,
    },
    /// Upload a marker to fixed endpoints and report those that echo it back
    Probe {
        /// File with one base URL per line
        #[arg(short = 'f', long, value_name = "FILE")]
        file: String,

        /// File receiving one confirmed endpoint URL per line
        #[arg(short = 'o', long, value_name = "FILE", default_value = probe::DEFAULT_RESULTS_FILE)]
        output: String,

        /// Endpoint path to probe (repeatable, replaces the defaults)
        #[arg(long = "endpoint", value_name = "PATH")]
        endpoints: Vec<String>,

        /// Marker uploaded and searched for
        #[arg(long, value_name = "TEXT")]
        marker: Option<String>,
    },
    /// Keep only links answering HEAD with 200
    Alive {
        /// File with one URL per line
        #[arg(short = 'l', long, value_name = "FILE")]
        links: String,

        /// File receiving one live URL per line
        #[arg(short = 'o', long, value_name = "FILE")]
        output: String,
    },
    /// Remove downloaded *.html pages
    Clean {
        /// Directory to clean
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: String,
    },
    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let mut cli_config = CliConfig {
        timeout: cli.timeout,
        user_agent: cli.user_agent.clone(),
        proxy: cli.proxy.clone(),
        verify_tls: cli.verify_tls,
        concurrency: cli.concurrency,
        submit_delay: cli.submit_delay,
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_format: cli.format.clone(),
        no_progress: cli.no_progress,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
        ..Default::default()
    };

    match cli.command {
        Commands::Harvest {
            ref domains,
            ref patterns,
            only_custom,
            ref overlap,
            ..
        } => {
            cli_config.domains = non_empty(domains);
            cli_config.patterns = non_empty(patterns);
            cli_config.only_custom = only_custom;
            cli_config.overlap = overlap.clone();
        }
        Commands::Probe {
            ref endpoints,
            ref marker,
            ..
        } => {
            cli_config.endpoints = non_empty(endpoints);
            cli_config.marker = marker.clone();
        }
        Commands::Alive { .. } | Commands::Clean { .. } | Commands::Completions { .. } => {}
    }

    cli_config
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if values.is_empty() { None } else { Some(values) }
}
