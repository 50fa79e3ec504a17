//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::constants::{defaults, harvest, liveness, output_formats, probe, timeouts};
use crate::core::error::{Result, SweepError};
use crate::core::types::ScanMode;
use crate::scan::inspector::OverlapPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timeout in seconds for every HTTP request
    pub timeout: Option<u64>,

    /// Maximum tasks in flight (0 = one task per item with no ceiling)
    pub concurrency: Option<usize>,

    /// Delay between task submissions in milliseconds
    pub submit_delay: Option<u64>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// HTTP/HTTPS proxy URL
    pub proxy: Option<String>,

    /// Verify TLS certificates (off by default so self-signed hosts can be scanned)
    pub verify_tls: Option<bool>,

    /// Extra literal domains tracked by the harvest scan
    pub domains: Option<Vec<String>>,

    /// Extra regex patterns tracked by the harvest scan
    pub patterns: Option<Vec<String>>,

    /// Track only `domains` and `patterns`, not the built-in domain list
    pub only_custom: Option<bool>,

    /// How links matched by several rules are reported ("per-rule" or "distinct")
    pub overlap: Option<String>,

    /// Endpoints appended to every base URL by the probe scan
    pub endpoints: Option<Vec<String>>,

    /// Marker uploaded and read back by the probe scan
    pub marker: Option<String>,

    /// Path extensions skipped by the liveness scan
    pub exclude_extensions: Option<Vec<String>>,

    /// Summary format (text, json, minimal)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Some(timeouts::DEFAULT_TIMEOUT_SECONDS),
            concurrency: None, // Will default to a multiple of the CPU core count
            submit_delay: None, // Mode-specific default
            user_agent: None,
            proxy: None,
            verify_tls: Some(false),
            domains: None,
            patterns: None,
            only_custom: Some(false),
            overlap: Some(OverlapPolicy::PerRule.as_str().to_string()),
            endpoints: None,
            marker: None,
            exclude_extensions: None,
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            SweepError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(defaults::CONFIG_FILE_NAME) {
            return config;
        }

        // Parent directories, up to 3 levels
        for i in 1..=3 {
            let path = format!("{}{}", "../".repeat(i), defaults::CONFIG_FILE_NAME);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Network
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        if let Some(ref proxy) = cli_config.proxy {
            self.proxy = Some(proxy.clone());
        }
        if cli_config.verify_tls {
            self.verify_tls = Some(true);
        }

        // Dispatch
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(submit_delay) = cli_config.submit_delay {
            self.submit_delay = Some(submit_delay);
        }

        // Harvest rules
        if let Some(ref domains) = cli_config.domains {
            self.domains = Some(domains.clone());
        }
        if let Some(ref patterns) = cli_config.patterns {
            self.patterns = Some(patterns.clone());
        }
        if cli_config.only_custom {
            self.only_custom = Some(true);
        }
        if let Some(ref overlap) = cli_config.overlap {
            self.overlap = Some(overlap.clone());
        }

        // Probe
        if let Some(ref endpoints) = cli_config.endpoints {
            self.endpoints = Some(endpoints.clone());
        }
        if let Some(ref marker) = cli_config.marker {
            self.marker = Some(marker.clone());
        }

        // Output & format
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS))
    }

    /// Delay between task submissions for the given mode
    pub fn submit_delay_duration(&self, mode: ScanMode) -> Duration {
        let default = match mode {
            ScanMode::Probe => timeouts::DEFAULT_PROBE_SUBMIT_DELAY_MS,
            ScanMode::Harvest | ScanMode::Alive => timeouts::DEFAULT_SUBMIT_DELAY_MS,
        };
        Duration::from_millis(self.submit_delay.unwrap_or(default))
    }

    /// Concurrency ceiling, or `None` when every item may be in flight at once
    pub fn max_in_flight(&self) -> Option<usize> {
        match self.concurrency {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => Some(num_cpus::get() * defaults::IN_FLIGHT_PER_CPU),
        }
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls.unwrap_or(false)
    }

    /// Tracked literal domains in inspection order: built-ins first, then extras
    pub fn tracked_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = if self.only_custom.unwrap_or(false) {
            Vec::new()
        } else {
            harvest::TRACKED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect()
        };

        if let Some(ref extra) = self.domains {
            for domain in extra {
                if !domains.contains(domain) {
                    domains.push(domain.clone());
                }
            }
        }
        domains
    }

    pub fn custom_patterns(&self) -> Vec<String> {
        self.patterns.clone().unwrap_or_default()
    }

    /// Compile custom patterns into regex objects
    ///
    /// Patterns that match the empty string are rejected.
    pub fn compile_patterns(&self) -> Result<Vec<Regex>> {
        let mut compiled = Vec::new();
        if let Some(ref patterns) = self.patterns {
            for pattern in patterns {
                let regex = Regex::new(pattern)?;
                if regex.is_match("") {
                    return Err(SweepError::Config(format!(
                        "Pattern '{pattern}' matches the empty string. Make the link part mandatory."
                    )));
                }
                compiled.push(regex);
            }
        }
        Ok(compiled)
    }

    pub fn overlap_policy(&self) -> Result<OverlapPolicy> {
        match self.overlap.as_deref() {
            None => Ok(OverlapPolicy::default()),
            Some(value) => value.parse(),
        }
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.clone().unwrap_or_else(|| {
            probe::DEFAULT_ENDPOINTS
                .iter()
                .map(|e| e.to_string())
                .collect()
        })
    }

    pub fn marker(&self) -> String {
        self.marker
            .clone()
            .unwrap_or_else(|| probe::DEFAULT_MARKER.to_string())
    }

    /// Lowercased extensions skipped by the liveness scan
    pub fn excluded_extensions(&self) -> Vec<String> {
        match self.exclude_extensions {
            Some(ref exts) => exts.iter().map(|e| e.to_lowercase()).collect(),
            None => liveness::EXCLUDED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(SweepError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(SweepError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(concurrency) = self.concurrency
            && concurrency > defaults::MAX_CONCURRENCY
        {
            return Err(SweepError::Config(format!(
                "Concurrency of {concurrency} is extremely high and may exhaust file descriptors. Use 0 for no ceiling or a smaller value."
            )));
        }

        if let Some(ref endpoints) = self.endpoints {
            if endpoints.is_empty() {
                return Err(SweepError::Config(
                    "Endpoint list cannot be empty.".to_string(),
                ));
            }
            if let Some(bad) = endpoints.iter().find(|e| !e.starts_with('/')) {
                return Err(SweepError::Config(format!(
                    "Endpoint '{bad}' must start with '/'."
                )));
            }
        }

        if let Some(ref marker) = self.marker
            && marker.is_empty()
        {
            return Err(SweepError::Config("Marker cannot be empty.".to_string()));
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(SweepError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        self.overlap_policy()?;
        self.compile_patterns()?;

        if self.only_custom.unwrap_or(false) && self.tracked_domains().is_empty() {
            let has_patterns = self.patterns.as_ref().is_some_and(|p| !p.is_empty());
            if !has_patterns {
                return Err(SweepError::Config(
                    "only_custom requires at least one domain or pattern.".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Network
    pub timeout: Option<u64>,        // --timeout
    pub user_agent: Option<String>,  // --user-agent
    pub proxy: Option<String>,       // --proxy
    pub verify_tls: bool,            // --verify-tls

    // Dispatch
    pub concurrency: Option<usize>, // --concurrency
    pub submit_delay: Option<u64>,  // --submit-delay

    // Harvest rules
    pub domains: Option<Vec<String>>,  // --domain
    pub patterns: Option<Vec<String>>, // --pattern
    pub only_custom: bool,             // --only-custom
    pub overlap: Option<String>,       // --overlap

    // Probe
    pub endpoints: Option<Vec<String>>, // --endpoint
    pub marker: Option<String>,         // --marker

    // Output & format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
