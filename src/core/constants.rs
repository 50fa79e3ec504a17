/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes the fixed domain lists, probe payloads, timeouts
/// and output formats used across the scan modes.
/// Output format constants
pub mod output_formats {
    /// Text output format - colorful summary with sink destinations
    pub const TEXT: &str = "text";
    /// JSON output format - structured output for automation
    pub const JSON: &str = "json";
    /// Minimal output format - a single key=value line
    pub const MINIMAL: &str = "minimal";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TEXT, JSON, MINIMAL];
}

/// HTTP status code constants
pub mod http_status {
    /// HTTP 200 OK - the only status the liveness check treats as alive
    pub const OK: u16 = 200;
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default per-request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
    /// Maximum accepted timeout in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;
    /// Default delay between task submissions for probe scans
    pub const DEFAULT_PROBE_SUBMIT_DELAY_MS: u64 = 10;
    /// Default delay between task submissions for the other modes
    pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 0;
}

/// Default configuration values
pub mod defaults {
    /// In-flight tasks allowed per CPU core when no ceiling is configured
    pub const IN_FLIGHT_PER_CPU: usize = 8;
    /// Largest accepted concurrency ceiling
    pub const MAX_CONCURRENCY: usize = 10_000;
    /// Redirects followed before a fetch is reported as failed
    pub const REDIRECT_LIMIT: usize = 10;
    /// File name of the configuration file searched for in standard locations
    pub const CONFIG_FILE_NAME: &str = ".urlsweep.toml";
    /// Suffix given to pages kept on disk by the harvest scan
    pub const PAGE_SUFFIX: &str = ".html";
}

/// Link harvesting rules
pub mod harvest {
    /// Tracked domains, tried in this order for every page.
    pub const TRACKED_DOMAINS: [&str; 32] = [
        "facebook.com",
        "twitter.com",
        "instagram.com",
        "linkedin.com",
        "youtube.com",
        "snapchat.com",
        "pinterest.com",
        "reddit.com",
        "tiktok.com",
        "tumblr.com",
        "whatsapp.com",
        "wechat.com",
        "telegram.org",
        "vimeo.com",
        "medium.com",
        "periscope.tv",
        "twitch.tv",
        "discord.com",
        "mastodon.social",
        "bandcamp.com",
        "vk.com",
        "github.com",
        "livejournal.com",
        "xing.com",
        "t.me",
        "linkin.bio",
        "threads.com",
        "bit.ly",
        "tinyurl.com",
        "github.io",
        "linktr.ee",
        "onelink.bio",
    ];

    /// Characters allowed around a tracked domain inside one link.
    pub const LINK_CHAR_CLASS: &str = r#"[^\s"'<>]"#;
}

/// Upload probe payloads
pub mod probe {
    /// Endpoints appended to every base URL
    pub const DEFAULT_ENDPOINTS: [&str; 3] = [
        "/bugbountytesting.txt",
        "/upload/bugbountytesting.txt",
        "/bugbountytesting.json",
    ];
    /// Content uploaded and then looked for in the read-back body
    pub const DEFAULT_MARKER: &str = "bugbountytestingxyz";
    /// Endpoints with this suffix receive a JSON payload
    pub const JSON_SUFFIX: &str = ".json";
    /// Default results file for probe scans
    pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

    /// Browser user agents rotated across probe targets
    pub const USER_AGENTS: [&str; 4] = [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
    ];
}

/// Liveness filtering
pub mod liveness {
    /// Static-asset extensions skipped before dispatch
    pub const EXCLUDED_EXTENSIONS: [&str; 15] = [
        ".png", ".gif", ".webp", ".bmp", ".pdf", ".psd", ".jpg", ".jpeg", ".tiff", ".eps", ".ai",
        ".raw", ".indd", ".css", ".js",
    ];
}

/// Sink names used in logs and summaries
pub mod sinks {
    pub const LINKS: &str = "links";
    pub const AUDIT: &str = "audit";
    pub const RESULTS: &str = "results";
    pub const ALIVE: &str = "alive";
}

/// Error message constants
pub mod error_messages {
    /// Timeout error message reported for a failed fetch
    pub const OPERATION_TIMED_OUT: &str = "operation timed out";
    /// Unknown error fallback
    pub const UNKNOWN_ERROR: &str = "Unknown error";
}
