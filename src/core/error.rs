use std::fmt;

/// Error types for urlsweep operations that can stop a run.
///
/// Per-target network failures are not represented here; they are carried
/// as [`crate::core::types::FetchError`] inside a fetch result.
#[derive(Debug)]
pub enum SweepError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// HTTP client construction error
    Http(reqwest::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// File not found error
    FileNotFound(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Io(err) => write!(f, "IO error: {err}"),
            SweepError::Config(msg) => write!(f, "Configuration error: {msg}"),
            SweepError::Http(err) => write!(f, "HTTP error: {err}"),
            SweepError::Regex(err) => write!(f, "Regex error: {err}"),
            SweepError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            SweepError::FileNotFound(path) => write!(f, "File not found: {path}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Io(err) => Some(err),
            SweepError::Http(err) => Some(err),
            SweepError::Regex(err) => Some(err),
            SweepError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SweepError {
    fn from(err: std::io::Error) -> Self {
        SweepError::Io(err)
    }
}

impl From<reqwest::Error> for SweepError {
    fn from(err: reqwest::Error) -> Self {
        SweepError::Http(err)
    }
}

impl From<regex::Error> for SweepError {
    fn from(err: regex::Error) -> Self {
        SweepError::Regex(err)
    }
}

impl From<toml::de::Error> for SweepError {
    fn from(err: toml::de::Error) -> Self {
        SweepError::TomlParsing(err)
    }
}

/// Type alias for Results using SweepError
pub type Result<T> = std::result::Result<T, SweepError>;
