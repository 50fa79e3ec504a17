use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use crate::core::constants::error_messages;

/// One unit of input work: a base URL, optionally paired with a probe endpoint.
///
/// A `WorkItem` is created from the input list and consumed by exactly one
/// dispatched task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    url: String,
    endpoint: Option<String>,
}

impl WorkItem {
    /// Create a work item that targets the URL itself.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            endpoint: None,
        }
    }

    /// Create a work item that targets `url` followed by `endpoint`.
    pub fn with_endpoint(url: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Build one item per URL, or one per URL x endpoint pair when endpoints are given.
    ///
    /// URLs keep their input order; endpoints keep theirs within each URL.
    pub fn expand(urls: &[String], endpoints: &[String]) -> Vec<WorkItem> {
        if endpoints.is_empty() {
            return urls.iter().map(WorkItem::new).collect();
        }

        let mut items = Vec::with_capacity(urls.len() * endpoints.len());
        for url in urls {
            for endpoint in endpoints {
                items.push(WorkItem::with_endpoint(url.clone(), endpoint.clone()));
            }
        }
        items
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The address actually requested for this item.
    pub fn target(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}{}", self.url.trim_end_matches('/'), endpoint),
            None => self.url.clone(),
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.target())
    }
}

/// Why a single fetch failed. Never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The target is not a valid absolute URL
    InvalidUrl(String),
    /// The request exceeded the configured timeout
    Timeout,
    /// DNS, connect or TLS failure
    Connect(String),
    /// The status arrived but the body could not be read
    Body(String),
    /// Any other request failure
    Request(String),
}

impl FetchError {
    /// Classify a transport error into a fetch failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let detail = std::error::Error::source(err)
            .map(|e| e.to_string())
            .unwrap_or_else(|| err.to_string());

        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(detail)
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(detail)
        } else {
            FetchError::Request(detail)
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(detail) => write!(f, "invalid URL: {detail}"),
            FetchError::Timeout => write!(f, "{}", error_messages::OPERATION_TIMED_OUT),
            FetchError::Connect(detail) => write!(f, "connection failed: {detail}"),
            FetchError::Body(detail) => write!(f, "unreadable body: {detail}"),
            FetchError::Request(detail) if detail.is_empty() => {
                write!(f, "{}", error_messages::UNKNOWN_ERROR)
            }
            FetchError::Request(detail) => write!(f, "request failed: {detail}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Raw outcome of the network I/O performed for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub target: String,
    pub status: Option<u16>,
    pub body: Vec<u8>,
    pub error: Option<FetchError>,
}

impl FetchResult {
    pub fn success(target: impl Into<String>, status: u16, body: Vec<u8>) -> Self {
        Self {
            target: target.into(),
            status: Some(status),
            body,
            error: None,
        }
    }

    pub fn failure(target: impl Into<String>, error: FetchError) -> Self {
        Self {
            target: target.into(),
            status: None,
            body: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Whether inspected content satisfied a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Matched,
    NoMatch,
}

/// A single inspection result for one fetched target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// URL the inspected content came from
    pub source: String,
    /// Rule that produced the match, if any
    pub rule: Option<String>,
    /// Extracted text (a link, or the confirmed target)
    pub fragment: Option<String>,
    pub classification: Classification,
}

impl MatchRecord {
    pub fn matched(
        source: impl Into<String>,
        rule: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            rule: Some(rule.into()),
            fragment: Some(fragment.into()),
            classification: Classification::Matched,
        }
    }

    pub fn no_match(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            rule: None,
            fragment: None,
            classification: Classification::NoMatch,
        }
    }

    pub fn is_match(&self) -> bool {
        self.classification == Classification::Matched
    }
}

/// Terminal outcome of one dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Fetched and satisfied the mode's condition
    Matched,
    /// Fetched but did not satisfy the condition
    Unmatched,
    /// The fetch itself failed
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Outcome::Matched => "matched",
            Outcome::Unmatched => "unmatched",
            Outcome::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// The three scan pipelines built on the shared dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Harvest tracked-domain links from page sources
    Harvest,
    /// Upload a marker to fixed endpoints and read it back
    Probe,
    /// Keep only URLs answering HEAD with 200
    Alive,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Harvest => "harvest",
            ScanMode::Probe => "probe",
            ScanMode::Alive => "alive",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
