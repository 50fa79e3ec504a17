//! Content inspection: link extraction, marker confirmation and status checks.

use memchr::memmem;
use regex::{Matches, Regex};
use rustc_hash::FxHashSet;

use crate::config::Config;
use crate::core::constants::{harvest, http_status};
use crate::core::error::{Result, SweepError};
use crate::core::types::{Classification, MatchRecord};

use std::fmt;
use std::str::FromStr;

/// How a link matched by more than one rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Every rule reports its own matches, so a link carrying two tracked
    /// domains is yielded twice.
    #[default]
    PerRule,
    /// Each distinct link text is yielded once, under the first rule that found it.
    Distinct,
}

impl OverlapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::PerRule => "per-rule",
            OverlapPolicy::Distinct => "distinct",
        }
    }
}

impl FromStr for OverlapPolicy {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "per-rule" => Ok(OverlapPolicy::PerRule),
            "distinct" => Ok(OverlapPolicy::Distinct),
            other => Err(SweepError::Config(format!(
                "Invalid overlap policy '{other}'. Expected one of: per-rule, distinct."
            ))),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One compiled match rule.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    regex: Regex,
}

impl Rule {
    /// A rule matching whole links that contain `domain`.
    pub fn literal(domain: &str) -> Result<Self> {
        let class = harvest::LINK_CHAR_CLASS;
        let pattern = format!("https?://{class}*{}{class}*", regex::escape(domain));
        Ok(Self {
            name: domain.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    /// A rule using `pattern` verbatim.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            name: pattern.to_string(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered set of rules. Order is fixed so output is reproducible.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    overlap: OverlapPolicy,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, overlap: OverlapPolicy) -> Self {
        Self { rules, overlap }
    }

    /// Literal domains first, then raw patterns, each in the given order.
    pub fn from_parts(
        domains: &[String],
        patterns: &[String],
        overlap: OverlapPolicy,
    ) -> Result<Self> {
        let mut rules = Vec::with_capacity(domains.len() + patterns.len());
        for domain in domains {
            rules.push(Rule::literal(domain)?);
        }
        for pattern in patterns {
            rules.push(Rule::pattern(pattern)?);
        }
        Ok(Self::new(rules, overlap))
    }

    /// Rules configured for a harvest run.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_parts(
            &config.tracked_domains(),
            &config.custom_patterns(),
            config.overlap_policy()?,
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.overlap
    }

    /// Lazily scan `content` fetched from `source`.
    pub fn inspect<'a>(&'a self, source: &'a str, content: &'a str) -> Inspection<'a> {
        Inspection {
            rules: &self.rules,
            source,
            content,
            overlap: self.overlap,
            next_rule: 0,
            current: None,
            seen: FxHashSet::default(),
            emitted: false,
            finished: false,
        }
    }
}

/// Inspect `content` with `rules`; see [`RuleSet::inspect`].
pub fn inspect<'a>(source: &'a str, content: &'a str, rules: &'a RuleSet) -> Inspection<'a> {
    rules.inspect(source, content)
}

/// Single-pass iterator over the matches of every rule, in rule order.
///
/// Yields one [`Classification::NoMatch`] record at the end when no rule
/// matched anything.
pub struct Inspection<'a> {
    rules: &'a [Rule],
    source: &'a str,
    content: &'a str,
    overlap: OverlapPolicy,
    next_rule: usize,
    current: Option<(&'a Rule, Matches<'a, 'a>)>,
    seen: FxHashSet<&'a str>,
    emitted: bool,
    finished: bool,
}

impl<'a> Iterator for Inspection<'a> {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<MatchRecord> {
        if self.finished {
            return None;
        }

        loop {
            if let Some((rule, matches)) = self.current.as_mut() {
                for found in matches.by_ref() {
                    let text = found.as_str();
                    if text.is_empty() {
                        continue;
                    }
                    if self.overlap == OverlapPolicy::Distinct && !self.seen.insert(text) {
                        continue;
                    }
                    self.emitted = true;
                    return Some(MatchRecord::matched(self.source, rule.name(), text));
                }
                self.current = None;
            }

            match self.rules.get(self.next_rule) {
                Some(rule) => {
                    self.next_rule += 1;
                    self.current = Some((rule, rule.regex.find_iter(self.content)));
                }
                None => {
                    self.finished = true;
                    return if self.emitted {
                        None
                    } else {
                        Some(MatchRecord::no_match(self.source))
                    };
                }
            }
        }
    }
}

/// Confirm that `marker` appears in `body`.
pub fn inspect_marker(source: &str, body: &[u8], marker: &str) -> MatchRecord {
    if !marker.is_empty() && memmem::find(body, marker.as_bytes()).is_some() {
        MatchRecord::matched(source, marker, source)
    } else {
        MatchRecord::no_match(source)
    }
}

/// Liveness classification: only a 200 counts as alive.
pub fn classify_status(status: Option<u16>) -> Classification {
    match status {
        Some(http_status::OK) => Classification::Matched,
        _ => Classification::NoMatch,
    }
}
