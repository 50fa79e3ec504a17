use log::debug;
use reqwest::Url;

use crate::core::error::{Result, SweepError};

use std::fs;
use std::path::Path;

/// Read one URL per line, trimming whitespace and dropping blank lines.
///
/// No URL validation happens here; malformed entries fail later, per target,
/// when they are fetched.
pub fn read_targets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SweepError::FileNotFound(path.display().to_string()));
    }

    // Lines are decoded one by one so a stray invalid byte only spoils its own line
    let content = fs::read(path)?;
    let targets: Vec<String> = content
        .split(|b| *b == b'\n')
        .map(String::from_utf8_lossy)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    debug!("Read {} target(s) from {}", targets.len(), path.display());
    Ok(targets)
}

/// Split targets into those worth a liveness check and those skipped.
///
/// A target is skipped when it does not parse as a URL or when its path ends
/// with one of `excluded` (compared case-insensitively). Returns `(kept, skipped)`,
/// each in input order.
pub fn filter_static_assets(
    targets: Vec<String>,
    excluded: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::with_capacity(targets.len());
    let mut skipped = Vec::new();

    for target in targets {
        if is_static_asset(&target, excluded) {
            debug!("Skipping {target}");
            skipped.push(target);
        } else {
            kept.push(target);
        }
    }

    (kept, skipped)
}

fn is_static_asset(target: &str, excluded: &[String]) -> bool {
    match Url::parse(target) {
        Ok(url) => {
            let path = url.path().to_lowercase();
            excluded.iter().any(|ext| path.ends_with(ext.as_str()))
        }
        Err(_) => true,
    }
}
