use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::constants::defaults::PAGE_SUFFIX;
use crate::core::error::Result;

use std::path::{Path, PathBuf};

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Failed to compile page name pattern"));

/// File name under which a downloaded page is kept.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, then `.html` is appended.
pub fn page_file_name(url: &str) -> String {
    format!("{}{PAGE_SUFFIX}", UNSAFE_CHARS.replace_all(url, "_"))
}

/// Store a page body in `dir`, returning the written path.
pub async fn save_page(dir: &Path, url: &str, body: &[u8]) -> Result<PathBuf> {
    let path = dir.join(page_file_name(url));
    tokio::fs::write(&path, body).await?;
    debug!("Saved {url} to {}", path.display());
    Ok(path)
}

/// Delete every `*.html` file directly inside `dir`.
///
/// Best effort: a missing directory or an undeletable file is logged and
/// skipped. Returns how many files were removed, so a second call returns 0.
pub fn remove_downloaded_pages(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Nothing to clean in {}: {e}", dir.display());
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_page = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(PAGE_SUFFIX));
        if !is_page {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Could not remove {}: {e}", path.display()),
        }
    }
    removed
}
