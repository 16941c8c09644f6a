//! Helpers for URL resolution, log truncation and output-directory checks.

use crate::error::{GrabError, Result};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Resolve an `href` scraped from `base` into an absolute http(s) URL.
///
/// Handles absolute, protocol-relative (`//host/path`) and root-relative
/// (`/path`) forms. Anything that does not end up as http or https
/// (`mailto:`, `javascript:`, fragments) yields `None`.
pub fn absolutize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    match base.join(href) {
        Ok(resolved) if matches!(resolved.scheme(), "http" | "https") => Some(resolved.into()),
        Ok(resolved) => {
            debug!(%href, scheme = resolved.scheme(), "Dropping non-http link");
            None
        }
        Err(e) => {
            debug!(%href, error = %e, "Dropping unresolvable link");
            None
        }
    }
}

/// First non-empty line of `text`, trimmed.
pub fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (on a char boundary) with an ellipsis
/// and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a
/// probe file.
///
/// # Arguments
///
/// * `path` - The directory to create or validate
///
/// # Errors
///
/// Returns [`GrabError::Io`] if:
/// - The directory cannot be created
/// - The probe file cannot be written (permission denied, read-only filesystem)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| GrabError::io(path, e))?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path).map_err(|e| GrabError::io(path, e))?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
