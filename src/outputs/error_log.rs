//! Append-only `errors.log`: two lines per failed conversion, the URL and
//! the converter's first diagnostic line.

use crate::error::{GrabError, Result};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

pub const ERROR_LOG_FILE: &str = "errors.log";

/// Append one failure record to the log at `path`, creating it if needed.
///
/// # Arguments
///
/// * `path` - The `errors.log` file
/// * `url` - The link that failed to convert
/// * `first_error_line` - The converter's first diagnostic line; embedded
///   newlines are flattened to spaces
///
/// # Errors
///
/// Returns [`GrabError::Io`] if the log cannot be opened or written.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), %url))]
pub async fn append_failure(path: &Path, url: &str, first_error_line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| GrabError::io(path, e))?;
    // exactly two lines per record
    let record = format!("{url}\n{}\n", first_error_line.replace(['\r', '\n'], " "));
    file.write_all(record.as_bytes())
        .await
        .map_err(|e| GrabError::io(path, e))?;
    file.flush().await.map_err(|e| GrabError::io(path, e))?;
    debug!("Logged conversion failure");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_two_lines_per_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(ERROR_LOG_FILE);
        append_failure(&path, "https://a.example/1", "connection refused")
            .await
            .unwrap();
        append_failure(&path, "https://a.example/2", "Server returned status code 404")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://a.example/1\nconnection refused\nhttps://a.example/2\nServer returned status code 404\n"
        );
    }

    #[tokio::test]
    async fn test_keeps_existing_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(ERROR_LOG_FILE);
        std::fs::write(&path, "https://old\nold error\n").unwrap();
        append_failure(&path, "https://new", "boom").await.unwrap();
        let log = std::fs::read_to_string(&path).unwrap();
        assert!(log.starts_with("https://old\nold error\n"));
        assert_eq!(log.lines().count(), 4);
    }
}
