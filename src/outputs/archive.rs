//! Link archive and link-file input.
//!
//! The archive is the newline-joined link list, written once before any
//! conversion so a run can be repeated later with `--textfile`. Link files
//! are read leniently: any line that does not start with `http` is ignored.

use crate::error::{GrabError, Result};
use crate::models::LinkList;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Write `links` to `{output_dir}/{file_name}`, replacing any earlier archive.
///
/// Links are joined with `\n` and no trailing newline, which is the format
/// [`read_link_file`] accepts back.
///
/// # Arguments
///
/// * `links` - The collected links, in scrape order
/// * `output_dir` - An existing, writable directory
/// * `file_name` - Archive file name, e.g. `jen-chung.txt`
///
/// # Returns
///
/// The path of the written archive.
///
/// # Errors
///
/// Returns [`GrabError::Io`] if the file cannot be written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %file_name))]
pub async fn write_link_archive(
    links: &LinkList,
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    fs::write(&path, links.to_archive_text())
        .await
        .map_err(|e| GrabError::io(&path, e))?;
    info!(path = %path.display(), count = links.len(), "Wrote link archive");
    Ok(path)
}

/// Read a user-supplied link file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_link_file(path: &Path) -> Result<LinkList> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| GrabError::io(path, e))?;

    let mut ignored = 0usize;
    let links: LinkList = raw
        .lines()
        .map(str::trim)
        .filter(|line| {
            let keep = line.starts_with("http");
            if !keep && !line.is_empty() {
                ignored += 1;
            }
            keep
        })
        .map(str::to_string)
        .collect();

    if ignored > 0 {
        warn!(ignored, "Ignored lines that are not links");
    }
    if links.is_empty() {
        return Err(GrabError::InvalidLinkFile {
            path: path.display().to_string(),
            reason: "no lines starting with http".to_string(),
        });
    }
    info!(count = links.len(), "Read link file");
    Ok(links)
}

/// Directory that a link file's run writes into: the file's own directory.
pub fn link_file_output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_archive_then_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        let links = LinkList::from(vec![
            "http://gothamist.com/2017/01/01/a.php".to_string(),
            "http://gothamist.com/2017/01/02/b.php".to_string(),
        ]);
        let path = write_link_archive(&links, tmp.path(), "jen-chung.txt")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "http://gothamist.com/2017/01/01/a.php\nhttp://gothamist.com/2017/01/02/b.php"
        );
        assert_eq!(read_link_file(&path).await.unwrap(), links);
    }

    #[tokio::test]
    async fn test_non_link_lines_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("links.txt");
        std::fs::write(
            &path,
            "# jane doe\nhttps://a.example/1\n\n  https://a.example/2  \nftp://nope\n",
        )
        .unwrap();
        let links = read_link_file(&path).await.unwrap();
        assert_eq!(
            links.iter().collect::<Vec<_>>(),
            vec!["https://a.example/1", "https://a.example/2"]
        );
    }

    #[tokio::test]
    async fn test_file_without_links_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("links.txt");
        std::fs::write(&path, "nothing here\n").unwrap();
        let err = read_link_file(&path).await.unwrap_err();
        assert!(matches!(err, GrabError::InvalidLinkFile { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = read_link_file(Path::new("/nonexistent/links.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, GrabError::Io { .. }));
    }

    #[test]
    fn test_link_file_output_dir() {
        assert_eq!(
            link_file_output_dir(Path::new("out/doe/jane-doe.txt")),
            PathBuf::from("out/doe")
        );
        assert_eq!(link_file_output_dir(Path::new("links.txt")), PathBuf::from("."));
    }
}
