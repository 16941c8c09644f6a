//! Data models shared by the resolver, the site adapters and the orchestrator.
//!
//! - [`AuthorSource`]: where the run's links come from
//! - [`AuthorRef`]: an author page plus its derived identity
//! - [`AuthorIdentity`]: name tokens derived from an author page URL
//! - [`LinkList`]: the ordered, absolute article URLs of one run
//! - [`ConversionAttempt`] / [`Outcome`]: the result of converting one link
//! - [`RunSummary`]: the final report of a run

use std::path::PathBuf;
use url::Url;

/// The single top-level input of a run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorSource {
    /// An author page on a registered platform.
    AuthorPage {
        /// Registry key of the matched platform (e.g. `"dnainfo"`).
        platform: &'static str,
        author: AuthorRef,
    },
    /// A pre-supplied list of links, bypassing resolution.
    LinkFile {
        /// Path to the newline-delimited link file.
        link_file_path: PathBuf,
    },
}

/// What an adapter needs to walk one author's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    /// The author page as supplied.
    pub page_url: Url,
    /// Percent-decoded final path segment of `page_url`.
    pub slug: String,
    pub identity: AuthorIdentity,
}

/// Author name tokens used for naming the output directory and link archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    /// Lowercased name tokens in URL order.
    pub names: Vec<String>,
    /// Platform-side author id, for platforms keyed by id.
    pub author_id: Option<String>,
}

impl AuthorIdentity {
    /// The token used as the author's output directory name.
    pub fn last_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    /// File name of the link archive, e.g. `jen-chung.txt`.
    pub fn archive_file_name(&self) -> String {
        format!("{}.txt", self.names.join("-"))
    }
}

/// Ordered sequence of absolute article URLs, kept in scrape order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkList {
    links: Vec<String>,
}

impl LinkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, links: impl IntoIterator<Item = String>) {
        self.links.extend(links);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(String::as_str)
    }

    /// Links paired with their 1-based ordinal.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.iter().enumerate().map(|(i, link)| (i + 1, link))
    }

    /// Newline-joined form written to the link archive.
    pub fn to_archive_text(&self) -> String {
        self.links.join("\n")
    }
}

impl From<Vec<String>> for LinkList {
    fn from(links: Vec<String>) -> Self {
        Self { links }
    }
}

impl FromIterator<String> for LinkList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

/// Result of handing one link to the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The converter exited with status zero.
    Succeeded,
    /// An artifact already existed; no conversion was attempted.
    AlreadyConverted,
    /// The converter exited non-zero, could not be spawned, or timed out.
    Failed(ConversionFailure),
}

/// Why the converter did not produce an artifact for a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    /// Exit status, when the process ran to completion.
    pub exit_code: Option<i32>,
    /// First line of the converter's diagnostic output.
    pub first_error_line: String,
}

/// One link's pass through the orchestrator. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionAttempt {
    pub url: String,
    /// 1-based position in the original link list.
    pub ordinal: usize,
    pub outcome: Outcome,
}

/// Final report of an orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Links supplied.
    pub total: usize,
    /// Links converted during this run.
    pub completed: usize,
    /// Links skipped because their artifact already existed.
    pub skipped: usize,
    /// Links whose conversion failed.
    pub failed: usize,
    /// Where artifacts, the archive and `errors.log` live.
    pub output_dir: PathBuf,
}

impl RunSummary {
    /// Links whose artifact exists at the end of the run.
    pub fn available(&self) -> usize {
        self.completed + self.skipped
    }
}
