//! Error types for link collection and orchestration.
//!
//! Collection-time errors ([`GrabError::Fetch`], [`GrabError::Parse`]) abort
//! the whole run: a partially collected link list is never handed to the
//! converter. Conversion failures are not represented here; they are recorded
//! per link in `errors.log` by the orchestrator.

use itertools::Itertools;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GrabError>;

/// Errors that can terminate a grab run.
#[derive(Debug, Error)]
pub enum GrabError {
    /// The author URL's host matched none of the registered platforms.
    #[error("'{host}' is not a supported site. Link must be to a page on one of the following sites:\n{}", format_supported(.supported))]
    UnsupportedPlatform {
        /// Host of the rejected URL
        host: String,
        /// Labels of every registered platform, in match order
        supported: Vec<String>,
    },

    /// The author URL could not be parsed or carries no usable author slug.
    #[error("invalid author url '{url}': {reason}")]
    InvalidAuthorUrl {
        /// The offending input
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network or HTTP failure while fetching a listing page.
    #[error("failed to fetch '{url}': {reason}")]
    Fetch {
        /// The page being fetched
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// A listing page did not have the expected HTML/JSON shape.
    #[error("failed to parse '{url}': {reason}")]
    Parse {
        /// The page being parsed
        url: String,
        /// What was missing or malformed
        reason: String,
    },

    /// A supplied link file held no usable URLs.
    #[error("link file '{path}' is unusable: {reason}")]
    InvalidLinkFile {
        /// Path of the link file
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration file could not be read or deserialised.
    #[error("invalid configuration '{path}': {reason}")]
    Config {
        /// Path of the configuration file
        path: String,
        /// Underlying problem
        reason: String,
    },

    /// Filesystem failure on the output directory, archive or error log.
    #[error("i/o error on '{path}': {source}")]
    Io {
        /// Path being touched
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

fn format_supported(supported: &[String]) -> String {
    supported
        .iter()
        .map(|label| format!("    -- {label}"))
        .join("\n")
}

impl GrabError {
    /// Creates a `Fetch` error from any displayable cause.
    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Parse` error from any displayable cause.
    pub fn parse(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `InvalidAuthorUrl` error.
    pub fn invalid_author_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAuthorUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
