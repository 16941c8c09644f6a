//! Download orchestration: hand every link to the external converter, one at
//! a time, in list order.
//!
//! A link whose artifact already exists in the output directory is skipped,
//! so re-running the same command is how failed links are retried. A failed
//! conversion is appended to `errors.log` and never stops the batch.

use crate::error::Result;
use crate::models::{ConversionAttempt, ConversionFailure, LinkList, Outcome, RunSummary};
use crate::outputs::error_log::{ERROR_LOG_FILE, append_failure};
use crate::utils::{first_line, truncate_for_log};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Something that renders one URL into `output_dir`.
pub trait Converter {
    /// Convert `url`, writing the artifact into `output_dir`.
    async fn convert(
        &self,
        url: &str,
        output_dir: &Path,
        mode: Option<&str>,
    ) -> std::result::Result<(), ConversionFailure>;
}

/// Runs an external converter process per link:
/// `{program} {args..} --url <url> --outdir <dir> [--mode <mode>]`.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn command(&self, url: &str, output_dir: &Path, mode: Option<&str>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--url")
            .arg(url)
            .arg("--outdir")
            .arg(output_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(mode) = mode {
            command.arg("--mode").arg(mode);
        }
        command
    }
}

impl Converter for CommandConverter {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn convert(
        &self,
        url: &str,
        output_dir: &Path,
        mode: Option<&str>,
    ) -> std::result::Result<(), ConversionFailure> {
        let mut command = self.command(url, output_dir, mode);
        let pending = command.output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, pending).await {
                Ok(output) => output,
                Err(_) => {
                    return Err(ConversionFailure {
                        exit_code: None,
                        first_error_line: format!("timed out after {}s", limit.as_secs()),
                    });
                }
            },
            None => pending.await,
        };

        let output = output.map_err(|e| ConversionFailure {
            exit_code: None,
            first_error_line: format!("failed to run {}: {e}", self.program),
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let first_error_line = first_line(&stdout)
            .or_else(|| first_line(&stderr))
            .unwrap_or("converter exited without output")
            .to_string();
        debug!(stderr = %truncate_for_log(&stderr, 300), "Converter stderr");
        Err(ConversionFailure {
            exit_code: output.status.code(),
            first_error_line,
        })
    }
}

/// Per-run orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub error_log: PathBuf,
    /// Converter mode flag passed with every link.
    pub mode: Option<String>,
    /// Extension of converter artifacts, without the dot.
    pub artifact_extension: String,
}

impl RunConfig {
    /// Settings writing into `output_dir`, with `errors.log` alongside.
    pub fn new(output_dir: impl Into<PathBuf>, artifact_extension: impl Into<String>) -> Self {
        let output_dir = output_dir.into();
        Self {
            error_log: output_dir.join(ERROR_LOG_FILE),
            output_dir,
            mode: None,
            artifact_extension: artifact_extension.into(),
        }
    }

    pub fn with_mode(mut self, mode: Option<String>) -> Self {
        self.mode = mode;
        self
    }
}

/// Artifact file name for `url`: its path segments joined by `-`, the same
/// name the converter gives its output.
///
/// `https://gothamist.com/2017/01/05/some_story.php` becomes
/// `2017-01-05-some_story.pdf`. Only a `.php` suffix is dropped, so
/// `story-123.html` becomes `story-123.html.pdf`. A URL without a path uses
/// its host.
pub fn artifact_name(url: &str, extension: &str) -> String {
    let stem = match Url::parse(url) {
        Ok(parsed) => {
            let joined = parsed
                .path_segments()
                .map(|segments| {
                    segments
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join("-")
                })
                .unwrap_or_default();
            if joined.is_empty() {
                parsed.host_str().unwrap_or("index").to_string()
            } else {
                joined
            }
        }
        Err(_) => url.replace(['/', ':', '?', '&'], "-"),
    };
    let stem = stem.strip_suffix(".php").unwrap_or(&stem);
    format!("{stem}.{extension}")
}

/// Drives a [`Converter`] over a link list.
#[derive(Debug)]
pub struct Orchestrator<C> {
    converter: C,
    config: RunConfig,
}

impl<C: Converter> Orchestrator<C> {
    pub fn new(converter: C, config: RunConfig) -> Self {
        Self { converter, config }
    }

    /// Where the artifact for `url` is expected.
    pub fn artifact_path(&self, url: &str) -> PathBuf {
        self.config
            .output_dir
            .join(artifact_name(url, &self.config.artifact_extension))
    }

    /// Convert every link in order. Only output-directory failures are errors;
    /// conversion failures are counted and logged.
    #[instrument(level = "info", skip_all, fields(output_dir = %self.config.output_dir.display(), total = links.len()))]
    pub async fn run(&self, links: &LinkList) -> Result<RunSummary> {
        crate::utils::ensure_writable_dir(&self.config.output_dir).await?;

        let total = links.len();
        let mut summary = RunSummary {
            total,
            completed: 0,
            skipped: 0,
            failed: 0,
            output_dir: self.config.output_dir.clone(),
        };

        for (ordinal, url) in links.numbered() {
            let attempt = self.attempt(ordinal, total, url).await;
            match &attempt.outcome {
                Outcome::Succeeded => summary.completed += 1,
                Outcome::AlreadyConverted => summary.skipped += 1,
                Outcome::Failed(failure) => {
                    summary.failed += 1;
                    warn!(
                        ordinal = attempt.ordinal,
                        url = %attempt.url,
                        exit_code = ?failure.exit_code,
                        error = %failure.first_error_line,
                        "Encountered an error with that URL. Logging it now."
                    );
                    if let Err(e) =
                        append_failure(&self.config.error_log, &attempt.url, &failure.first_error_line)
                            .await
                    {
                        error!(error = %e, url = %attempt.url, "Could not write to error log");
                    }
                }
            }
        }

        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Scrape complete. {} of {} files should be available in {}.",
            summary.available(),
            summary.total,
            summary.output_dir.display()
        );
        Ok(summary)
    }

    async fn attempt(&self, ordinal: usize, total: usize, url: &str) -> ConversionAttempt {
        let artifact = self.artifact_path(url);
        let outcome = if artifact.exists() {
            info!(ordinal, total, url, "Already converted ({ordinal}/{total})");
            Outcome::AlreadyConverted
        } else {
            info!(ordinal, total, url, "Making PDF of {url} ({ordinal}/{total})");
            match self
                .converter
                .convert(url, &self.config.output_dir, self.config.mode.as_deref())
                .await
            {
                Ok(()) => Outcome::Succeeded,
                Err(failure) => Outcome::Failed(failure),
            }
        };
        ConversionAttempt {
            url: url.to_string(),
            ordinal,
            outcome,
        }
    }
}
