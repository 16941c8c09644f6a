//! Run configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! whatever was passed on the command line. Every field has a default, so an
//! empty (or absent) file yields a working configuration.
//!
//! ```yaml
//! out_root: out
//! converter_program: node
//! converter_args: [grabber.js]
//! artifact_extension: pdf
//! user_agent: "gothamgrabber (a project of freedom.press)"
//! newsweek_strategy: token
//! fetch_timeout_secs: 30
//! conversion_timeout_secs: 120
//! ```

use crate::cli::Cli;
use crate::error::{GrabError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// User agent sent with every listing-page request.
pub const DEFAULT_USER_AGENT: &str = "gothamgrabber (a project of freedom.press)";

/// Which "load more" pagination Newsweek listings are walked with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoadMoreStrategy {
    /// `?page=N` query offset, continuing while a load-more control is shown.
    #[default]
    Offset,
    /// Follow the href scraped from the load-more control each round.
    Token,
}

/// Fully merged configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrabberConfig {
    /// Root under which `{platform}/{last_name}` output directories are made.
    pub out_root: PathBuf,
    /// Converter executable.
    pub converter_program: String,
    /// Arguments placed before `--url`.
    pub converter_args: Vec<String>,
    /// Extension of the artifacts the converter writes; drives the skip check.
    pub artifact_extension: String,
    pub user_agent: String,
    pub newsweek_strategy: LoadMoreStrategy,
    /// Per-request timeout for listing pages. Unbounded when absent.
    pub fetch_timeout_secs: Option<u64>,
    /// Per-link timeout for the converter. Unbounded when absent.
    pub conversion_timeout_secs: Option<u64>,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            out_root: PathBuf::from("out"),
            converter_program: "node".to_string(),
            converter_args: vec!["grabber.js".to_string()],
            artifact_extension: "pdf".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            newsweek_strategy: LoadMoreStrategy::default(),
            fetch_timeout_secs: None,
            conversion_timeout_secs: None,
        }
    }
}

impl GrabberConfig {
    /// Load a YAML configuration file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| GrabError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&raw).map_err(|e| GrabError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Build the run configuration: file first (if any), then CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        info!(
            out_root = %config.out_root.display(),
            converter = %config.converter_program,
            newsweek_strategy = ?config.newsweek_strategy,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(out_dir) = &cli.out_dir {
            self.out_root = PathBuf::from(out_dir);
        }
        if let Some(converter) = &cli.converter {
            let mut parts = converter.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                self.converter_program = program;
                self.converter_args = parts.collect();
            }
        }
        if let Some(strategy) = cli.newsweek_strategy {
            self.newsweek_strategy = strategy;
        }
        debug!(config = ?self, "Applied CLI overrides");
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn conversion_timeout(&self) -> Option<Duration> {
        self.conversion_timeout_secs.map(Duration::from_secs)
    }
}
