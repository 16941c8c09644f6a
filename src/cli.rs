//! Command-line interface definitions for Gotham Grabber.
//!
//! Exactly one input is required: an author page URL (`--url`) or a file of
//! article links (`--textfile`). Everything else tunes the run and can also
//! be set through environment variables or a YAML config file.

use crate::config::LoadMoreStrategy;
use clap::{ArgGroup, Parser};

/// Command-line arguments for Gotham Grabber.
///
/// # Examples
///
/// ```sh
/// # Scrape an author page and render every article
/// gotham_grabber --url https://www.dnainfo.com/new-york/about-us/our-team/editorial-team/jane-doe
///
/// # Re-run conversion from a previously archived link list
/// gotham_grabber --textfile out/dnainfo/doe/jane-doe.txt
/// ```
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Scrape and convert to PDF all of the articles by a given author. Accepts either a URL to an online author page or a list of links to articles as input."
)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "textfile"])))]
pub struct Cli {
    /// Author page URL on a supported site
    #[arg(short, long)]
    pub url: Option<String>,

    /// A list of links, one per line, to convert to PDFs
    #[arg(short, long)]
    pub textfile: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "GRABBER_CONFIG")]
    pub config: Option<String>,

    /// Root directory for scraped output (default: out)
    #[arg(short, long, env = "GRABBER_OUT_DIR")]
    pub out_dir: Option<String>,

    /// Converter command line, e.g. "node grabber.js"
    #[arg(long, env = "GRABBER_CONVERTER")]
    pub converter: Option<String>,

    /// Converter mode flag to use for every link (overrides the platform's own)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Pagination strategy for Newsweek author pages
    #[arg(long, value_enum)]
    pub newsweek_strategy: Option<LoadMoreStrategy>,

    /// Collect and archive links without converting them
    #[arg(long)]
    pub dry_run: bool,
}
