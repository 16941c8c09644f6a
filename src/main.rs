//! # Gotham Grabber
//!
//! Collects every article a writer published on a supported news site and
//! renders each one to PDF with an external converter, so a body of work
//! survives the site going dark.
//!
//! ## Usage
//!
//! ```sh
//! gotham_grabber --url http://gothamist.com/author/Jen%20Chung
//! gotham_grabber --textfile out/gothamist/chung/jen-chung.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Resolution**: match the author URL's host to a platform and derive
//!    the author's name tokens ([`resolver`])
//! 2. **Collection**: walk the author's listing pages with the platform's
//!    adapter ([`scrapers`]); any page failure aborts the run
//! 3. **Archiving**: write the link list before anything is converted ([`outputs`])
//! 4. **Conversion**: hand each link to the converter in order, skipping
//!    links already rendered and logging failures ([`orchestrator`])

use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod orchestrator;
mod outputs;
mod resolver;
mod scrapers;
mod utils;

use cli::Cli;
use config::GrabberConfig;
use models::{AuthorSource, LinkList, RunSummary};
use orchestrator::{CommandConverter, Orchestrator, RunConfig};
use outputs::archive::{link_file_output_dir, read_link_file, write_link_archive};
use resolver::PlatformRegistry;
use scrapers::{PageFetcher, collect_links};
use utils::ensure_writable_dir;

/// Links gathered for a run plus where they are to be rendered.
#[derive(Debug)]
struct Collected {
    links: LinkList,
    output_dir: PathBuf,
    mode: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = GrabberConfig::load(&args)?;
    let registry = PlatformRegistry::with_defaults(&config);

    let source = match (&args.url, &args.textfile) {
        (Some(url), _) => match registry.resolve(url) {
            Ok(source) => source,
            Err(e) => {
                error!(url = %url, "{e}");
                return Err(e.into());
            }
        },
        (None, Some(path)) => AuthorSource::LinkFile {
            link_file_path: PathBuf::from(path),
        },
        (None, None) => unreachable!("clap requires --url or --textfile"),
    };

    let mut collected = match collect(&source, &registry, &config).await {
        Ok(collected) => collected,
        Err(e) => {
            error!(error = %e, "Link collection failed; nothing was converted");
            return Err(e);
        }
    };
    if args.mode.is_some() {
        collected.mode = args.mode.clone();
    }

    if args.dry_run {
        info!(
            count = collected.links.len(),
            output_dir = %collected.output_dir.display(),
            "Dry run; skipping conversion"
        );
        return Ok(());
    }

    let converter = CommandConverter::new(
        config.converter_program.clone(),
        config.converter_args.clone(),
        config.conversion_timeout(),
    );
    let run_config = RunConfig::new(&collected.output_dir, config.artifact_extension.clone())
        .with_mode(collected.mode);
    let summary = Orchestrator::new(converter, run_config)
        .run(&collected.links)
        .await?;

    report(&summary);
    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

/// Produce the run's link list, archiving it when it was scraped.
#[instrument(level = "info", skip_all)]
async fn collect(
    source: &AuthorSource,
    registry: &PlatformRegistry,
    config: &GrabberConfig,
) -> Result<Collected, Box<dyn Error>> {
    match source {
        AuthorSource::AuthorPage { platform, author } => {
            let platform = registry
                .get(platform)
                .ok_or_else(|| format!("platform '{platform}' is not registered"))?;
            info!(
                site = platform.label,
                adapter = platform.adapter.name(),
                author = %author.slug,
                "Scraping author page. This may take a while."
            );

            let output_dir = config
                .out_root
                .join(platform.key)
                .join(author.identity.last_name());
            ensure_writable_dir(&output_dir).await?;

            let fetcher = PageFetcher::new(config)?;
            let links = collect_links(platform.adapter.as_ref(), &fetcher, author).await?;
            write_link_archive(&links, &output_dir, &author.identity.archive_file_name()).await?;

            Ok(Collected {
                links,
                output_dir,
                mode: platform.converter_mode.map(str::to_string),
            })
        }
        AuthorSource::LinkFile { link_file_path } => {
            let links = read_link_file(link_file_path).await?;
            Ok(Collected {
                links,
                output_dir: link_file_output_dir(Path::new(link_file_path)),
                mode: None,
            })
        }
    }
}

fn report(summary: &RunSummary) {
    info!(
        total = summary.total,
        completed = summary.completed,
        skipped = summary.skipped,
        failed = summary.failed,
        output_dir = %summary.output_dir.display(),
        "Run summary"
    );
    if summary.failed > 0 {
        info!(
            log = %summary.output_dir.join(outputs::error_log::ERROR_LOG_FILE).display(),
            "Re-run the same command to retry failed links"
        );
    }
}
