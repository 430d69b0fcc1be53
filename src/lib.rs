//! mimedupe - Byte-exact duplicate file finder
//!
//! Collects regular files from one or more directories, optionally keeps
//! only those whose detected MIME type matches a filter, and reports sets of
//! files whose contents are identical byte for byte.
//!
//! The pipeline is:
//!
//! 1. [`scanner::Collector`] walks every root and fills a
//!    [`duplicates::FileCatalog`]
//! 2. the catalog is sorted by size, then path
//! 3. [`duplicates::DuplicateFinder`] clusters same-size files by comparing
//!    them against a seed with a [`duplicates::ContentComparator`]
//! 4. [`output`] renders the sets as text or JSON

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bytesize::ByteSize;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{ByteComparator, DuplicateFinder};
use crate::error::ExitCode;
use crate::output::{JsonOutput, ScanSummary, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{Collection, Collector, FileCommandDetector};

/// Run one scan as described by `cli` and print the report to stdout.
///
/// Per-file problems never abort the run; they are logged and reflected in
/// the returned exit code.
///
/// # Errors
///
/// Returns an error if the signal handler cannot be installed, the catalog
/// cannot be grouped, or the report cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let start = Instant::now();

    let config = match cli.config {
        Some(ref path) => {
            if !path.exists() {
                log::warn!("Configuration file {} does not exist", path.display());
            }
            Config::load_from_path(path)
        }
        None => Config::load(),
    }
    .merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let progress: Option<Arc<dyn ProgressCallback>> =
        if config.output == OutputFormat::Text && !cli.quiet {
            Some(Arc::new(Progress::new(false)))
        } else {
            None
        };

    let mut collector = Collector::new(config.walker_config(), FileCommandDetector::new())
        .with_mime_filter(config.mime_filter())
        .with_shutdown_flag(shutdown.get_flag());
    if let Some(ref callback) = progress {
        collector = collector.with_progress_callback(Arc::clone(callback));
    }

    let roots = cli.scan_roots();
    let Collection {
        mut catalog,
        stats: collect_stats,
        errors,
    } = collector.collect(&roots);
    for error in &errors {
        log::debug!("Traversal error: {}", error);
    }

    catalog.sort();

    let comparator = ByteComparator::new().with_buffer_size(config.buffer_size);
    if comparator.buffer_size() != config.buffer_size {
        log::warn!(
            "Buffer size {} out of range, using {}",
            config.buffer_size,
            comparator.buffer_size()
        );
    }
    let mut finder = DuplicateFinder::new(comparator);
    if let Some(ref callback) = progress {
        finder = finder.with_progress_callback(Arc::clone(callback));
    }
    let outcome = finder
        .find_duplicates(&mut catalog)
        .context("Failed to group duplicate files")?;

    let groups = outcome.groups(&catalog);
    let summary = ScanSummary::from_stats(
        &collect_stats,
        &outcome.stats,
        catalog.total_size(),
        start.elapsed(),
    );
    let exit_code = ExitCode::for_run(summary.interrupted, summary.has_errors());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match config.output {
        OutputFormat::Text => {
            let color = !cli.no_color && stdout.is_terminal();
            TextOutput::new(&groups, &summary)
                .with_color(color)
                .write_to(&mut out)
                .context("Failed to write report")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&groups, &outcome.failures, &summary, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write report")?;
        }
    }
    out.flush().context("Failed to write report")?;

    log::info!(
        "Scanned {} files ({}) in {:.2?}: {} duplicate sets, {} reclaimable",
        summary.total_files,
        ByteSize(summary.total_size),
        summary.scan_duration,
        summary.duplicate_sets,
        ByteSize(summary.reclaimable_space)
    );
    if summary.has_errors() {
        log::warn!(
            "Completed with {} traversal errors and {} comparison errors",
            summary.scan_errors,
            summary.comparison_errors
        );
    }

    Ok(exit_code)
}
