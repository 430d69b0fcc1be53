//! Catalog population from root directories.
//!
//! The [`Collector`] drives a [`Walker`] over every root, classifies each file
//! when content type filters are configured, and appends the survivors to a
//! fresh [`FileCatalog`]. Paths reached through more than one root are
//! collected once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::mime::{ContentTypeDetector, MimeFilter};
use super::{ScanError, Walker, WalkerConfig};
use crate::duplicates::{FileCatalog, DEFAULT_CONTENT_TYPE};
use crate::progress::ProgressCallback;

/// Phase name reported to progress callbacks.
pub const COLLECTING_PHASE: &str = "collecting";

/// Counters for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Roots that were walked
    pub roots_scanned: usize,
    /// Roots that could not be resolved
    pub roots_failed: usize,
    /// Regular files yielded by the walker
    pub files_seen: usize,
    /// Files appended to the catalog
    pub files_added: usize,
    /// Files rejected by the content type filter
    pub filtered_by_type: usize,
    /// Files already collected through another root
    pub already_collected: usize,
    /// Files the catalog refused
    pub population_failures: usize,
    /// Traversal errors (including failed roots)
    pub errors: usize,
    /// Whether collection stopped early on a shutdown request
    pub interrupted: bool,
}

/// Catalog and diagnostics produced by [`Collector::collect`].
#[derive(Debug, Default)]
pub struct Collection {
    /// Unsorted catalog of collected files
    pub catalog: FileCatalog,
    /// Counters for the run
    pub stats: CollectStats,
    /// Traversal errors, in the order they were met
    pub errors: Vec<ScanError>,
}

/// Fills a [`FileCatalog`] from a list of root directories.
pub struct Collector<D> {
    walker_config: WalkerConfig,
    filter: MimeFilter,
    detector: D,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl<D: ContentTypeDetector> Collector<D> {
    /// Create a collector with no content type filter.
    #[must_use]
    pub fn new(walker_config: WalkerConfig, detector: D) -> Self {
        Self {
            walker_config,
            filter: MimeFilter::default(),
            detector,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Keep only files whose detected type passes `filter`.
    #[must_use]
    pub fn with_mime_filter(mut self, filter: MimeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root and build the catalog.
    ///
    /// Failures never abort the run: a root that cannot be resolved is
    /// skipped, and per-file errors are recorded in [`Collection::errors`].
    pub fn collect<P: AsRef<Path>>(&self, roots: &[P]) -> Collection {
        let mut collection = Collection::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(COLLECTING_PHASE, 0);
        }

        for root in roots {
            if self.is_shutdown_requested() {
                break;
            }
            self.collect_root(root.as_ref(), &mut collection, &mut seen);
        }

        if self.is_shutdown_requested() {
            log::info!("Collection interrupted");
            collection.stats.interrupted = true;
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(COLLECTING_PHASE);
        }

        let stats = &collection.stats;
        log::info!(
            "Collection complete: {} roots, {} files seen, {} added, {} filtered by type, {} errors",
            stats.roots_scanned,
            stats.files_seen,
            stats.files_added,
            stats.filtered_by_type,
            stats.errors
        );

        collection
    }

    fn collect_root(&self, root: &Path, collection: &mut Collection, seen: &mut HashSet<PathBuf>) {
        let mut walker = Walker::new(root, self.walker_config.clone());
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        if let Err(e) = walker.canonical_root() {
            log::warn!(
                "Error resolving input directory {}: {}. Skipping.",
                root.display(),
                e
            );
            collection.stats.roots_failed += 1;
            collection.stats.errors += 1;
            collection.errors.push(e);
            return;
        }
        collection.stats.roots_scanned += 1;

        for result in walker.walk() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    collection.stats.errors += 1;
                    collection.errors.push(e);
                    continue;
                }
            };

            collection.stats.files_seen += 1;
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(collection.stats.files_seen, &entry.path.to_string_lossy());
            }

            if seen.contains(&entry.path) {
                log::trace!("Already collected: {}", entry.path.display());
                collection.stats.already_collected += 1;
                continue;
            }

            let content_type = if self.filter.is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                let detected = self.detector.detect(&entry.path);
                if !self.filter.matches(&detected) {
                    log::trace!(
                        "Skipping {} ({} not selected)",
                        entry.path.display(),
                        detected
                    );
                    collection.stats.filtered_by_type += 1;
                    continue;
                }
                detected
            };

            match collection
                .catalog
                .append(entry.path.clone(), entry.size, content_type)
            {
                Ok(()) => {
                    seen.insert(entry.path);
                    collection.stats.files_added += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Error adding file {} to catalog: {}. Skipping.",
                        entry.path.display(),
                        e
                    );
                    collection.stats.population_failures += 1;
                }
            }
        }
    }
}
