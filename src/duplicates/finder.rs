//! Duplicate grouping over a sorted file catalog.
//!
//! # Overview
//!
//! The [`DuplicateFinder`] walks a [`FileCatalog`] that has already been
//! sorted by size and path:
//! 1. **Size blocks**: contiguous runs of records sharing one size. A run of a
//!    single record is unique by size and never opened.
//! 2. **Clustering**: inside each block, the first unclaimed record seeds a
//!    set and every later unclaimed record is compared against it. Matches
//!    join the set; mismatches wait for a later seed.
//!
//! Comparison errors never abort the run. The failing pair is logged, recorded
//! in [`GroupingOutcome::failures`], and the scan moves on to the next
//! candidate. A record that errored stays unclaimed, so it may still seed its
//! own set later in the block.
//!
//! # Example
//!
//! ```no_run
//! use mimedupe::duplicates::{ByteComparator, DuplicateFinder, FileCatalog};
//!
//! let mut catalog = FileCatalog::new();
//! catalog.append("/data/a.bin", 4096, "application/octet-stream").unwrap();
//! catalog.append("/data/b.bin", 4096, "application/octet-stream").unwrap();
//! catalog.sort();
//!
//! let finder = DuplicateFinder::new(ByteComparator::new());
//! let outcome = finder.find_duplicates(&mut catalog).unwrap();
//! for set in &outcome.sets {
//!     println!("{} files of {} bytes", set.len(), set.size());
//! }
//! ```

use std::sync::Arc;

use super::catalog::FileCatalog;
use super::compare::{Comparison, ContentComparator};
use super::groups::{ComparisonFailure, DuplicateGroup, DuplicateSet, GroupingStats};
use crate::progress::ProgressCallback;

/// Phase name reported to progress callbacks.
pub const COMPARING_PHASE: &str = "comparing";

/// Errors that prevent grouping from starting.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// The catalog was not sorted by size and path.
    #[error("Catalog must be sorted by size and path before grouping")]
    UnsortedCatalog,
}

/// Everything the grouping phase produced.
#[derive(Debug, Default)]
pub struct GroupingOutcome {
    /// Duplicate sets in seed order
    pub sets: Vec<DuplicateSet>,
    /// Comparisons that could not be completed, in the order they happened
    pub failures: Vec<ComparisonFailure>,
    /// Counters for the run
    pub stats: GroupingStats,
}

impl GroupingOutcome {
    /// Check if any comparison failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Resolve every set into an owned [`DuplicateGroup`].
    #[must_use]
    pub fn groups(&self, catalog: &FileCatalog) -> Vec<DuplicateGroup> {
        self.sets.iter().map(|set| set.to_group(catalog)).collect()
    }
}

/// Groups same-size catalog records into verified duplicate sets.
pub struct DuplicateFinder<C> {
    comparator: C,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl<C: std::fmt::Debug> std::fmt::Debug for DuplicateFinder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateFinder")
            .field("comparator", &self.comparator)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl<C: ContentComparator> DuplicateFinder<C> {
    /// Create a finder that verifies content with `comparator`.
    #[must_use]
    pub fn new(comparator: C) -> Self {
        Self {
            comparator,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The comparator used for content verification.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Group the records of a sorted catalog into duplicate sets.
    ///
    /// Records that end up in a set are marked visited. Call
    /// [`FileCatalog::reset_visited`] before grouping the same catalog again.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::UnsortedCatalog`] if the catalog is not sorted.
    pub fn find_duplicates(
        &self,
        catalog: &mut FileCatalog,
    ) -> Result<GroupingOutcome, FinderError> {
        if !catalog.is_sorted() {
            return Err(FinderError::UnsortedCatalog);
        }

        let mut outcome = GroupingOutcome {
            stats: GroupingStats {
                total_files: catalog.len(),
                ..GroupingStats::default()
            },
            ..GroupingOutcome::default()
        };

        if catalog.len() < 2 {
            log::debug!("Grouping skipped: {} record(s) in catalog", catalog.len());
            outcome.stats.unique_by_size = catalog.len();
            return Ok(outcome);
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(COMPARING_PHASE, candidate_count(catalog));
        }

        let mut processed = 0;
        let mut i = 0;
        while i < catalog.len() {
            if catalog[i].is_visited() {
                i += 1;
                continue;
            }

            let end = block_end(catalog, i);
            if end == i {
                outcome.stats.unique_by_size += 1;
            } else {
                outcome.stats.size_blocks += 1;
                log::trace!(
                    "Size block of {} bytes: records {}..={}",
                    catalog[i].size(),
                    i,
                    end
                );
                self.cluster_block(catalog, i, end, &mut outcome, &mut processed);
            }
            i = end + 1;
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(COMPARING_PHASE);
        }

        let stats = &outcome.stats;
        log::info!(
            "Grouping complete: {} files, {} size blocks, {} comparisons ({} failed), {} duplicate sets",
            stats.total_files,
            stats.size_blocks,
            stats.comparisons,
            stats.comparison_errors,
            stats.duplicate_sets
        );

        Ok(outcome)
    }

    /// Split the block `[start, end]` into sets of identical content.
    fn cluster_block(
        &self,
        catalog: &mut FileCatalog,
        start: usize,
        end: usize,
        outcome: &mut GroupingOutcome,
        processed: &mut usize,
    ) {
        for j in start..=end {
            *processed += 1;
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(*processed, &catalog[j].path().to_string_lossy());
            }

            if catalog[j].is_visited() {
                continue;
            }

            catalog.record_mut(j).mark_visited();
            let mut set = DuplicateSet::seeded(catalog[j].size(), j);

            for k in (j + 1)..=end {
                if catalog[k].is_visited() {
                    continue;
                }

                outcome.stats.comparisons += 1;
                match self.comparator.compare(catalog[j].path(), catalog[k].path()) {
                    Ok(Comparison::Identical) => {
                        catalog.record_mut(k).mark_visited();
                        set.push(k);
                    }
                    Ok(Comparison::Different) => {}
                    Err(error) => {
                        let failure = ComparisonFailure {
                            left: catalog[j].path().to_path_buf(),
                            right: catalog[k].path().to_path_buf(),
                            error,
                        };
                        log::warn!("{}", failure);
                        outcome.stats.comparison_errors += 1;
                        outcome.failures.push(failure);
                    }
                }
            }

            if set.is_reportable() {
                log::debug!(
                    "Duplicate set: {} files of {} bytes seeded by {}",
                    set.len(),
                    set.size(),
                    catalog[j].path().display()
                );
                outcome.stats.record_set(&set);
                outcome.sets.push(set);
            }
        }
    }
}

/// Index of the last record sharing the size of `catalog[start]`.
fn block_end(catalog: &FileCatalog, start: usize) -> usize {
    let size = catalog[start].size();
    let mut end = start;
    while end + 1 < catalog.len() && catalog[end + 1].size() == size {
        end += 1;
    }
    end
}

/// Number of records that share their size with at least one other record.
fn candidate_count(catalog: &FileCatalog) -> usize {
    let records = catalog.records();
    records
        .iter()
        .enumerate()
        .filter(|(i, record)| {
            let before = i.checked_sub(1).map(|p| records[p].size());
            let after = records.get(i + 1).map(|r| r.size());
            before == Some(record.size()) || after == Some(record.size())
        })
        .count()
}
