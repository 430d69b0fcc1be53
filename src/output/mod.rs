//! Output formatters for duplicate scan results.
//!
//! This module provides the two report formats:
//! - Text, the classic human-readable report
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```
//! use mimedupe::duplicates::DuplicateGroup;
//! use mimedupe::output::{ScanSummary, TextOutput};
//! use std::path::PathBuf;
//!
//! let groups = vec![DuplicateGroup {
//!     size: 5,
//!     files: vec![PathBuf::from("/a.txt"), PathBuf::from("/b.txt")],
//! }];
//! let summary = ScanSummary {
//!     total_files: 2,
//!     roots_scanned: 1,
//!     ..Default::default()
//! };
//!
//! let mut out = Vec::new();
//! TextOutput::new(&groups, &summary).write_to(&mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("Set 1 (Size: 5 bytes):"));
//! ```

pub mod json;
pub mod text;

use std::time::Duration;

use crate::duplicates::GroupingStats;
use crate::scanner::CollectStats;

pub use json::JsonOutput;
pub use text::TextOutput;

/// Totals for one run, gathered from the collection and grouping phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSummary {
    /// Roots that were walked
    pub roots_scanned: usize,
    /// Roots that could not be resolved
    pub roots_failed: usize,
    /// Files in the catalog
    pub total_files: usize,
    /// Combined size of the catalog in bytes
    pub total_size: u64,
    /// Files rejected by the content type filter
    pub filtered_by_type: usize,
    /// Files whose size no other file shares
    pub unique_by_size: usize,
    /// Content comparisons performed
    pub comparisons: usize,
    /// Comparisons that failed
    pub comparison_errors: usize,
    /// Traversal errors
    pub scan_errors: usize,
    /// Number of duplicate sets
    pub duplicate_sets: usize,
    /// Files beyond the first of each set
    pub duplicate_files: usize,
    /// Bytes freed by removing every extra copy
    pub reclaimable_space: u64,
    /// Wall time of the whole run
    pub scan_duration: Duration,
    /// Whether collection was interrupted
    pub interrupted: bool,
}

impl ScanSummary {
    /// Combine phase statistics into one summary.
    #[must_use]
    pub fn from_stats(
        collect: &CollectStats,
        grouping: &GroupingStats,
        total_size: u64,
        scan_duration: Duration,
    ) -> Self {
        Self {
            roots_scanned: collect.roots_scanned,
            roots_failed: collect.roots_failed,
            total_files: grouping.total_files,
            total_size,
            filtered_by_type: collect.filtered_by_type,
            unique_by_size: grouping.unique_by_size,
            comparisons: grouping.comparisons,
            comparison_errors: grouping.comparison_errors,
            scan_errors: collect.errors,
            duplicate_sets: grouping.duplicate_sets,
            duplicate_files: grouping.duplicate_files,
            reclaimable_space: grouping.reclaimable_space,
            scan_duration,
            interrupted: collect.interrupted,
        }
    }

    /// Check if any non-fatal error happened.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.comparison_errors > 0 || self.scan_errors > 0
    }
}

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}
