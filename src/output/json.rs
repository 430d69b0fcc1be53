//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "errors": [
//!     {
//!       "left": "/path/to/a.bin",
//!       "right": "/path/to/b.bin",
//!       "reason": "Error opening file for comparison: /path/to/b.bin: Permission denied (os error 13)"
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_sets": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "MD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::{OutputError, ScanSummary};
use crate::duplicates::{ComparisonFailure, DuplicateGroup};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Absolute paths, seed first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Convert a resolved duplicate group.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            files: group
                .files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A failed comparison in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonComparisonError {
    /// Seed of the set being built
    pub left: String,
    /// Candidate compared against the seed
    pub right: String,
    /// Human-readable reason
    pub reason: String,
}

impl From<&ComparisonFailure> for JsonComparisonError {
    fn from(failure: &ComparisonFailure) -> Self {
        Self {
            left: failure.left.to_string_lossy().into_owned(),
            right: failure.right.to_string_lossy().into_owned(),
            reason: failure.reason(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roots that were walked
    pub roots_scanned: usize,
    /// Roots that could not be resolved
    pub roots_failed: usize,
    /// Total number of files in the catalog
    pub total_files: usize,
    /// Total size of all catalogued files in bytes
    pub total_size: u64,
    /// Files rejected by the content type filter
    pub filtered_by_type: usize,
    /// Files eliminated without reading content
    pub unique_by_size: usize,
    /// Content comparisons performed
    pub comparisons: usize,
    /// Comparisons that failed
    pub comparison_errors: usize,
    /// Traversal errors
    pub scan_errors: usize,
    /// Number of duplicate sets
    pub duplicate_sets: usize,
    /// Total number of duplicate files (excluding the first of each set)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "MD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots_scanned: summary.roots_scanned,
            roots_failed: summary.roots_failed,
            total_files: summary.total_files,
            total_size: summary.total_size,
            filtered_by_type: summary.filtered_by_type,
            unique_by_size: summary.unique_by_size,
            comparisons: summary.comparisons,
            comparison_errors: summary.comparison_errors,
            scan_errors: summary.scan_errors,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Comparisons that could not be completed
    pub errors: Vec<JsonComparisonError>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups, failures, summary and
    /// exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use mimedupe::error::ExitCode;
    /// use mimedupe::output::{JsonOutput, ScanSummary};
    ///
    /// let output = JsonOutput::new(&[], &[], &ScanSummary::default(), ExitCode::Success);
    /// assert!(output.duplicates.is_empty());
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        failures: &[ComparisonFailure],
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            errors: failures.iter().map(JsonComparisonError::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
