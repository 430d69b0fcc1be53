//! Duplicate sets and grouping statistics.
//!
//! # Overview
//!
//! A [`DuplicateSet`] is a list of indices into the sorted
//! [`FileCatalog`]: the set never copies paths or content types, it points at
//! the records the catalog already owns. When results leave the engine they
//! are resolved into owned [`DuplicateGroup`]s.
//!
//! # Example
//!
//! ```
//! use mimedupe::duplicates::{DuplicateFinder, FileCatalog};
//! # use mimedupe::duplicates::{Comparison, CompareError, ContentComparator};
//! # use std::path::Path;
//! # struct AlwaysSame;
//! # impl ContentComparator for AlwaysSame {
//! #     fn compare(&self, _: &Path, _: &Path) -> Result<Comparison, CompareError> {
//! #         Ok(Comparison::Identical)
//! #     }
//! # }
//!
//! let mut catalog = FileCatalog::new();
//! catalog.append("/photos/a.jpg", 2048, "image/jpeg").unwrap();
//! catalog.append("/backup/a.jpg", 2048, "image/jpeg").unwrap();
//! catalog.sort();
//!
//! let outcome = DuplicateFinder::new(AlwaysSame).find_duplicates(&mut catalog).unwrap();
//! let group = outcome.sets[0].to_group(&catalog);
//!
//! assert_eq!(group.size, 2048);
//! assert_eq!(group.files[0].to_str(), Some("/backup/a.jpg"));
//! assert_eq!(group.wasted_space(), 2048);
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::catalog::FileCatalog;
use super::compare::CompareError;

/// A set of same-size catalog records verified to hold identical content.
///
/// Members are stored as catalog indices: the seed first, then matches in
/// increasing catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    size: u64,
    members: Vec<usize>,
}

impl DuplicateSet {
    pub(crate) fn seeded(size: u64, seed: usize) -> Self {
        Self {
            size,
            members: vec![seed],
        }
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.members.push(index);
    }

    /// Size in bytes shared by every member.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Catalog indices of the members, in match order.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if the set is worth reporting (2+ members).
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.members.len() > 1
    }

    /// Member paths resolved through the catalog the set was built from.
    pub fn paths<'a>(&'a self, catalog: &'a FileCatalog) -> impl Iterator<Item = &'a Path> + 'a {
        self.members.iter().map(move |&i| catalog[i].path())
    }

    /// Resolve the set into an owned [`DuplicateGroup`].
    #[must_use]
    pub fn to_group(&self, catalog: &FileCatalog) -> DuplicateGroup {
        DuplicateGroup {
            size: self.size,
            files: self.paths(catalog).map(Path::to_path_buf).collect(),
        }
    }
}

/// Owned view of a duplicate set, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Member paths, seed first
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size.saturating_mul(self.duplicate_count() as u64)
    }
}

/// A comparison that could not be completed.
///
/// Neither file is added to a set because of this pair; the scan moves on to
/// the next candidate.
#[derive(Debug)]
pub struct ComparisonFailure {
    /// Seed of the set being built
    pub left: PathBuf,
    /// Candidate compared against the seed
    pub right: PathBuf,
    /// What went wrong
    pub error: CompareError,
}

impl ComparisonFailure {
    /// Human-readable diagnostic for the failure.
    #[must_use]
    pub fn reason(&self) -> String {
        self.error.to_string()
    }
}

impl std::fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Skipping comparison between {} and {} due to error: {}",
            self.left.display(),
            self.right.display(),
            self.error
        )
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records in the catalog
    pub total_files: usize,
    /// Number of size blocks with 2+ records
    pub size_blocks: usize,
    /// Records whose size no other record shares
    pub unique_by_size: usize,
    /// Content comparisons performed
    pub comparisons: usize,
    /// Comparisons that ended in an error
    pub comparison_errors: usize,
    /// Duplicate sets emitted
    pub duplicate_sets: usize,
    /// Files in emitted sets beyond the first of each set
    pub duplicate_files: usize,
    /// Bytes that removing every extra copy would free
    pub reclaimable_space: u64,
}

impl GroupingStats {
    /// Percentage of files eliminated without reading content.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.unique_by_size as f64 / self.total_files as f64) * 100.0
        }
    }

    pub(crate) fn record_set(&mut self, set: &DuplicateSet) {
        let extra = set.len().saturating_sub(1);
        self.duplicate_sets += 1;
        self.duplicate_files += extra;
        self.reclaimable_space = self
            .reclaimable_space
            .saturating_add(set.size().saturating_mul(extra as u64));
    }
}
