//! File catalog: the ordered container of per-file metadata.
//!
//! # Overview
//!
//! The [`FileCatalog`] is filled by the collector one [`FileRecord`] at a time,
//! sorted once by [`FileCatalog::sort`], and then handed to the
//! [`DuplicateFinder`](super::DuplicateFinder). Sorting by size first and path
//! second makes every same-size run of files contiguous, which is what the
//! grouping phase relies on.
//!
//! # Example
//!
//! ```
//! use mimedupe::duplicates::FileCatalog;
//!
//! let mut catalog = FileCatalog::new();
//! catalog.append("/data/b.txt", 100, "text/plain").unwrap();
//! catalog.append("/data/c.txt", 50, "text/plain").unwrap();
//! catalog.append("/data/a.txt", 100, "text/plain").unwrap();
//!
//! catalog.sort();
//!
//! let order: Vec<_> = catalog.iter().map(|r| r.path().to_str().unwrap()).collect();
//! assert_eq!(order, ["/data/c.txt", "/data/a.txt", "/data/b.txt"]);
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Content type stored when no classification is available.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata for one candidate file.
///
/// Identity fields are fixed at insertion. The `visited` flag is the only
/// mutable state and is owned by the grouping phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    size: u64,
    content_type: String,
    visited: bool,
}

impl FileRecord {
    fn new(path: PathBuf, size: u64, content_type: String) -> Self {
        Self {
            path,
            size,
            content_type,
            visited: false,
        }
    }

    /// Canonical absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content type tag attached by the collector.
    ///
    /// Detection only runs when content type filters are configured. Without
    /// filters every record carries [`DEFAULT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Whether the record was already claimed by a duplicate set.
    #[must_use]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub(crate) fn mark_visited(&mut self) {
        self.visited = true;
    }

    /// Raw path bytes used as the secondary sort key.
    fn path_bytes(&self) -> &[u8] {
        self.path.as_os_str().as_encoded_bytes()
    }
}

/// Compare two records by size, then byte-wise by path.
///
/// Paths are compared on their raw bytes rather than component-wise so that
/// `/a/b` and `/a.b` order the same way `strcmp` would order them.
#[must_use]
pub fn compare_records(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.size
        .cmp(&b.size)
        .then_with(|| a.path_bytes().cmp(b.path_bytes()))
}

/// Errors returned when a record is rejected by [`FileCatalog::append`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The supplied path was empty.
    #[error("Empty path rejected")]
    EmptyPath,

    /// The supplied path was not absolute.
    #[error("Path is not absolute: {0}")]
    RelativePath(PathBuf),
}

/// Ordered, growable collection of [`FileRecord`]s.
///
/// The catalog does not deduplicate by path; the collector is responsible
/// for handing it canonical, unique paths.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    records: Vec<FileRecord>,
}

impl FileCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a new record with `visited` cleared.
    ///
    /// Any size is accepted, including `0` and `u64::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the path is empty or not absolute.
    pub fn append(
        &mut self,
        path: impl Into<PathBuf>,
        size: u64,
        content_type: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(CatalogError::EmptyPath);
        }
        if !path.is_absolute() {
            return Err(CatalogError::RelativePath(path));
        }

        log::trace!("Catalog append: {} ({} bytes)", path.display(), size);
        self.records.push(FileRecord::new(path, size, content_type.into()));
        Ok(())
    }

    /// Sort records by size ascending, then by path byte-wise ascending.
    pub fn sort(&mut self) {
        if self.records.len() < 2 {
            return;
        }
        self.records.sort_by(compare_records);
        log::debug!("Catalog sorted: {} records", self.records.len());
    }

    /// Check whether the catalog satisfies the sort order of [`sort`](Self::sort).
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| compare_records(&pair[0], &pair[1]) != Ordering::Greater)
    }

    /// Clear every `visited` flag so the catalog can be grouped again.
    pub fn reset_visited(&mut self) {
        for record in &mut self.records {
            record.visited = false;
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }

    /// Iterate over the records in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    /// All records as a slice.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Total size of all records in bytes, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.size))
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> &mut FileRecord {
        &mut self.records[index]
    }
}

impl std::ops::Index<usize> for FileCatalog {
    type Output = FileRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a FileCatalog {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
