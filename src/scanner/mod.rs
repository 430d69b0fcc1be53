//! Scanner module for directory traversal and catalog population.
//!
//! This module provides functionality for:
//! - Ordered directory walking using walkdir
//! - Content type detection through the `file` command
//! - Populating a [`FileCatalog`](crate::duplicates::FileCatalog) from one or
//!   more root directories
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`mime`]: Content type detection and filtering
//! - [`collector`]: Drives the walker over every root and fills the catalog
//!
//! # Example
//!
//! ```no_run
//! use mimedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     recursive: true,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod collector;
pub mod mime;
pub mod walker;

use std::path::PathBuf;

pub use collector::{CollectStats, Collection, Collector};
pub use mime::{ContentTypeDetector, FileCommandDetector, MimeFilter};
pub use walker::Walker;

/// A regular file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Canonical absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Descend into subdirectories instead of scanning one level.
    pub recursive: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Keep zero-length files. They are skipped by default.
    pub include_empty: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl WalkerConfig {
    /// Check if a file of `size` bytes passes the empty-file and size filters.
    #[must_use]
    pub fn accepts_size(&self, size: u64) -> bool {
        if size == 0 && !self.include_empty {
            return false;
        }
        if self.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.max_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A path could not be resolved to its canonical form.
    #[error("Error resolving path {path}: {source}")]
    Canonicalize {
        /// Path that failed to resolve
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
