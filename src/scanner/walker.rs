//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root
//! directory and yielding the regular files found there.
//!
//! # Features
//!
//! - Deterministic order (entries sorted by file name)
//! - One level by default, full depth when recursive
//! - Symlinks are never followed and never yielded
//! - Empty file, size and hidden file filtering
//! - Canonical paths for every yielded file
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use mimedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for ordered file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk, as given by the caller
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root path as given to [`Walker::new`].
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Resolve the root to a canonical directory path.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Canonicalize`] if the root cannot be resolved and
    /// [`ScanError::NotADirectory`] if it resolves to something else.
    pub fn canonical_root(&self) -> Result<PathBuf, ScanError> {
        let root = std::fs::canonicalize(&self.root).map_err(|source| ScanError::Canonicalize {
            path: self.root.clone(),
            source,
        })?;
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(root)
    }

    /// Walk the root directory, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. A root that cannot be resolved yields a single error.
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<FileEntry, ScanError>> + '_> {
        let root = match self.canonical_root() {
            Ok(root) => root,
            Err(e) => {
                log::warn!("{}. Skipping.", e);
                return Box::new(std::iter::once(Err(e)));
            }
        };

        log::debug!(
            "Walking {} ({})",
            root.display(),
            if self.config.recursive {
                "recursive"
            } else {
                "one level"
            }
        );

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let skip_hidden = self.config.skip_hidden;

        let entries = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && is_hidden(entry)))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            });

        Box::new(entries.filter_map(move |entry_result| match entry_result {
            Ok(entry) => self.process_entry(&entry),
            Err(e) => Some(self.handle_walk_error(e)),
        }))
    }

    /// Turn a directory entry into a [`FileEntry`] if it qualifies.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }
        if !file_type.is_file() {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(self.handle_walk_error(e)),
        };

        let size = metadata.len();
        if !self.config.accepts_size(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        let canonical = match std::fs::canonicalize(path) {
            Ok(p) => p,
            Err(source) => {
                let err = ScanError::Canonicalize {
                    path: path.to_path_buf(),
                    source,
                };
                log::warn!("{}. Skipping.", err);
                return Some(Err(err));
            }
        };

        Some(Ok(FileEntry::new(canonical, size)))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> Result<FileEntry, ScanError> {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                Err(ScanError::PermissionDenied(path.to_path_buf()))
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                Err(ScanError::NotFound(path.to_path_buf()))
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                Err(ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }

    /// Handle walkdir errors.
    fn handle_walk_error(&self, error: walkdir::Error) -> Result<FileEntry, ScanError> {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let message = error.to_string();
        match error.into_io_error() {
            Some(io) => self.handle_io_error(&path, io),
            None => {
                log::warn!("Walker error for {}: {}", path.display(), message);
                Err(ScanError::Io {
                    path,
                    source: std::io::Error::other(message),
                })
            }
        }
    }
}

/// Check if an entry below the root has a dot-prefixed name.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
