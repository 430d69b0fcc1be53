//! Byte-by-byte content comparison of two equal-size files.
//!
//! # Overview
//!
//! This is the verification primitive of the grouping phase. Two files that
//! share a size are read in lockstep, chunk by chunk, and compared with an
//! early exit on the first mismatch. No content is cached between calls: each
//! pair is read fresh.
//!
//! The [`ContentComparator`] trait is the seam between the grouping algorithm
//! and the filesystem. [`ByteComparator`] is the production implementation.
//!
//! # Example
//!
//! ```no_run
//! use mimedupe::duplicates::{ByteComparator, Comparison, ContentComparator};
//! use std::path::Path;
//!
//! let comparator = ByteComparator::new();
//! match comparator.compare(Path::new("/tmp/a.bin"), Path::new("/tmp/b.bin")) {
//!     Ok(Comparison::Identical) => println!("same content"),
//!     Ok(Comparison::Different) => println!("different content"),
//!     Err(e) => eprintln!("comparison failed: {}", e),
//! }
//! ```

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Default chunk size for lockstep reads.
pub const COMPARE_BUFFER_SIZE: usize = 8192;

/// Largest chunk size a comparator accepts (64 MiB).
pub const MAX_COMPARE_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Verdict of a successful comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both files hold exactly the same bytes.
    Identical,
    /// The files differ (or their lengths disagreed while reading).
    Different,
}

/// Errors that turn a comparison into the "error" verdict.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A file could not be opened.
    #[error("Error opening file for comparison: {path}: {source}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A read call failed mid-comparison.
    #[error("Error reading from file: {path}: {source}")]
    Read {
        /// File that failed to read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Closing a file failed after the files were found identical.
    #[error("Error closing file: {path}: {source}")]
    Close {
        /// File that failed to close
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl CompareError {
    /// Path of the file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::Close { path, .. } => path,
        }
    }
}

/// Determines whether two files of equal size hold the same bytes.
pub trait ContentComparator {
    /// Compare the content of `left` and `right`.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] when the comparison could not be completed
    /// reliably.
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, CompareError>;
}

impl<T: ContentComparator + ?Sized> ContentComparator for &T {
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, CompareError> {
        (**self).compare(left, right)
    }
}

/// Streaming byte comparator backed by the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteComparator {
    buffer_size: usize,
}

impl Default for ByteComparator {
    fn default() -> Self {
        Self {
            buffer_size: COMPARE_BUFFER_SIZE,
        }
    }
}

impl ByteComparator {
    /// Create a comparator with the default chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size used for each lockstep read.
    ///
    /// The value is clamped to `1..=MAX_COMPARE_BUFFER_SIZE`.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.clamp(1, MAX_COMPARE_BUFFER_SIZE);
        self
    }

    /// Chunk size used for each lockstep read.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl ContentComparator for ByteComparator {
    fn compare(&self, left: &Path, right: &Path) -> Result<Comparison, CompareError> {
        let mut left_file = open_file(left)?;
        let mut right_file = match open_file(right) {
            Ok(file) => file,
            Err(e) => {
                if let Err(close_err) = close_file(left_file, left) {
                    log::warn!("{} (on error path)", close_err);
                }
                return Err(e);
            }
        };

        let verdict = compare_streams(
            &mut left_file,
            &mut right_file,
            left,
            right,
            self.buffer_size,
        );

        let left_closed = close_file(left_file, left);
        let right_closed = close_file(right_file, right);
        settle(verdict, left_closed, right_closed)
    }
}

/// Combine a stream verdict with the outcome of closing both files.
///
/// A close failure downgrades `Identical` to an error. Any other verdict
/// stands and close failures are only logged.
fn settle(
    verdict: Result<Comparison, CompareError>,
    left_closed: Result<(), CompareError>,
    right_closed: Result<(), CompareError>,
) -> Result<Comparison, CompareError> {
    match verdict {
        Ok(Comparison::Identical) => {
            // A descriptor that fails to close cannot vouch for a match.
            match (left_closed, right_closed) {
                (Ok(()), Ok(())) => Ok(Comparison::Identical),
                (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
                (Err(e), Err(second)) => {
                    log::warn!("{}", second);
                    Err(e)
                }
            }
        }
        Ok(Comparison::Different) | Err(_) => {
            for closed in [left_closed, right_closed] {
                if let Err(e) = closed {
                    log::warn!("{}", e);
                }
            }
            verdict
        }
    }
}

fn open_file(path: &Path) -> Result<File, CompareError> {
    File::open(path).map_err(|source| CompareError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Read two streams in lockstep and compare them chunk by chunk.
fn compare_streams<L: Read, R: Read>(
    left: &mut L,
    right: &mut R,
    left_path: &Path,
    right_path: &Path,
    buffer_size: usize,
) -> Result<Comparison, CompareError> {
    let mut left_buf = vec![0u8; buffer_size];
    let mut right_buf = vec![0u8; buffer_size];

    loop {
        let left_read = fill_chunk(left, &mut left_buf).map_err(|source| CompareError::Read {
            path: left_path.to_path_buf(),
            source,
        })?;
        let right_read = fill_chunk(right, &mut right_buf).map_err(|source| CompareError::Read {
            path: right_path.to_path_buf(),
            source,
        })?;

        if left_read != right_read {
            log::warn!(
                "Mismatch in bytes read for supposedly same-sized files: {} ({} bytes) vs {} ({} bytes)",
                left_path.display(),
                left_read,
                right_path.display(),
                right_read
            );
            return Ok(Comparison::Different);
        }

        if left_read == 0 {
            return Ok(Comparison::Identical);
        }

        if left_buf[..left_read] != right_buf[..right_read] {
            return Ok(Comparison::Different);
        }
    }
}

/// Fill `buf` from `reader` until it is full or the stream ends.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn close_file(file: File, path: &Path) -> Result<(), CompareError> {
    use std::os::fd::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `fd` was released from an owned `File` and is closed exactly once here.
    let rc = unsafe { libc::close(fd) };
    if rc == 0 {
        Ok(())
    } else {
        Err(CompareError::Close {
            path: path.to_path_buf(),
            source: io::Error::last_os_error(),
        })
    }
}

#[cfg(not(unix))]
fn close_file(file: File, _path: &Path) -> Result<(), CompareError> {
    drop(file);
    Ok(())
}
