//! Content type detection and filtering.
//!
//! # Overview
//!
//! Detection is delegated to the system `file` utility through the
//! [`ContentTypeDetector`] trait. Any failure falls back to
//! [`DEFAULT_CONTENT_TYPE`] so a file is never dropped because it could not be
//! classified.
//!
//! [`MimeFilter`] decides which detected types are kept. Patterns match
//! exactly (`image/png`) or by top-level type (`image/*`); matching ignores
//! ASCII case.
//!
//! # Example
//!
//! ```
//! use mimedupe::scanner::MimeFilter;
//!
//! let filter = MimeFilter::new(["image/*", "application/pdf"]);
//! assert!(filter.matches("image/jpeg"));
//! assert!(filter.matches("application/pdf"));
//! assert!(!filter.matches("text/plain"));
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::duplicates::DEFAULT_CONTENT_TYPE;

/// Classifies a file by content type.
pub trait ContentTypeDetector {
    /// Content type of the file at `path`.
    ///
    /// Implementations never fail: an unclassifiable file gets
    /// [`DEFAULT_CONTENT_TYPE`].
    fn detect(&self, path: &Path) -> String;
}

impl<T: ContentTypeDetector + ?Sized> ContentTypeDetector for &T {
    fn detect(&self, path: &Path) -> String {
        (**self).detect(path)
    }
}

/// Errors from running the external detection command.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// The command could not be started.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("'{program}' exited with {status}")]
    Status {
        /// Program that failed
        program: String,
        /// Exit status description
        status: std::process::ExitStatus,
    },

    /// The command printed nothing usable.
    #[error("'{program}' produced no content type")]
    EmptyOutput {
        /// Program that produced no output
        program: String,
    },
}

/// Detector backed by `file -b --mime-type <path>`.
///
/// The path is passed as a process argument, never through a shell.
#[derive(Debug, Clone)]
pub struct FileCommandDetector {
    program: OsString,
}

impl Default for FileCommandDetector {
    fn default() -> Self {
        Self {
            program: OsString::from("file"),
        }
    }
}

impl FileCommandDetector {
    /// Create a detector that runs `file` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable with the same command-line interface.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Run the command and return the reported content type.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError`] if the command cannot be run, fails, or
    /// prints nothing.
    pub fn try_detect(&self, path: &Path) -> Result<String, DetectError> {
        let program = self.program.to_string_lossy().into_owned();
        let output = Command::new(&self.program)
            .arg("-b")
            .arg("--mime-type")
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| DetectError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DetectError::Status {
                program,
                status: output.status,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().next().map(str::trim) {
            Some(mime) if !mime.is_empty() => Ok(mime.to_string()),
            _ => Err(DetectError::EmptyOutput { program }),
        }
    }
}

impl ContentTypeDetector for FileCommandDetector {
    fn detect(&self, path: &Path) -> String {
        match self.try_detect(path) {
            Ok(mime) => {
                log::trace!("Content type of {}: {}", path.display(), mime);
                mime
            }
            Err(e) => {
                log::warn!(
                    "Could not determine content type of {}: {}. Using {}.",
                    path.display(),
                    e,
                    DEFAULT_CONTENT_TYPE
                );
                DEFAULT_CONTENT_TYPE.to_string()
            }
        }
    }
}

/// One accepted content type pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MimePattern {
    /// `type/subtype`
    Exact(String),
    /// `type/*`
    TopLevel(String),
    /// `*` or `*/*`
    Any,
}

impl MimePattern {
    fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern.is_empty() {
            return None;
        }
        if pattern == "*" || pattern == "*/*" {
            return Some(Self::Any);
        }
        match pattern.strip_suffix("/*") {
            Some(top) => Some(Self::TopLevel(top.to_string())),
            None => Some(Self::Exact(pattern)),
        }
    }

    fn matches(&self, content_type: &str) -> bool {
        match self {
            Self::Exact(exact) => content_type.eq_ignore_ascii_case(exact),
            Self::TopLevel(top) => content_type
                .split_once('/')
                .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top)),
            Self::Any => true,
        }
    }
}

/// Set of accepted content types. An empty filter accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeFilter {
    patterns: Vec<MimePattern>,
}

impl MimeFilter {
    /// Build a filter from user-supplied patterns. Blank patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter_map(|p| MimePattern::parse(p.as_ref()))
                .collect(),
        }
    }

    /// Check if no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of configured patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if `content_type` is accepted.
    #[must_use]
    pub fn matches(&self, content_type: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(content_type))
    }
}
