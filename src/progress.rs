//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements
//! [`ProgressCallback`] to display a spinner while files are collected and a
//! progress bar while same-size files are compared.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::duplicates::finder::COMPARING_PHASE;
use crate::scanner::collector::COLLECTING_PHASE;

/// Progress callback for the collection and comparison phases.
///
/// Implement this trait to receive progress updates during a run.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("collecting", "comparing")
    /// * `total` - Total number of items to process, `0` when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    collecting: Mutex<Option<ProgressBar>>,
    comparing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mimedupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            collecting: Mutex::new(None),
            comparing: Mutex::new(None),
            quiet,
        }
    }

    /// Check if progress output is suppressed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn collecting_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn comparing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    /// The bar of whichever phase is running.
    fn with_active_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let active = [&self.comparing, &self.collecting]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|guard| guard.clone()));
        if let Some(pb) = active {
            f(&pb);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            COLLECTING_PHASE => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::collecting_style());
                pb.set_message("Collecting files");
                pb.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut slot) = self.collecting.lock() {
                    *slot = Some(pb);
                }
            }
            COMPARING_PHASE => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::comparing_style());
                pb.set_message("Comparing");
                if let Ok(mut slot) = self.comparing.lock() {
                    *slot = Some(pb);
                }
            }
            _ => log::debug!("No progress display for phase '{}'", phase),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        let message = truncate_path(path, 30);
        self.with_active_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(message);
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let (slot, done) = match phase {
            COLLECTING_PHASE => (&self.collecting, "Collection complete"),
            COMPARING_PHASE => (&self.comparing, "Comparison complete"),
            _ => return,
        };
        if let Some(pb) = slot.lock().ok().and_then(|mut s| s.take()) {
            pb.finish_with_message(done);
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        let message = message.to_string();
        self.with_active_bar(|pb| pb.set_message(message));
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
