//! Human-readable report.
//!
//! ```text
//!
//! --- Duplicate Sets Found ---
//!
//! Set 1 (Size: 1024 bytes):
//!   /data/a.bin
//!   /backup/a.bin
//!
//! --- End of Duplicate Sets ---
//! ```

use std::io::Write;

use yansi::Paint;

use super::ScanSummary;
use crate::duplicates::DuplicateGroup;

const FOUND_HEADER: &str = "--- Duplicate Sets Found ---";
const END_FOOTER: &str = "--- End of Duplicate Sets ---";
const NO_DUPLICATES: &str = "No duplicate files found among the processed files.";
const NOT_ENOUGH_FILES: &str = "Not enough files to compare for duplicates, or no files found.";
const NO_MATCHING_FILES: &str =
    "No files found matching criteria in the specified valid directories.";
const NO_VALID_DIRECTORIES: &str = "No valid directories could be processed.";

/// Text report writer.
#[derive(Debug)]
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a report for `groups`, without colors.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self {
            groups,
            summary,
            color: false,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn set_title(&self, number: usize, size: u64) -> String {
        let title = format!("Set {} (Size: {} bytes):", number, size);
        if self.color {
            title.cyan().bold().to_string()
        } else {
            title
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self.summary.total_files {
            0 if self.summary.roots_scanned > 0 => {
                return writeln!(writer, "{}", NO_MATCHING_FILES)
            }
            0 if self.summary.roots_failed > 0 => {
                return writeln!(writer, "{}", NO_VALID_DIRECTORIES)
            }
            0 | 1 => return writeln!(writer, "{}", NOT_ENOUGH_FILES),
            _ => {}
        }

        if self.groups.is_empty() {
            return writeln!(writer, "{}", NO_DUPLICATES);
        }

        writeln!(writer)?;
        writeln!(writer, "{}", self.header(FOUND_HEADER))?;
        for (index, group) in self.groups.iter().enumerate() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.set_title(index + 1, group.size))?;
            for path in &group.files {
                writeln!(writer, "  {}", path.display())?;
            }
        }
        writeln!(writer)?;
        writeln!(writer, "{}", self.header(END_FOOTER))
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
