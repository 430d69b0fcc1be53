//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the mimedupe application.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (unexpected failure)
/// - 3: Partial success (completed with some comparison or traversal errors)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed without errors.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Partial success: Scan completed but encountered some non-fatal errors.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Pick the exit code for a run that reached the reporting stage.
    #[must_use]
    pub fn for_run(interrupted: bool, had_errors: bool) -> Self {
        if interrupted {
            Self::Interrupted
        } else if had_errors {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MD000",
            Self::GeneralError => "MD001",
            Self::PartialSuccess => "MD003",
            Self::Interrupted => "MD130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "MD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
