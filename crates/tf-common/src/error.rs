//! Error types for temporal feature extraction.
//!
//! Every failure surfaces to the caller unchanged: no stage catches, retries,
//! or partially recovers. Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Missing Column
//!   Reason: column 'org:resource' not found in event table
//!   Fix: Bind the column explicitly in ColumnBindings or add it to the input.
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for temporal feature operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Parameter and configuration errors.
    Config,
    /// Event table layout errors (missing or mistyped columns).
    Schema,
    /// Performance-spectrum strategy selection errors.
    Dispatch,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Schema => write!(f, "schema"),
            ErrorCategory::Dispatch => write!(f, "dispatch"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for temporal feature extraction.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid grouping frequency: {0}")]
    InvalidFrequency(String),

    #[error("performance spectrum can be applied providing at least two activities (got {supplied})")]
    TooFewActivities { supplied: usize },

    // Schema errors (20-29)
    #[error("column '{column}' not found in event table")]
    MissingColumn { column: String },

    #[error("column '{column}' has type {actual}, expected {expected}")]
    IncompatibleColumn {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("column '{column}' has a null value at row {row}")]
    NullValue { column: String, row: usize },

    #[error("column '{column}' holds {micros}us, outside the calendar range")]
    TimestampOutOfRange { column: String, micros: i64 },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    // Dispatch errors (30-39)
    #[error("no performance spectrum strategy can run on this input")]
    NoSpectrumStrategy,

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Schema errors
    /// - 30-39: Dispatch errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidFrequency(_) => 11,
            Error::TooFewActivities { .. } => 12,
            Error::MissingColumn { .. } => 20,
            Error::IncompatibleColumn { .. } => 21,
            Error::NullValue { .. } => 22,
            Error::Arrow(_) => 23,
            Error::TimestampOutOfRange { .. } => 24,
            Error::NoSpectrumStrategy => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidFrequency(_) | Error::TooFewActivities { .. } => {
                ErrorCategory::Config
            }

            Error::MissingColumn { .. }
            | Error::IncompatibleColumn { .. }
            | Error::NullValue { .. }
            | Error::TimestampOutOfRange { .. }
            | Error::Arrow(_) => ErrorCategory::Schema,

            Error::NoSpectrumStrategy => ErrorCategory::Dispatch,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check the configuration file syntax and derived column names.",
            Error::InvalidFrequency(_) => {
                "Use an alias such as 'W', 'D', '15min', '2H', 'W-SUN' or 'MS'."
            }
            Error::TooFewActivities { .. } => {
                "Pass an ordered list of at least two activity labels."
            }
            Error::MissingColumn { .. } => {
                "Bind the column explicitly in ColumnBindings or add it to the input."
            }
            Error::IncompatibleColumn { .. } => {
                "Cast the column to the expected Arrow type before running the pipeline."
            }
            Error::NullValue { .. } => {
                "Case ids and timestamps must be present on every event; filter incomplete rows first."
            }
            Error::TimestampOutOfRange { .. } => {
                "Timestamps must fall within the years -262143..=262142; check the time unit."
            }
            Error::Arrow(_) => "Inspect the input record batch; the Arrow layer rejected it.",
            Error::NoSpectrumStrategy => {
                "Register a strategy that supports the given input representation."
            }
            Error::Io(_) => "Check disk space, permissions, and that directories exist.",
            Error::Json(_) => "Invalid JSON. Check the file syntax with 'jq .'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidFrequency(_) => "Invalid Grouping Frequency",
            Error::TooFewActivities { .. } => "Too Few Activities",
            Error::MissingColumn { .. } => "Missing Column",
            Error::IncompatibleColumn { .. } => "Incompatible Column",
            Error::NullValue { .. } => "Null Value",
            Error::TimestampOutOfRange { .. } => "Timestamp Out Of Range",
            Error::Arrow(_) => "Arrow Error",
            Error::NoSpectrumStrategy => "No Spectrum Strategy",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
