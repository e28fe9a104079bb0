//! Unified error handling.
//!
//! A single `thiserror`-based enum covers every fatal failure the tool can
//! hit, with:
//!   * Typed variants per failure domain (config, input, output)
//!   * A categorization layer (`ErrorCategory`) used for logging and exit codes
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Per-record problems (a malformed `details` value) are *not* represented
//! here; they are logged and the record is dropped. See `literal::LiteralError`.
//!
//! Usage:
//!   use clicksift::errors::{Result, ClickSiftError};
//!
//!   fn do_something() -> Result<()> {
//!       Err(ClickSiftError::configuration("identity column must not be empty"))
//!   }
//!
//! NOTE: Variants that wrap external errors retain sources so the chain is
//!       visible with `{:#}`-style reporting.

use std::io;

use thiserror::Error;

/// High-level classification for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Input,
    Extraction,
    Output,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Input => "input",
            ErrorCategory::Extraction => "extraction",
            ErrorCategory::Output => "output",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum ClickSiftError {
    // ---------------------------- Configuration -----------------------------
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file not found or unreadable: {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Error decoding configuration file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ------------------------------- Input ----------------------------------
    #[error("No input file was provided")]
    NoInput,

    #[error("File does not exist or cannot be accessed: {path}")]
    InputNotFound { path: String },

    #[error("The file is empty: {path}")]
    EmptyInput { path: String },

    #[error("Error parsing {path}; please ensure it is in CSV format: {reason}")]
    MalformedInput { path: String, reason: String },

    #[error("Input file must contain the following columns: {} (missing: {})", .required.join(", "), .missing.join(", "))]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Input file contains column '{column}' more than once")]
    DuplicateColumn { column: String },

    #[error("Unparsable time value '{value}' on data row {row}")]
    InvalidTimestamp { row: usize, value: String },

    // ------------------------------- Output ---------------------------------
    #[error("Error writing to the output file {path}: {reason}")]
    Output { path: String, reason: String },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClickSiftError {
    /// Categorize the error for logging / exit codes.
    pub fn category(&self) -> ErrorCategory {
        use ClickSiftError::*;
        match self {
            Configuration { .. } | ConfigRead { .. } | ConfigParse { .. } => ErrorCategory::Config,

            NoInput
            | InputNotFound { .. }
            | EmptyInput { .. }
            | MalformedInput { .. }
            | MissingColumns { .. }
            | DuplicateColumn { .. }
            | InvalidTimestamp { .. } => ErrorCategory::Input,

            Output { .. } => ErrorCategory::Output,

            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Process exit code for this failure. Every fatal category maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config
            | ErrorCategory::Input
            | ErrorCategory::Extraction
            | ErrorCategory::Output
            | ErrorCategory::Internal => 1,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn config_read(path: impl Into<String>, source: io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    pub fn config_parse(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn empty_input(path: impl Into<String>) -> Self {
        Self::EmptyInput { path: path.into() }
    }

    pub fn malformed_input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_columns(required: &[&str], missing: Vec<String>) -> Self {
        Self::MissingColumns {
            required: required.iter().map(|c| c.to_string()).collect(),
            missing,
        }
    }

    pub fn duplicate_column(column: impl Into<String>) -> Self {
        Self::DuplicateColumn {
            column: column.into(),
        }
    }

    pub fn invalid_timestamp(row: usize, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            row,
            value: value.into(),
        }
    }

    pub fn output(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Output {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, ClickSiftError>;

/// Map standard IO errors into `Io` variant (generic context).
impl From<io::Error> for ClickSiftError {
    fn from(e: io::Error) -> Self {
        ClickSiftError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

impl From<csv::Error> for ClickSiftError {
    fn from(e: csv::Error) -> Self {
        // Path is not known at this conversion point; loader and writer wrap
        // with their own constructors where it is.
        ClickSiftError::MalformedInput {
            path: "<unknown>".into(),
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClickSiftError {
    fn from(e: serde_json::Error) -> Self {
        ClickSiftError::ConfigParse {
            path: "<unknown>".into(),
            source: e,
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| ClickSiftError::io(path.into(), operation.into(), e))
    }
}
