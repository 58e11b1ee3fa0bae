//! Error types for ferro-varload
//!
//! Only structural problems surface as [`VarloadError`]. Row-level problems
//! (ineligible rows, unclassifiable notation, malformed identifier tokens) are
//! handled inside the stage that meets them and never reach the caller.

use std::fmt;
use thiserror::Error;

use crate::clinvar::VALID_COLUMN_NO;

/// Error codes for categorizing errors
///
/// These codes are stable and printed by the CLI next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input format errors (E1xxx)
    /// Row does not have the expected number of columns
    MalformedRow = 1001,

    // Ordering errors (E2xxx)
    /// Input broke the chromosome and start sort order
    OutOfOrder = 2001,

    // Configuration errors (E8xxx)
    /// Invalid configuration file or option
    InvalidConfig = 8001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-varload operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarloadError {
    /// A data row did not have exactly [`VALID_COLUMN_NO`] columns
    #[error("Malformed row at line {line}: expected {} columns, found {found}", VALID_COLUMN_NO)]
    MalformedRow { line: usize, found: usize },

    /// A document arrived out of chromosome and start order
    #[error("Variant {id} is out of order; sort the input by chromosome, start, end and submitter count")]
    OutOfOrder { id: String },

    /// Invalid configuration
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },
}

impl VarloadError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            VarloadError::MalformedRow { .. } => ErrorCode::MalformedRow,
            VarloadError::OutOfOrder { .. } => ErrorCode::OutOfOrder,
            VarloadError::Config { .. } => ErrorCode::InvalidConfig,
            VarloadError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        VarloadError::Config { msg: msg.into() }
    }
}

impl From<std::io::Error> for VarloadError {
    fn from(err: std::io::Error) -> Self {
        VarloadError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VarloadError {
    fn from(err: toml::de::Error) -> Self {
        VarloadError::Config {
            msg: err.to_string(),
        }
    }
}
