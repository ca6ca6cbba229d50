//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while reading trace inputs
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read trace: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur during score file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Timeline file number {0} exceeds {1} digits")]
    TimelineLimit(u32, usize),

    #[error("Timeline output is disabled")]
    TimelineDisabled,
}

/// Errors that can occur while decoding a binary score file
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Invalid category value: {0}")]
    InvalidCategory(u8),

    #[error("Invalid UTF-8 in string table: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("Malformed length prefix")]
    InvalidLength,
}
