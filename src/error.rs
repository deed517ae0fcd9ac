//! Error types for render-shim.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::config::DocumentType;
use crate::exit_codes;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for render-shim operations.
///
/// Each variant maps to a CLI exit code (see [`ShimError::exit_code`]).
#[derive(Error, Debug)]
pub enum ShimError {
    /// The document-type key is neither `pdf` nor `image`.
    #[error("unknown document type '{0}' (expected 'pdf' or 'image')")]
    UnknownDocumentType(String),

    /// Rendering for this document type is switched off in the configuration.
    #[error("{0} rendering is disabled")]
    Disabled(DocumentType),

    /// The configured binary does not exist or is not executable.
    #[error("renderer binary not found or not executable: {}", .path.display())]
    BinaryNotFound { path: PathBuf },

    /// The binary did not exit within the configured timeout and was killed.
    #[error("renderer timed out after {:.3}s and was terminated", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    /// The binary exited unsuccessfully. `code` is `None` when killed by a signal.
    #[error("renderer exited with {}: {stderr}", format_code(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// Reading from or writing to the binary's streams or temporary files failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be read, parsed, or validated.
    #[error("{0}")]
    Config(String),

    /// The output file exists and overwriting was not requested.
    #[error("output file '{}' already exists (pass --overwrite to replace it)", .path.display())]
    OutputExists { path: PathBuf },
}

/// Fieldless discriminant of [`ShimError`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownDocumentType,
    Disabled,
    BinaryNotFound,
    Timeout,
    NonZeroExit,
    Io,
    Config,
    OutputExists,
}

impl ShimError {
    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ShimError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShimError::UnknownDocumentType(_) => ErrorKind::UnknownDocumentType,
            ShimError::Disabled(_) => ErrorKind::Disabled,
            ShimError::BinaryNotFound { .. } => ErrorKind::BinaryNotFound,
            ShimError::Timeout { .. } => ErrorKind::Timeout,
            ShimError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            ShimError::Io { .. } => ErrorKind::Io,
            ShimError::Config(_) => ErrorKind::Config,
            ShimError::OutputExists { .. } => ErrorKind::OutputExists,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::UnknownDocumentType | ErrorKind::Config | ErrorKind::OutputExists => {
                exit_codes::USER_ERROR
            }
            ErrorKind::NonZeroExit | ErrorKind::Io => exit_codes::RENDER_FAILURE,
            ErrorKind::Timeout => exit_codes::TIMEOUT,
            ErrorKind::Disabled | ErrorKind::BinaryNotFound => exit_codes::UNAVAILABLE,
        }
    }
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for render-shim operations.
pub type Result<T> = std::result::Result<T, ShimError>;
