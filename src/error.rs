//! Error types for bidbind.
//!
//! The error taxonomy mirrors how the compiler treats failures:
//!
//! - **Recoverable-per-document**: a missing or unreadable input document is
//!   never surfaced here; it becomes a [`crate::compile::SkippedDocument`]
//!   diagnostic on the compile outcome.
//! - **Fatal-configuration**: a stamp image that cannot be read or embedded
//!   when stamping was requested aborts the whole compilation.
//! - **Fatal-I/O**: failures to create the output directory, serialize the
//!   assembled document, or write the final file always propagate.

use std::io;
use std::path::PathBuf;

/// Result type alias for bidbind operations.
pub type Result<T> = std::result::Result<T, BidBindError>;

/// Main error type for bidbind operations.
#[derive(Debug, thiserror::Error)]
pub enum BidBindError {
    /// Input file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {path}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// The requested stamp image could not be read or embedded.
    ///
    /// Stamping was explicitly requested by the caller, so this aborts the
    /// entire compilation instead of being skipped.
    #[error("Failed to prepare stamp image: {path}\n  Reason: {reason}")]
    StampImage {
        /// Path to the stamp image.
        path: PathBuf,
        /// Details about the failure.
        reason: String,
    },

    /// Failed to create the output file or its parent directory.
    #[error("Failed to create output: {path}\n  Reason: {source}")]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {path}\n  Reason: {source}")]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Assembling or serializing the output document failed.
    #[error("Failed to assemble document: {reason}")]
    AssemblyFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid compilation or merge options.
    #[error("Invalid options: {message}")]
    InvalidOptions {
        /// Description of what's wrong with the options.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for BidBindError {
    fn from(err: lopdf::Error) -> Self {
        Self::assembly_failed(err.to_string())
    }
}

impl BidBindError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a StampImage error.
    pub fn stamp_image(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::StampImage {
            path,
            reason: reason.into(),
        }
    }

    /// Create an AssemblyFailed error.
    pub fn assembly_failed(reason: impl Into<String>) -> Self {
        Self::AssemblyFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidOptions error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable at the per-document level.
    ///
    /// Recoverable errors are downgraded to skip diagnostics by the compiler
    /// and the submission merger instead of aborting the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::FailedToLoadPdf { .. }
        )
    }

    /// Check if this error always terminates the operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StampImage { .. }
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::AssemblyFailed { .. }
        )
    }
}
