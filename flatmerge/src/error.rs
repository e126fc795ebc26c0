//! Error types for flatmerge.
//!
//! This module defines all error types that can occur while registering,
//! flattening and writing documents. Errors carry enough context (document
//! position, name, page and underlying cause) for a caller to drop the
//! offending document and retry, or to report the problem upstream.
//!
//! # Error Categories
//!
//! - **Registry Errors**: Invalid reorder permutations
//! - **Merge Errors**: Empty input, page rasterization or encoding failures
//! - **I/O Errors**: File not found, permission denied, failed writes
//! - **Validation Errors**: Invalid arguments or configuration
//!
//! Rejected and duplicate uploads are *outcomes* of registration, not errors;
//! see [`crate::registry::RegisterOutcome`].

use std::io;
use std::path::PathBuf;

/// Result type alias for flatmerge operations.
pub type Result<T> = std::result::Result<T, FlatMergeError>;

/// Main error type for flatmerge operations.
#[derive(Debug, thiserror::Error)]
pub enum FlatMergeError {
    /// A reorder request did not name exactly the registered documents.
    #[error(
        "Invalid reorder request: expected a permutation of {expected} document(s), got {given} identifier(s)"
    )]
    InvalidPermutation {
        /// Number of documents currently registered.
        expected: usize,
        /// Number of identifiers supplied by the caller.
        given: usize,
    },

    /// A merge was requested with zero documents.
    #[error("No documents to merge")]
    EmptyInput,

    /// A page failed to rasterize or encode. The whole merge is aborted.
    #[error("{}", format_render_error(.document_index, .page_index, .document_name, .cause))]
    RenderError {
        /// Zero-based position of the document in the merge input.
        document_index: usize,
        /// Zero-based page index within the document, if the failure was page-specific.
        page_index: Option<usize>,
        /// Display name of the failing document.
        document_name: String,
        /// Underlying cause reported by the renderer or encoder.
        cause: String,
    },

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file could not be read.
    #[error("Failed to read input file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInput {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains invalid entries.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        .path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Invalid configuration or render parameters.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

fn format_render_error(
    document_index: &usize,
    page_index: &Option<usize>,
    document_name: &str,
    cause: &str,
) -> String {
    match page_index {
        Some(page) => format!(
            "Failed to flatten page {} of document #{} ({document_name})\n  Cause: {cause}",
            page + 1,
            document_index + 1
        ),
        None => format!(
            "Failed to open document #{} ({document_name}) for flattening\n  Cause: {cause}",
            document_index + 1
        ),
    }
}

impl From<lopdf::Error> for FlatMergeError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<mupdf::Error> for FlatMergeError {
    fn from(err: mupdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<image::ImageError> for FlatMergeError {
    fn from(err: image::ImageError) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for FlatMergeError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl FlatMergeError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a RenderError for a specific page.
    pub fn render_failed(
        document_index: usize,
        page_index: usize,
        document_name: impl Into<String>,
        cause: impl ToString,
    ) -> Self {
        Self::RenderError {
            document_index,
            page_index: Some(page_index),
            document_name: document_name.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a RenderError for a document that could not be opened at all.
    pub fn open_failed(
        document_index: usize,
        document_name: impl Into<String>,
        cause: impl ToString,
    ) -> Self {
        Self::RenderError {
            document_index,
            page_index: None,
            document_name: document_name.into(),
            cause: cause.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (operation can continue).
    ///
    /// Recoverable errors concern a single input: the caller can drop the
    /// offending file or document and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::NotAFile { .. }
                | Self::FailedToReadInput { .. }
                | Self::RenderError { .. }
                | Self::InvalidPermutation { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadInput { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::RenderError { .. } => 3,
            Self::EmptyInput => 1,
            Self::InvalidPermutation { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
