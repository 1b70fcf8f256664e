//! Error types for pdfshape.
//!
//! Every failure below the engine boundary is typed and returned. The
//! component-level errors ([`ParseError`], [`RangeError`], [`DocumentError`])
//! are small enums that nest inside [`PdfShapeError`], so `?` carries them up
//! to the caller unchanged.
//!
//! # Error Categories
//!
//! - **Request errors**: malformed page ranges, out-of-bounds selections,
//!   missing inputs, invalid operation parameters
//! - **Document errors**: corrupted or encrypted input documents
//! - **Operation errors**: an internal inconsistency while transforming
//! - **I/O errors**: reading inputs and writing deliverables

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdfshape operations.
pub type Result<T> = std::result::Result<T, PdfShapeError>;

/// Syntax errors in a page-range expression such as `"1-3,5"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The expression selects nothing.
    #[error("page range is empty")]
    Empty,

    /// A token is not a non-negative integer.
    #[error("invalid page number '{token}'")]
    InvalidNumber {
        /// Offending token, trimmed.
        token: String,
    },

    /// Page numbers are 1-based.
    #[error("page numbers start at 1, found 0 in '{segment}'")]
    ZeroPage {
        /// Segment that contained the zero.
        segment: String,
    },

    /// `end < start`.
    #[error("range {start}-{end} is inverted: start must not exceed end")]
    InvertedRange {
        /// First page of the range.
        start: u32,
        /// Last page of the range.
        end: u32,
    },

    /// A segment is not `N` or `N-M`.
    #[error("malformed range segment '{segment}', expected a page like '5' or a range like '1-5'")]
    Malformed {
        /// Offending segment, trimmed.
        segment: String,
    },
}

/// A parsed selection that does not fit the document it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// A page lies beyond the end of the document.
    #[error("page {page} is out of bounds, the document has {total_pages} page(s)")]
    OutOfBounds {
        /// Offending page number.
        page: u32,
        /// Pages in the document.
        total_pages: u32,
    },

    /// A page number of zero reached the mapper.
    #[error("page numbers start at 1")]
    ZeroPage,

    /// An inverted span reached the mapper.
    #[error("range {start}-{end} is inverted")]
    Inverted {
        /// First page of the span.
        start: u32,
        /// Last page of the span.
        end: u32,
    },

    /// The selection resolved to no pages.
    #[error("selection contains no pages")]
    EmptySelection,

    /// The document has no pages to select from.
    #[error("document has no pages")]
    EmptyDocument,
}

/// Failures opening or interpreting a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Structure cannot be parsed.
    #[error("corrupted or invalid PDF: {details}")]
    Corrupt {
        /// Parser diagnostics.
        details: String,
    },

    /// The document is password protected.
    #[error("PDF is encrypted and cannot be processed")]
    Encrypted,
}

impl DocumentError {
    pub(crate) fn corrupt(details: impl Into<String>) -> Self {
        Self::Corrupt {
            details: details.into(),
        }
    }
}

/// An image input that was skipped. Not an error: the rest of the batch
/// still produces pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImageDecodeWarning {
    /// Zero-based position of the image among the inputs.
    pub index: usize,
    /// Name of the input.
    pub name: String,
    /// Why it could not be decoded.
    pub reason: String,
}

impl fmt::Display for ImageDecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipped image #{} ({}): {}",
            self.index + 1,
            self.name,
            self.reason
        )
    }
}

/// Main error type for pdfshape operations.
#[derive(Debug)]
pub enum PdfShapeError {
    /// Input file was not found.
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is not a regular file.
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Page-range text could not be parsed.
    Parse(ParseError),

    /// A page selection does not fit the document.
    Range(RangeError),

    /// An input document could not be opened.
    Document {
        /// Name of the input, as supplied by the caller.
        name: String,
        /// What went wrong.
        error: DocumentError,
    },

    /// The operation needs more inputs than were supplied.
    InsufficientInput {
        /// Minimum number of inputs.
        required: usize,
        /// Number of inputs supplied.
        provided: usize,
    },

    /// Operation parameters are invalid.
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// The transform hit an internal inconsistency. No output was produced.
    OperationFailed {
        /// Operation name.
        operation: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// Output documents could not be packaged.
    PackageFailed {
        /// What went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read input list file.
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// User cancelled the operation.
    Cancelled,

    /// Generic I/O error.
    Io {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Generic error with a custom message.
    Other {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for PdfShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            Self::FileNotAccessible { path, source } => {
                write!(
                    f,
                    "Cannot access file: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::NotAFile { path } => {
                write!(f, "Not a file: {}", path.display())
            }
            Self::Parse(err) => {
                write!(f, "Invalid page range: {err}")
            }
            Self::Range(err) => {
                write!(f, "Page selection rejected: {err}")
            }
            Self::Document {
                name,
                error: DocumentError::Encrypted,
            } => {
                write!(
                    f,
                    "PDF is encrypted and cannot be processed: {name}\n  \
                     Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
                )
            }
            Self::Document { name, error } => {
                write!(f, "Cannot open document: {name}\n  Reason: {error}")
            }
            Self::InsufficientInput { required, provided } => {
                write!(
                    f,
                    "Not enough inputs: {required} required, {provided} provided"
                )
            }
            Self::InvalidRequest { message } => {
                write!(f, "Invalid request: {message}")
            }
            Self::OperationFailed { operation, reason } => {
                write!(f, "{operation} failed: {reason}")
            }
            Self::PackageFailed { reason } => {
                write!(f, "Failed to package output: {reason}")
            }
            Self::OutputExists { path } => {
                write!(
                    f,
                    "Output file already exists: {}\n  \
                     Use --force to overwrite or choose a different output path",
                    path.display()
                )
            }
            Self::FailedToCreateOutput { path, source } => {
                write!(
                    f,
                    "Failed to create output file: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::FailedToWrite { path, source } => {
                write!(
                    f,
                    "Failed to write to output file: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::FailedToReadInputList { path, source } => {
                write!(
                    f,
                    "Failed to read input list file: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::Cancelled => {
                write!(f, "Operation cancelled by user")
            }
            Self::Io { source } => {
                write!(f, "I/O error: {source}")
            }
            Self::Other { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for PdfShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileNotAccessible { source, .. } => Some(source),
            Self::FailedToCreateOutput { source, .. } => Some(source),
            Self::FailedToWrite { source, .. } => Some(source),
            Self::FailedToReadInputList { source, .. } => Some(source),
            Self::Io { source } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Range(err) => Some(err),
            Self::Document { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for PdfShapeError {
    fn from(err: io::Error) -> Self {
        Self::Io { source: err }
    }
}

impl From<ParseError> for PdfShapeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<RangeError> for PdfShapeError {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl From<DocumentError> for PdfShapeError {
    fn from(err: DocumentError) -> Self {
        Self::document("document", err)
    }
}

impl From<anyhow::Error> for PdfShapeError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfShapeError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a Document error for the named input.
    pub fn document(name: impl Into<String>, error: DocumentError) -> Self {
        Self::Document {
            name: name.into(),
            error,
        }
    }

    /// Create an InsufficientInput error.
    pub fn insufficient_input(required: usize, provided: usize) -> Self {
        Self::InsufficientInput { required, provided }
    }

    /// Create an InvalidRequest error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an OperationFailed error.
    pub fn operation_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// Create a PackageFailed error.
    pub fn package_failed(reason: impl Into<String>) -> Self {
        Self::PackageFailed {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by correcting the request.
    ///
    /// Returns true for malformed selections and parameters, which a caller
    /// can fix and resubmit without changing the input files.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse(_)
                | Self::Range(_)
                | Self::InvalidRequest { .. }
                | Self::InsufficientInput { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } | Self::Cancelled
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::Parse(_) => 1,
            Self::Range(_) => 1,
            Self::InsufficientInput { .. } => 1,
            Self::InvalidRequest { .. } => 1,
            Self::Document { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::OperationFailed { .. } => 6,
            Self::PackageFailed { .. } => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Other { .. } => 1,
        }
    }
}
