//! pdfshape - Reshape PDF documents.
//!
//! This library takes PDF documents (and raster images) as bytes, applies
//! one structural operation, and returns new documents as bytes. It
//! supports:
//!
//! - Merging documents in order
//! - Splitting by page ranges, per page, or extracting a selection
//! - Absolute page rotation
//! - Text and image watermarks
//! - Building a document from images
//! - Reordering pages and stamping page numbers
//! - Packaging several outputs as a zip archive
//!
//! # Examples
//!
//! ## Split a document by ranges
//!
//! ```no_run
//! use pdfshape::ops::{ExecutionContext, transform};
//! use pdfshape::package::package;
//! use pdfshape::range::PageRanges;
//! use pdfshape::request::{SourceFile, SplitMode, TransformRequest};
//!
//! # fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let request = TransformRequest::Split {
//!     mode: SplitMode::Ranges(PageRanges::parse("1-3,5")?),
//! };
//! let sources = vec![SourceFile::document("report.pdf", bytes)];
//!
//! let outcome = transform(request, sources, &ExecutionContext::default())?;
//! let unit = package(outcome.result, "report")?;
//! assert_eq!(unit.file_name, "report.zip");
//! # Ok(())
//! # }
//! ```
//!
//! ## Working from files
//!
//! ```no_run
//! use pdfshape::io::{SourceReader, write_deliverable};
//! use pdfshape::ops::{ExecutionContext, transform};
//! use pdfshape::package::package;
//! use pdfshape::request::{ContentKind, RotateScope, RotationAngle, TransformRequest};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new(ContentKind::Document);
//! let (sources, _) = reader.read_all(&[PathBuf::from("scan.pdf")], 1).await?;
//!
//! let request = TransformRequest::Rotate {
//!     angle: RotationAngle::Deg90,
//!     scope: RotateScope::AllPages,
//! };
//! let outcome = transform(request, sources, &ExecutionContext::default())?;
//! let unit = package(outcome.result, "scan")?;
//! write_deliverable(&unit, Path::new(&unit.file_name)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod io;
pub mod ops;
pub mod output;
pub mod package;
pub mod range;
pub mod raster;
pub mod request;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfShapeError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
