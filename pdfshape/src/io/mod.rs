//! File I/O at the edges of a run.
//!
//! The engine itself works on bytes. This module reads inputs from disk
//! into [`SourceFile`](crate::request::SourceFile)s and writes the packaged
//! deliverable back out.
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::io::{read_sources, write_deliverable};
//! use pdfshape::ops::{ExecutionContext, transform};
//! use pdfshape::package::package;
//! use pdfshape::request::{ContentKind, TransformRequest};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let sources = read_sources(&paths, ContentKind::Document).await?;
//! let outcome = transform(TransformRequest::Merge, sources, &ExecutionContext::default())?;
//! let unit = package(outcome.result, "merged")?;
//! write_deliverable(&unit, Path::new(&unit.file_name)).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{ReadStatistics, SourceReader};
pub use writer::{DeliverableWriter, WriteOptions, WriteStatistics};

use crate::error::Result;
use crate::package::DeliverableUnit;
use crate::request::{ContentKind, SourceFile};
use std::path::{Path, PathBuf};

/// Read every path as `kind`, four at a time.
pub async fn read_sources(paths: &[PathBuf], kind: ContentKind) -> Result<Vec<SourceFile>> {
    let (sources, _) = SourceReader::new(kind).read_all(paths, 4).await?;
    Ok(sources)
}

/// Atomically write a deliverable, replacing any existing file.
pub async fn write_deliverable(unit: &DeliverableUnit, path: &Path) -> Result<()> {
    DeliverableWriter::new().write(unit, path).await?;
    Ok(())
}
