//! Reading inputs from disk.
//!
//! Inputs are read as raw bytes and tagged with the content kind the
//! operation expects. Nothing is parsed here; documents are opened by the
//! operation that consumes them.
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::io::reader::SourceReader;
//! use pdfshape::request::ContentKind;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new(ContentKind::Document);
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (sources, stats) = reader.read_all(&paths, 4).await?;
//! println!("read {} files, {} bytes", stats.file_count, stats.total_size);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::{PdfShapeError, Result};
use crate::request::{ContentKind, SourceFile};

/// Statistics for a batch read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadStatistics {
    /// Number of files read.
    pub file_count: usize,

    /// Total bytes read.
    pub total_size: u64,

    /// Wall-clock time for the whole batch.
    pub total_time: Duration,
}

/// Reads input files as [`SourceFile`]s of one content kind.
#[derive(Debug, Clone, Copy)]
pub struct SourceReader {
    kind: ContentKind,
}

impl SourceReader {
    /// Create a reader that tags every input with `kind`.
    pub fn new(kind: ContentKind) -> Self {
        Self { kind }
    }

    /// Read a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The path is not a regular file
    /// - The file cannot be read
    pub async fn read(&self, path: &Path) -> Result<SourceFile> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                PdfShapeError::file_not_found(path.to_path_buf())
            } else {
                PdfShapeError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(PdfShapeError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PdfShapeError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;
        trace!(path = %path.display(), bytes = bytes.len(), "read input");

        Ok(SourceFile {
            name: display_name(path),
            kind: self.kind,
            bytes,
        })
    }

    /// Read every path, up to `workers` at a time.
    ///
    /// Sources come back in the order of `paths`. The first failure aborts
    /// the batch.
    pub async fn read_all(
        &self,
        paths: &[PathBuf],
        workers: usize,
    ) -> Result<(Vec<SourceFile>, ReadStatistics)> {
        let start = Instant::now();
        let reader = *self;

        let sources: Vec<SourceFile> = stream::iter(paths.iter().cloned())
            .map(|path| async move { reader.read(&path).await })
            .buffered(workers.max(1))
            .try_collect()
            .await?;

        let stats = ReadStatistics {
            file_count: sources.len(),
            total_size: sources.iter().map(|s| s.bytes.len() as u64).sum(),
            total_time: start.elapsed(),
        };
        debug!(
            files = stats.file_count,
            bytes = stats.total_size,
            "inputs read"
        );

        Ok((sources, stats))
    }
}

/// The file name component, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
