//! Writing deliverables to disk.
//!
//! Writes are atomic by default: bytes go to a sibling temporary file that
//! is renamed over the destination once fully flushed, so a failed run never
//! leaves a half-written output behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::io::writer::DeliverableWriter;
//! use pdfshape::package::DeliverableUnit;
//! use std::path::Path;
//!
//! # async fn example(unit: DeliverableUnit) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = DeliverableWriter::new();
//! let stats = writer.write(&unit, Path::new("out.pdf")).await?;
//! println!("wrote {} bytes", stats.file_size);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{PdfShapeError, Result};
use crate::package::DeliverableUnit;

/// Options for writing deliverables.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Replace an existing file at the destination.
    pub overwrite: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            overwrite: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// Writes [`DeliverableUnit`]s to files.
#[derive(Debug, Clone, Default)]
pub struct DeliverableWriter {
    options: WriteOptions,
}

impl DeliverableWriter {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that refuses to replace existing files.
    pub fn no_clobber() -> Self {
        Self {
            options: WriteOptions {
                overwrite: false,
                ..Default::default()
            },
        }
    }

    /// Write the unit's bytes to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination exists and overwriting is disabled
    /// - The output file cannot be created
    /// - Writing or the final rename fails
    pub async fn write(&self, unit: &DeliverableUnit, path: &Path) -> Result<WriteStatistics> {
        if !self.options.overwrite && self.exists(path).await {
            return Err(PdfShapeError::output_exists(path.to_path_buf()));
        }

        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let bytes = unit.bytes.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if options.atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PdfShapeError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
            let written = writer
                .write_all(&bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| PdfShapeError::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                });
            drop(writer);

            if let Err(e) = written {
                if options.atomic {
                    let _ = std::fs::remove_file(&write_path);
                }
                return Err(e);
            }

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    PdfShapeError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            Ok::<_, PdfShapeError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PdfShapeError::other(format!("Write task failed: {e}")))??;

        debug!(
            path = %stats.output_path.display(),
            bytes = stats.file_size,
            "deliverable written"
        );
        Ok(stats)
    }

    /// Check that the destination's directory exists.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let metadata =
                tokio::fs::metadata(parent)
                    .await
                    .map_err(|e| PdfShapeError::FileNotAccessible {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;

            if !metadata.is_dir() {
                return Err(PdfShapeError::invalid_request(format!(
                    "Output directory is not a directory: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// Sibling temporary path: `out.pdf` becomes `out.pdf.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::ContentType;
    use tempfile::TempDir;

    fn unit(bytes: &[u8]) -> DeliverableUnit {
        DeliverableUnit {
            file_name: "out.pdf".to_string(),
            content_type: ContentType::Pdf,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_write_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.pdf");

        let stats = DeliverableWriter::new()
            .write(&unit(b"%PDF-1.7 data"), &output_path)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output_path).unwrap(), b"%PDF-1.7 data");
        assert_eq!(stats.file_size, 13);
        assert_eq!(stats.output_path, output_path);
        assert!(!temp_path(&output_path).exists());
    }

    #[tokio::test]
    async fn test_write_replaces_existing_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.pdf");
        std::fs::write(&output_path, b"old").unwrap();

        DeliverableWriter::new()
            .write(&unit(b"new"), &output_path)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output_path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_no_clobber_refuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.pdf");
        std::fs::write(&output_path, b"old").unwrap();

        let err = DeliverableWriter::no_clobber()
            .write(&unit(b"new"), &output_path)
            .await
            .unwrap_err();

        assert!(matches!(err, PdfShapeError::OutputExists { .. }));
        assert_eq!(std::fs::read(&output_path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_non_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.zip");

        let writer = DeliverableWriter::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        });
        writer.write(&unit(b"PK"), &output_path).await.unwrap();

        assert!(output_path.exists());
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("missing").join("out.pdf");

        let err = DeliverableWriter::new()
            .write(&unit(b"x"), &output_path)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfShapeError::FailedToCreateOutput { .. }));
    }

    #[tokio::test]
    async fn test_can_write() {
        let temp_dir = TempDir::new().unwrap();
        let writer = DeliverableWriter::new();

        assert!(writer.can_write(&temp_dir.path().join("out.pdf")).await.is_ok());
        assert!(
            writer
                .can_write(Path::new("/nonexistent/dir/out.pdf"))
                .await
                .is_err()
        );
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/tmp/a.pdf")),
            PathBuf::from("/tmp/a.pdf.tmp")
        );
    }
}
