//! Pre-flight checks and document inspection.
//!
//! The engine validates requests itself; this module covers what sits
//! around it on disk:
//! - Input existence and accessibility
//! - Whether an output may be written
//! - Per-document facts for the `info` command
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::validation::Validator;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Validator::new().inspect_file(Path::new("report.pdf")).await?;
//! println!("{} has {} pages", info.name, info.page_count);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{Config, OverwriteMode};
use crate::document::DocumentHandle;
use crate::error::{PdfShapeError, Result};
use crate::io::SourceReader;
use crate::output::format_file_size;
use crate::request::ContentKind;

/// Facts about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number.
    pub number: u32,

    /// Width in points.
    pub width: f32,

    /// Height in points.
    pub height: f32,

    /// Effective rotation in degrees.
    pub rotation: u16,
}

/// Facts about one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// Input name.
    pub name: String,

    /// Number of pages.
    pub page_count: u32,

    /// PDF header version, e.g. `1.7`.
    pub version: String,

    /// Size of the input in bytes.
    pub file_size: u64,

    /// Every page, in order.
    pub pages: Vec<PageInfo>,

    /// Whether every page has the same size.
    pub uniform_size: bool,
}

impl DocumentInfo {
    /// Format the file size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Result of checking a set of input paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// The checked inputs, in order.
    pub inputs: Vec<PathBuf>,

    /// Total size in bytes.
    pub total_size: u64,
}

impl ValidationSummary {
    /// Number of inputs checked.
    pub fn files_validated(&self) -> usize {
        self.inputs.len()
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Validator for input and output paths.
#[derive(Debug, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Check that a single input exists and is a file.
    ///
    /// Empty documents are rejected here. Empty images are left to the
    /// operation, which skips them with a warning.
    ///
    /// Returns the file size.
    pub async fn validate_input(&self, path: &Path, kind: ContentKind) -> Result<u64> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
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

        if metadata.len() == 0 && kind == ContentKind::Document {
            return Err(PdfShapeError::invalid_request(format!(
                "Input file is empty: {}",
                path.display()
            )));
        }

        Ok(metadata.len())
    }

    /// Check every input. Stops at the first failure.
    pub async fn validate_inputs(
        &self,
        paths: &[PathBuf],
        kind: ContentKind,
    ) -> Result<ValidationSummary> {
        let mut total_size = 0;
        for path in paths {
            total_size += self.validate_input(path, kind).await?;
        }

        Ok(ValidationSummary {
            inputs: paths.to_vec(),
            total_size,
        })
    }

    /// Check that the deliverable may be written to `path`.
    ///
    /// With [`OverwriteMode::Prompt`] an existing file is left for the
    /// caller to ask about.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output file exists and no-clobber is set
    /// - Output directory doesn't exist
    pub async fn validate_output(&self, config: &Config, path: &Path) -> Result<()> {
        if config.overwrite_mode == OverwriteMode::NoClobber
            && tokio::fs::metadata(path).await.is_ok()
        {
            return Err(PdfShapeError::output_exists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let is_dir = tokio::fs::metadata(parent)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(PdfShapeError::invalid_request(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Read and describe a PDF.
    pub async fn inspect_file(&self, path: &Path) -> Result<DocumentInfo> {
        let source = SourceReader::new(ContentKind::Document).read(path).await?;
        inspect(&source.name, &source.bytes)
    }
}

/// Describe a serialized PDF.
pub fn inspect(name: &str, bytes: &[u8]) -> Result<DocumentInfo> {
    let handle = DocumentHandle::open_named(name, bytes)?;

    let pages = (1..=handle.page_count())
        .map(|number| {
            let size = handle.page_size(number)?;
            Ok(PageInfo {
                number,
                width: size.width,
                height: size.height,
                rotation: handle.rotation(number)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let uniform_size = pages
        .windows(2)
        .all(|w| (w[0].width, w[0].height) == (w[1].width, w[1].height));

    debug!(name, pages = pages.len(), uniform_size, "inspected");

    Ok(DocumentInfo {
        name: name.to_string(),
        page_count: handle.page_count(),
        version: handle.version().to_string(),
        file_size: bytes.len() as u64,
        pages,
        uniform_size,
    })
}
