//! Turning transform results into something deliverable.
//!
//! One document is delivered as-is. Several documents are bundled into a
//! zip archive whose entries keep the positional names the operation gave
//! them. Nothing is reordered or renamed.

use serde::Serialize;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{PdfShapeError, Result};
use crate::ops::{OutputDocument, TransformResult};

/// What a deliverable contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A single PDF.
    Pdf,
    /// A zip archive of PDFs.
    Zip,
}

impl ContentType {
    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Zip => "application/zip",
        }
    }
}

/// Bytes plus a suggested file name.
#[derive(Clone, PartialEq, Eq)]
pub struct DeliverableUnit {
    /// Suggested file name.
    pub file_name: String,
    /// Content type.
    pub content_type: ContentType,
    /// The bytes to deliver.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DeliverableUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverableUnit")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl From<OutputDocument> for DeliverableUnit {
    fn from(doc: OutputDocument) -> Self {
        Self {
            file_name: doc.name,
            content_type: ContentType::Pdf,
            bytes: doc.bytes,
        }
    }
}

/// Package a result for delivery.
///
/// Two or more documents become `{base_name}.zip`.
///
/// # Examples
///
/// ```
/// use pdfshape::ops::{OutputDocument, TransformResult};
/// use pdfshape::package::{ContentType, package};
///
/// let single = TransformResult::Single(OutputDocument {
///     name: "report_rotated.pdf".into(),
///     bytes: b"%PDF-1.7".to_vec(),
/// });
/// let unit = package(single, "report").unwrap();
/// assert_eq!(unit.content_type, ContentType::Pdf);
/// assert_eq!(unit.file_name, "report_rotated.pdf");
/// ```
pub fn package(result: TransformResult, base_name: &str) -> Result<DeliverableUnit> {
    let mut documents = match result {
        TransformResult::Single(doc) => return Ok(doc.into()),
        TransformResult::Multiple(documents) => documents,
    };

    match documents.len() {
        0 => Err(PdfShapeError::package_failed("nothing to package")),
        1 => Ok(documents.remove(0).into()),
        _ => {
            let bytes = archive(&documents)?;
            debug!(
                entries = documents.len(),
                bytes = bytes.len(),
                "packaged archive"
            );
            Ok(DeliverableUnit {
                file_name: format!("{base_name}.zip"),
                content_type: ContentType::Zip,
                bytes,
            })
        }
    }
}

fn archive(documents: &[OutputDocument]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        // Fixed timestamp keeps archives reproducible
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for doc in documents {
            zip.start_file(doc.name.as_str(), options).map_err(|e| {
                PdfShapeError::package_failed(format!("entry {}: {e}", doc.name))
            })?;
            zip.write_all(&doc.bytes).map_err(|e| {
                PdfShapeError::package_failed(format!("entry {}: {e}", doc.name))
            })?;
        }
        zip.finish()
            .map_err(|e| PdfShapeError::package_failed(format!("finalize: {e}")))?;
    }
    Ok(buffer)
}
