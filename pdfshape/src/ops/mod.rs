//! Transform operations and the engine loop.
//!
//! Every operation follows the same path: a [`ValidatedRequest`] is
//! executed, the inputs are opened, pages are copied or mutated through
//! [`DocumentHandle`], and the result is serialized. Operations are
//! all-or-nothing: on any error the in-progress output is dropped and no
//! partial result escapes.
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::ops::{ExecutionContext, transform};
//! use pdfshape::request::{SourceFile, TransformRequest};
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> pdfshape::Result<()> {
//! let sources = vec![SourceFile::document("a.pdf", a), SourceFile::document("b.pdf", b)];
//! let outcome = transform(TransformRequest::Merge, sources, &ExecutionContext::default())?;
//! println!("{} bytes", outcome.result.total_bytes());
//! # Ok(())
//! # }
//! ```

pub mod images;
pub mod merge;
pub mod numbering;
pub mod reorder;
pub mod rotate;
pub mod split;
pub mod watermark;

use tracing::{info, info_span};

use crate::config::{Config, Metadata};
use crate::document::{DocumentHandle, SaveOptions, metadata};
use crate::error::{ImageDecodeWarning, Result};
use crate::request::{SourceFile, TransformRequest, ValidatedRequest};

/// A produced document: suggested file name plus serialized bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// Suggested file name, e.g. `report_rotated.pdf`.
    pub name: String,
    /// Serialized PDF.
    pub bytes: Vec<u8>,
}

impl OutputDocument {
    /// Size of the serialized document.
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for OutputDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDocument")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One document, or an ordered list of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    /// A single output.
    Single(OutputDocument),
    /// Several outputs in positional order (e.g. one per split range).
    Multiple(Vec<OutputDocument>),
}

impl TransformResult {
    /// The documents, in order.
    pub fn documents(&self) -> &[OutputDocument] {
        match self {
            Self::Single(doc) => std::slice::from_ref(doc),
            Self::Multiple(docs) => docs,
        }
    }

    /// Consume the result, returning its documents.
    pub fn into_documents(self) -> Vec<OutputDocument> {
        match self {
            Self::Single(doc) => vec![doc],
            Self::Multiple(docs) => docs,
        }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents().len()
    }

    /// Whether there are no documents.
    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// Combined size of all documents.
    pub fn total_bytes(&self) -> usize {
        self.documents().iter().map(OutputDocument::byte_size).sum()
    }
}

/// Terminal outcome of a successful transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Produced documents.
    pub result: TransformResult,
    /// Inputs that were skipped (images-to-document only).
    pub warnings: Vec<ImageDecodeWarning>,
}

impl From<TransformResult> for TransformOutcome {
    fn from(result: TransformResult) -> Self {
        Self {
            result,
            warnings: Vec::new(),
        }
    }
}

/// Settings that shape output without changing what an operation does.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Overrides the base of every suggested output name.
    pub base_name: Option<String>,
    /// Structural save options.
    pub save_options: SaveOptions,
    /// Info dictionary fields written to every output.
    pub metadata: Metadata,
    /// Creator/Producer string.
    pub producer: String,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            base_name: None,
            save_options: SaveOptions::default(),
            metadata: Metadata::default(),
            producer: format!("{} {}", crate::NAME, crate::VERSION),
        }
    }
}

impl From<&Config> for ExecutionContext {
    fn from(config: &Config) -> Self {
        Self {
            base_name: config.base_name.clone(),
            save_options: config.compression.into(),
            metadata: config.metadata.clone(),
            ..Self::default()
        }
    }
}

impl ExecutionContext {
    /// The configured base name, or `fallback`.
    pub fn base_name_or(&self, fallback: &str) -> String {
        self.base_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Base name the operation will use for its outputs, and the packager
    /// for an archive.
    pub fn base_name_for(&self, validated: &ValidatedRequest) -> String {
        let fallback = match validated.request() {
            TransformRequest::Merge => "merged",
            TransformRequest::ImagesToDocument { .. } => "images",
            _ => validated
                .sources()
                .first()
                .map(SourceFile::stem)
                .unwrap_or("output"),
        };
        self.base_name_or(fallback)
    }

    /// Write metadata and serialize.
    pub(crate) fn finish(&self, mut handle: DocumentHandle, name: String) -> Result<OutputDocument> {
        metadata::apply(&mut handle, &self.metadata, &self.producer)?;
        let bytes = handle.serialize(&self.save_options)?;
        Ok(OutputDocument { name, bytes })
    }
}

impl ValidatedRequest {
    /// Run the operation.
    ///
    /// Consumes the request and its inputs. Either every output is produced
    /// or an error is returned and nothing is.
    pub fn execute(self, context: &ExecutionContext) -> Result<TransformOutcome> {
        let operation = self.request.name();
        let span = info_span!("transform", operation);
        let _guard = span.enter();

        info!(inputs = self.sources.len(), "starting");

        let Self { request, sources } = self;
        let outcome = match request {
            TransformRequest::Merge => merge::run(sources, context)?.into(),
            TransformRequest::Split { mode } => split::run(single(sources)?, &mode, context)?.into(),
            TransformRequest::Rotate { angle, scope } => {
                rotate::run(single(sources)?, angle, &scope, context)?.into()
            }
            TransformRequest::Watermark(options) => {
                watermark::run(single(sources)?, &options, context)?.into()
            }
            TransformRequest::ImagesToDocument { sizing } => images::run(sources, &sizing, context)?,
            TransformRequest::Reorder { order } => {
                reorder::run(single(sources)?, &order, context)?.into()
            }
            TransformRequest::PageNumbers(options) => {
                numbering::run(single(sources)?, &options, context)?.into()
            }
        };

        info!(
            outputs = outcome.result.len(),
            bytes = outcome.result.total_bytes(),
            warnings = outcome.warnings.len(),
            "finished"
        );
        Ok(outcome)
    }
}

impl From<OutputDocument> for TransformOutcome {
    fn from(doc: OutputDocument) -> Self {
        TransformResult::Single(doc).into()
    }
}

/// Validate and execute in one step.
pub fn transform(
    request: TransformRequest,
    sources: Vec<SourceFile>,
    context: &ExecutionContext,
) -> Result<TransformOutcome> {
    request.validate(sources)?.execute(context)
}

/// The one input of a single-document operation. Validation guarantees it.
fn single(sources: Vec<SourceFile>) -> Result<SourceFile> {
    let provided = sources.len();
    sources
        .into_iter()
        .next()
        .ok_or_else(|| crate::PdfShapeError::insufficient_input(1, provided))
}

/// Open a document input, labelling errors with its name.
pub(crate) fn open(source: &SourceFile) -> Result<DocumentHandle> {
    DocumentHandle::open_named(&source.name, &source.bytes)
}
