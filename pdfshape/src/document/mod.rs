//! Ownership boundary around an opened PDF.
//!
//! A [`DocumentHandle`] owns one in-memory document and exposes the page
//! primitives every transform is built from: page count and size, copying
//! pages out into a detached [`PageBatch`], appending batches, absolute
//! rotation, overlays, and serialization. Callers never see lopdf objects.
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::document::{DocumentHandle, SaveOptions};
//!
//! # fn example(bytes: &[u8]) -> pdfshape::Result<()> {
//! let source = DocumentHandle::open(bytes)?;
//! let batch = source.copy_pages(&[3, 1])?;
//! drop(source);
//!
//! let mut target = DocumentHandle::new_document();
//! target.append_pages(batch)?;
//! target.set_rotation(1, 90)?;
//! let output = target.serialize(&SaveOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod import;
pub mod metadata;
pub mod overlay;

pub use import::PageBatch;
pub use overlay::{Anchor, OverlayContent, OverlaySpec, Placement, TextMark};

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompressionLevel;
use crate::error::{DocumentError, PdfShapeError, RangeError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_ATTRIBUTES: [&[u8]; 4] =
    [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree walked when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no MediaBox anywhere in its ancestry.
const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// Width and height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl PageSize {
    /// Create a page size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Swap width and height.
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// A page's visible rectangle: lower-left corner plus extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x.
    pub x: f32,
    /// Lower-left y.
    pub y: f32,
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl PageBox {
    /// Size of the box.
    pub fn size(&self) -> PageSize {
        PageSize::new(self.width, self.height)
    }
}

/// Structural options applied when a handle is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Flate-compress streams that are stored uncompressed.
    pub compress: bool,
    /// Drop unreachable objects and renumber the rest.
    pub optimize: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        CompressionLevel::default().into()
    }
}

impl From<CompressionLevel> for SaveOptions {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::None => Self {
                compress: false,
                optimize: false,
            },
            CompressionLevel::Standard => Self {
                compress: true,
                optimize: false,
            },
            CompressionLevel::Maximum => Self {
                compress: true,
                optimize: true,
            },
        }
    }
}

/// Exclusive owner of one opened (or newly created) document.
#[derive(Debug)]
pub struct DocumentHandle {
    doc: Document,
    name: String,
    pages_root: ObjectId,
    pages: Vec<ObjectId>,
    overlay: overlay::OverlayCache,
}

impl DocumentHandle {
    /// Open a document from its serialized bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Encrypted`] for password-protected input and
    /// [`DocumentError::Corrupt`] for anything that cannot be parsed or has
    /// no pages.
    pub fn open(bytes: &[u8]) -> std::result::Result<Self, DocumentError> {
        let doc = Document::load_mem(bytes).map_err(|e| classify_load_error(&e))?;
        Self::from_document(doc)
    }

    /// Open a document and label it for error messages.
    pub fn open_named(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        match Self::open(bytes) {
            Ok(handle) => Ok(handle.with_name(name)),
            Err(error) => Err(PdfShapeError::document(name, error)),
        }
    }

    pub(crate) fn from_document(doc: Document) -> std::result::Result<Self, DocumentError> {
        // lopdf keeps /Encrypt in the trailer when it could not decrypt
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(DocumentError::Encrypted);
        }

        let pages_root = doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(|pages| pages.as_reference())
            .map_err(|e| DocumentError::corrupt(format!("missing page tree: {e}")))?;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(DocumentError::corrupt("PDF has no pages"));
        }

        Ok(Self {
            doc,
            name: String::from("document"),
            pages_root,
            pages,
            overlay: Default::default(),
        })
    }

    /// Create an empty document with a page tree and no pages.
    pub fn new_document() -> Self {
        let mut doc = Document::with_version("1.7");

        let pages_root = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_root,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            name: String::from("new document"),
            pages_root,
            pages: Vec::new(),
            overlay: Default::default(),
        }
    }

    /// Replace the label used in error messages.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// PDF version string from the header, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Size of a 1-based page, from its effective MediaBox.
    pub fn page_size(&self, page: u32) -> Result<PageSize> {
        self.page_box(page).map(|b| b.size())
    }

    /// Size of a 1-based page as displayed, after its rotation.
    pub fn displayed_size(&self, page: u32) -> Result<PageSize> {
        let size = self.page_size(page)?;
        Ok(match self.rotation(page)? {
            90 | 270 => size.transposed(),
            _ => size,
        })
    }

    /// Effective MediaBox of a 1-based page.
    pub fn page_box(&self, page: u32) -> Result<PageBox> {
        let page_id = self.page_id(page)?;

        let Some(media_box) = self.inherited(page_id, b"MediaBox") else {
            return Ok(DEFAULT_MEDIA_BOX);
        };

        let values = self
            .resolve(&media_box)
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| arr.iter().filter_map(|v| self.number(v)).collect::<Vec<_>>())
            .unwrap_or_default();

        let &[x0, y0, x1, y1] = values.as_slice() else {
            return Err(self.corrupt(format!("page {page} has a malformed MediaBox")));
        };

        Ok(PageBox {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        })
    }

    /// Effective rotation of a 1-based page, normalised into `0..360`.
    pub fn rotation(&self, page: u32) -> Result<u16> {
        let page_id = self.page_id(page)?;
        let degrees = self
            .inherited(page_id, b"Rotate")
            .and_then(|obj| self.resolve(&obj).and_then(|o| o.as_i64().ok()))
            .unwrap_or(0);
        Ok(degrees.rem_euclid(360) as u16)
    }

    /// Set the rotation of a 1-based page.
    ///
    /// The angle replaces whatever rotation the page had, including one
    /// inherited from the page tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle is not a multiple of 90 in `0..360` or
    /// the page does not exist.
    pub fn set_rotation(&mut self, page: u32, degrees: u16) -> Result<()> {
        if !matches!(degrees, 0 | 90 | 180 | 270) {
            return Err(PdfShapeError::invalid_request(format!(
                "Invalid rotation: {degrees}. Must be 0, 90, 180, or 270"
            )));
        }

        let page_id = self.page_id(page)?;
        self.page_dict_mut(page_id)?
            .set("Rotate", Object::Integer(i64::from(degrees)));

        debug!(page, degrees, "set page rotation");
        Ok(())
    }

    /// Append an empty page of the given size and return its 1-based number.
    pub fn append_blank_page(&mut self, size: PageSize) -> Result<u32> {
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_root,
            "MediaBox" => vec![0.into(), 0.into(), number(size.width), number(size.height)],
            "Resources" => Dictionary::new(),
        });

        self.attach_pages(&[page_id])?;
        Ok(self.page_count())
    }

    /// Serialize the document, consuming the handle.
    ///
    /// Output depends only on the document contents and `options`; no
    /// timestamps or random identifiers are written.
    pub fn serialize(mut self, options: &SaveOptions) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(PdfShapeError::operation_failed(
                "Serialize",
                "document has no pages",
            ));
        }

        if options.optimize {
            self.doc.prune_objects();
            self.doc.renumber_objects();
        }

        if options.compress {
            self.doc.compress();
        }

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PdfShapeError::operation_failed("Serialize", e.to_string()))?;

        debug!(
            name = %self.name,
            pages = self.pages.len(),
            bytes = bytes.len(),
            "serialized document"
        );
        Ok(bytes)
    }

    /// Object id of a 1-based page.
    pub(crate) fn page_id(&self, page: u32) -> Result<ObjectId> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .copied()
            .ok_or_else(|| {
                if page == 0 {
                    RangeError::ZeroPage.into()
                } else {
                    RangeError::OutOfBounds {
                        page,
                        total_pages: self.page_count(),
                    }
                    .into()
                }
            })
    }

    pub(crate) fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.doc
            .get_dictionary(page_id)
            .map_err(|e| self.corrupt(format!("page object {page_id:?}: {e}")))
    }

    pub(crate) fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        let name = self.name.clone();
        self.doc.get_dictionary_mut(page_id).map_err(|e| {
            PdfShapeError::document(
                name,
                DocumentError::corrupt(format!("page object {page_id:?}: {e}")),
            )
        })
    }

    /// Look up an attribute on a page or, failing that, on its ancestors.
    pub(crate) fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;

        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            let parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }

        None
    }

    /// Follow a reference, if `obj` is one.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn number(&self, obj: &Object) -> Option<f32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Link page objects that already live in `doc` into the root page tree.
    pub(crate) fn attach_pages(&mut self, page_ids: &[ObjectId]) -> Result<()> {
        let root = self.pages_root;
        let kids_ref = self
            .doc
            .get_dictionary(root)
            .ok()
            .and_then(|dict| dict.get(b"Kids").ok())
            .and_then(|kids| kids.as_reference().ok());

        let new_kids = page_ids.iter().map(|&id| Object::Reference(id));
        let kids = match kids_ref {
            Some(array_id) => self.doc.get_object_mut(array_id).ok(),
            None => self
                .doc
                .get_dictionary_mut(root)
                .ok()
                .and_then(|dict| dict.get_mut(b"Kids").ok()),
        };

        match kids {
            Some(Object::Array(kids)) => kids.extend(new_kids),
            _ => {
                self.doc
                    .get_dictionary_mut(root)
                    .map_err(|e| PdfShapeError::operation_failed("Append pages", e.to_string()))?
                    .set("Kids", Object::Array(new_kids.collect()));
            }
        }

        for &page_id in page_ids {
            self.page_dict_mut(page_id)?
                .set("Parent", Object::Reference(root));
        }
        self.pages.extend_from_slice(page_ids);

        let count = self.pages.len() as i64;
        self.doc
            .get_dictionary_mut(root)
            .map_err(|e| PdfShapeError::operation_failed("Append pages", e.to_string()))?
            .set("Count", Object::Integer(count));

        Ok(())
    }

    pub(crate) fn corrupt(&self, details: impl Into<String>) -> PdfShapeError {
        PdfShapeError::document(self.name.clone(), DocumentError::corrupt(details))
    }
}

/// Map a lopdf load failure onto the document error taxonomy.
fn classify_load_error(err: &lopdf::Error) -> DocumentError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("encrypt") || lowered.contains("decrypt") || lowered.contains("password")
    {
        DocumentError::Encrypted
    } else {
        DocumentError::corrupt(message)
    }
}

/// PDF number object, integral where possible.
pub(crate) fn number(value: f32) -> Object {
    if value.fract() == 0.0 && value.abs() < 1.0e9 {
        Object::Integer(value as i64)
    } else {
        Object::Real(value)
    }
}
