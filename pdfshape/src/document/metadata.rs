//! Document information dictionary.
//!
//! Only the descriptive fields are written. Creation and modification
//! dates are left out so that the same input always yields the same bytes.

use lopdf::{Dictionary, Object, ObjectId, StringFormat};

use crate::config::Metadata;
use crate::document::DocumentHandle;
use crate::error::{PdfShapeError, Result};

/// Write `metadata` into the document's Info dictionary.
///
/// Unset fields keep whatever value the document already had. `producer`
/// is recorded as both Creator and Producer. Empty metadata is a no-op.
///
/// # Examples
///
/// ```no_run
/// # use pdfshape::document::{DocumentHandle, metadata};
/// # use pdfshape::config::Metadata;
/// # fn example(handle: &mut DocumentHandle) -> pdfshape::Result<()> {
/// let info = Metadata::new(Some("Quarterly report".to_string()), None, None, None);
/// metadata::apply(handle, &info, "pdfshape")?;
/// # Ok(())
/// # }
/// ```
pub fn apply(handle: &mut DocumentHandle, metadata: &Metadata, producer: &str) -> Result<()> {
    if metadata.is_empty() {
        return Ok(());
    }

    let info_id = info_id(handle);
    let doc = &mut handle.doc;
    if !matches!(doc.get_object(info_id), Ok(Object::Dictionary(_))) {
        doc.objects
            .insert(info_id, Object::Dictionary(Dictionary::new()));
    }
    let info = doc
        .get_dictionary_mut(info_id)
        .map_err(|e| PdfShapeError::operation_failed("Set metadata", e.to_string()))?;

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }
    info.set("Creator", text_string(producer));
    info.set("Producer", text_string(producer));

    Ok(())
}

/// Read the descriptive fields back out of the Info dictionary.
pub fn read(handle: &DocumentHandle) -> Metadata {
    let info = handle
        .doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| handle.resolve(obj))
        .and_then(|obj| obj.as_dict().ok());

    let Some(info) = info else {
        return Metadata::default();
    };

    let field = |key: &[u8]| info.get(key).ok().and_then(decode_text_string);
    Metadata::new(
        field(b"Title"),
        field(b"Author"),
        field(b"Subject"),
        field(b"Keywords"),
    )
}

fn info_id(handle: &mut DocumentHandle) -> ObjectId {
    if let Ok(id) = handle.doc.trailer.get(b"Info").and_then(Object::as_reference) {
        return id;
    }
    let id = handle.doc.new_object_id();
    handle.doc.trailer.set("Info", Object::Reference(id));
    id
}

/// PDF text string: plain bytes for ASCII, UTF-16BE with a byte order
/// mark otherwise.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };
    match bytes.as_slice() {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        // PDFDocEncoding agrees with Latin-1 on the printable range
        other => Some(other.iter().map(|&b| char::from(b)).collect()),
    }
}
