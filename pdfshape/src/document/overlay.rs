//! Composing text and images on top of existing pages.
//!
//! An overlay never edits the page's own content streams. The original
//! streams are wrapped in a `q`/`Q` pair so any graphics state they leave
//! behind is discarded, and a new stream is appended after them. Resources
//! the overlay needs are added to a page-local copy of the resource
//! dictionary under names that cannot collide with existing ones.
//!
//! Placements are in the page's displayed orientation. On a page with
//! `/Rotate`, the overlay is counter-rotated so it reads upright.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::document::{DocumentHandle, PageBox, number};
use crate::error::{PdfShapeError, Result};
use crate::raster::RasterImage;

/// Named overlay positions, resolved as fractions of each page's own box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Middle of the page.
    #[default]
    Center,
    /// Upper-left quadrant.
    TopLeft,
    /// Upper-right quadrant.
    TopRight,
    /// Lower-left quadrant.
    BottomLeft,
    /// Lower-right quadrant.
    BottomRight,
}

impl Anchor {
    /// Every anchor, in declaration order.
    pub const ALL: [Anchor; 5] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];

    /// Position as fractions of page width and height, from the lower-left.
    pub fn fractions(self) -> (f32, f32) {
        match self {
            Anchor::Center => (0.5, 0.5),
            Anchor::TopLeft => (0.25, 0.75),
            Anchor::TopRight => (0.75, 0.75),
            Anchor::BottomLeft => (0.25, 0.25),
            Anchor::BottomRight => (0.75, 0.25),
        }
    }

    /// Absolute point on a page.
    pub fn resolve(self, page: &PageBox) -> (f32, f32) {
        let (fx, fy) = self.fractions();
        (page.x + page.width * fx, page.y + page.height * fy)
    }

    /// Share of the page an image anchored here may occupy, per axis.
    pub fn image_extent(self) -> f32 {
        match self {
            Anchor::Center => 0.7,
            _ => 0.3,
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "center" | "centre" => Ok(Anchor::Center),
            "top-left" => Ok(Anchor::TopLeft),
            "top-right" => Ok(Anchor::TopRight),
            "bottom-left" => Ok(Anchor::BottomLeft),
            "bottom-right" => Ok(Anchor::BottomRight),
            _ => Err(format!(
                "Invalid anchor: {s}. Use center, top-left, top-right, bottom-left or bottom-right"
            )),
        }
    }
}

/// A line of Helvetica text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMark {
    /// The text; characters outside Latin-1 are drawn as `?`.
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    /// Counter-clockwise rotation about the placement point, in degrees.
    pub rotation: f32,
    /// Fill gray level, 0 (black) to 1 (white).
    pub gray: f32,
}

/// What an overlay draws.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    /// Text centered on the placement point.
    Text(TextMark),
    /// A raster image scaled to fit its placement.
    Image(Arc<RasterImage>),
}

/// Where an overlay goes. Coordinates are relative to the lower-left
/// corner of the page as displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// A named anchor. Images are fitted into a box sized by
    /// [`Anchor::image_extent`].
    Anchor(Anchor),
    /// An explicit center point. Images keep 1 px = 1 pt.
    Center { x: f32, y: f32 },
    /// A rectangle. Images are fitted into it and centered; text is
    /// centered on it.
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// A complete overlay request for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// Text or image.
    pub content: OverlayContent,
    /// Opacity in percent, `0..=100`.
    pub opacity: u8,
    /// Position on the page.
    pub placement: Placement,
}

/// Resource categories an overlay may add entries to.
const RESOURCE_CATEGORIES: [&[u8]; 3] = [b"Font", b"ExtGState", b"XObject"];

/// Objects shared by every overlay drawn on one document.
#[derive(Debug, Default)]
pub(crate) struct OverlayCache {
    font: Option<ObjectId>,
    states: BTreeMap<u8, ObjectId>,
    images: HashMap<u64, ObjectId>,
    brackets: Option<(ObjectId, ObjectId)>,
}

/// Resource entries one overlay needs.
struct OverlayResources {
    font: Option<String>,
    state: Option<String>,
    image: Option<String>,
}

impl DocumentHandle {
    /// Draw text or an image on top of a 1-based page.
    ///
    /// Existing content streams are left byte-for-byte intact.
    pub fn draw_overlay(&mut self, page: u32, spec: &OverlaySpec) -> Result<()> {
        if spec.opacity > 100 {
            return Err(PdfShapeError::invalid_request(format!(
                "Invalid opacity: {}. Must be between 0 and 100",
                spec.opacity
            )));
        }

        let page_id = self.page_id(page)?;
        let page_box = self.page_box(page)?;
        let rotation = self.rotation(page)?;

        let font = match &spec.content {
            OverlayContent::Text(_) => Some(self.overlay_font()),
            OverlayContent::Image(_) => None,
        };
        let state = (spec.opacity < 100).then(|| self.overlay_state(spec.opacity));
        let image = match &spec.content {
            OverlayContent::Image(raster) => Some(self.overlay_image(raster)?),
            OverlayContent::Text(_) => None,
        };

        let mut resources = self.effective_resources(page_id);
        let names = OverlayResources {
            font: font.map(|id| register(&mut resources, b"Font", "PsF", id)),
            state: state.map(|id| register(&mut resources, b"ExtGState", "PsGS", id)),
            image: image.map(|id| register(&mut resources, b"XObject", "PsIm", id)),
        };

        let operations = match upright_matrix(&page_box, rotation) {
            Some(matrix) => {
                let size = match rotation {
                    180 => page_box.size(),
                    _ => page_box.size().transposed(),
                };
                let upright = PageBox {
                    x: 0.0,
                    y: 0.0,
                    width: size.width,
                    height: size.height,
                };
                let mut ops = overlay_operations(spec, &upright, &names);
                ops.insert(1, Operation::new("cm", matrix.map(number).to_vec()));
                ops
            }
            None => overlay_operations(spec, &page_box, &names),
        };
        let encoded = Content { operations }
            .encode()
            .map_err(|e| PdfShapeError::operation_failed("Overlay", e.to_string()))?;
        let overlay_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let contents = self.bracketed_contents(page_id, overlay_id);
        let dict = self.page_dict_mut(page_id)?;
        dict.set("Resources", resources);
        dict.set("Contents", contents);

        debug!(page, rotation, opacity = spec.opacity, "drew overlay");
        Ok(())
    }

    fn overlay_font(&mut self) -> ObjectId {
        if let Some(id) = self.overlay.font {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.overlay.font = Some(id);
        id
    }

    fn overlay_state(&mut self, opacity: u8) -> ObjectId {
        if let Some(&id) = self.overlay.states.get(&opacity) {
            return id;
        }
        let alpha = f32::from(opacity) / 100.0;
        let id = self.doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(alpha),
            "CA" => Object::Real(alpha),
        });
        self.overlay.states.insert(opacity, id);
        id
    }

    fn overlay_image(&mut self, raster: &RasterImage) -> Result<ObjectId> {
        let key = raster.fingerprint();
        if let Some(&id) = self.overlay.images.get(&key) {
            return Ok(id);
        }

        if let Some(jpeg) = raster.jpeg() {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(raster.width()),
                "Height" => i64::from(raster.height()),
                "ColorSpace" => jpeg.color_space(),
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            };
            if jpeg.inverted() {
                let decode = [1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer);
                dict.set("Decode", decode.to_vec());
            }
            let stream = Stream::new(dict, jpeg.bytes().to_vec()).with_compression(false);
            let id = self.doc.add_object(stream);
            self.overlay.images.insert(key, id);
            return Ok(id);
        }

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(raster.width()),
            "Height" => i64::from(raster.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if let Some(alpha) = raster.alpha() {
            let mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(raster.width()),
                    "Height" => i64::from(raster.height()),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(alpha)?,
            )
            .with_compression(false);
            let mask_id = self.doc.add_object(mask);
            dict.set("SMask", mask_id);
        }

        let stream = Stream::new(dict, deflate(raster.rgb())?).with_compression(false);
        let id = self.doc.add_object(stream);
        self.overlay.images.insert(key, id);
        Ok(id)
    }

    /// A direct copy of the page's effective resources, with sub-dictionaries
    /// resolved so they can be extended in place.
    fn effective_resources(&self, page_id: ObjectId) -> Dictionary {
        let Some(resources) = self.inherited(page_id, b"Resources") else {
            return Dictionary::new();
        };
        let Some(Object::Dictionary(dict)) = self.resolve(&resources) else {
            return Dictionary::new();
        };

        let mut copy = dict.clone();
        for key in RESOURCE_CATEGORIES {
            if let Ok(Object::Reference(id)) = dict.get(key)
                && let Ok(Object::Dictionary(sub)) = self.doc.get_object(*id)
            {
                copy.set(key.to_vec(), sub.clone());
            }
        }
        copy
    }

    /// New Contents array: the original streams inside `q`/`Q`, then the overlay.
    fn bracketed_contents(&mut self, page_id: ObjectId, overlay_id: ObjectId) -> Object {
        let current = self
            .page_dict(page_id)
            .ok()
            .and_then(|dict| dict.get(b"Contents").ok());
        let existing: Vec<Object> = match current {
            Some(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Some(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        // Blank page: nothing to protect
        if existing.is_empty() {
            return Object::Array(vec![Object::Reference(overlay_id)]);
        }

        let (push, pop) = self.brackets();

        // Already bracketed by an earlier overlay
        if matches!(existing.first(), Some(Object::Reference(id)) if *id == push) {
            let mut contents = existing;
            contents.push(Object::Reference(overlay_id));
            return Object::Array(contents);
        }

        let mut contents = Vec::with_capacity(existing.len() + 3);
        contents.push(Object::Reference(push));
        contents.extend(existing);
        contents.push(Object::Reference(pop));
        contents.push(Object::Reference(overlay_id));
        Object::Array(contents)
    }

    fn brackets(&mut self) -> (ObjectId, ObjectId) {
        if let Some(ids) = self.overlay.brackets {
            return ids;
        }
        let push = self
            .doc
            .add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let pop = self
            .doc
            .add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        self.overlay.brackets = Some((push, pop));
        (push, pop)
    }
}

/// Matrix from displayed coordinates to default user space for a rotated
/// page. `None` when the page is shown as drawn.
fn upright_matrix(page: &PageBox, rotation: u16) -> Option<[f32; 6]> {
    let (x, y, w, h) = (page.x, page.y, page.width, page.height);
    match rotation {
        90 => Some([0.0, 1.0, -1.0, 0.0, x + w, y]),
        180 => Some([-1.0, 0.0, 0.0, -1.0, x + w, y + h]),
        270 => Some([0.0, -1.0, 1.0, 0.0, x, y + h]),
        _ => None,
    }
}

/// Add `id` under `category`, reusing an entry that already points at it.
fn register(resources: &mut Dictionary, category: &[u8], prefix: &str, id: ObjectId) -> String {
    let mut entries = match resources.get(category) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let existing = entries
        .iter()
        .find(|(_, value)| matches!(value, Object::Reference(r) if *r == id))
        .map(|(key, _)| String::from_utf8_lossy(key).into_owned());

    let name = existing.unwrap_or_else(|| {
        let mut n = 0u32;
        loop {
            let candidate = if n == 0 {
                prefix.to_string()
            } else {
                format!("{prefix}{n}")
            };
            if !entries.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        }
    });

    entries.set(name.clone(), Object::Reference(id));
    resources.set(category.to_vec(), entries);
    name
}

fn overlay_operations(
    spec: &OverlaySpec,
    page: &PageBox,
    names: &OverlayResources,
) -> Vec<Operation> {
    let mut ops = vec![Operation::new("q", vec![])];
    if let Some(state) = &names.state {
        ops.push(Operation::new("gs", vec![Object::Name(state.as_bytes().to_vec())]));
    }

    match &spec.content {
        OverlayContent::Text(mark) => {
            let (x, y) = match spec.placement {
                Placement::Anchor(anchor) => anchor.resolve(page),
                Placement::Center { x, y } => (page.x + x, page.y + y),
                Placement::Frame {
                    x,
                    y,
                    width,
                    height,
                } => (page.x + x + width / 2.0, page.y + y + height / 2.0),
            };
            let font = names.font.as_deref().unwrap_or("PsF");
            ops.extend(text_operations(mark, font, x, y));
        }
        OverlayContent::Image(raster) => {
            let (x, y, width, height) = image_rect(raster, spec.placement, page);
            let image = names.image.as_deref().unwrap_or("PsIm");
            ops.push(Operation::new(
                "cm",
                vec![
                    number(width),
                    0.into(),
                    0.into(),
                    number(height),
                    number(x),
                    number(y),
                ],
            ));
            ops.push(Operation::new("Do", vec![Object::Name(image.as_bytes().to_vec())]));
        }
    }

    ops.push(Operation::new("Q", vec![]));
    ops
}

fn text_operations(mark: &TextMark, font: &str, x: f32, y: f32) -> Vec<Operation> {
    let (sin, cos) = mark.rotation.to_radians().sin_cos();
    let width = text_width(&mark.text, mark.font_size);

    vec![
        Operation::new(
            "cm",
            vec![
                Object::Real(cos),
                Object::Real(sin),
                Object::Real(-sin),
                Object::Real(cos),
                number(x),
                number(y),
            ],
        ),
        Operation::new("g", vec![Object::Real(mark.gray.clamp(0.0, 1.0))]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), number(mark.font_size)],
        ),
        Operation::new(
            "Td",
            vec![
                Object::Real(-width / 2.0),
                Object::Real(-0.35 * mark.font_size),
            ],
        ),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&mark.text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Lower-left corner and drawn size of an image overlay, in page space.
fn image_rect(raster: &RasterImage, placement: Placement, page: &PageBox) -> (f32, f32, f32, f32) {
    let (iw, ih) = (raster.width() as f32, raster.height() as f32);

    let (cx, cy, scale) = match placement {
        Placement::Anchor(anchor) => {
            let extent = anchor.image_extent();
            let (cx, cy) = anchor.resolve(page);
            let scale = (page.width * extent / iw).min(page.height * extent / ih);
            (cx, cy, scale)
        }
        Placement::Center { x, y } => (page.x + x, page.y + y, 1.0),
        Placement::Frame {
            x,
            y,
            width,
            height,
        } => (
            page.x + x + width / 2.0,
            page.y + y + height / 2.0,
            (width / iw).min(height / ih),
        ),
    };

    let (w, h) = (iw * scale, ih * scale);
    (cx - w / 2.0, cy - h / 2.0, w, h)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| PdfShapeError::operation_failed("Overlay", format!("deflate: {e}")))
}

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width of `text` set in Helvetica at `font_size`, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            ' '..='~' => u32::from(HELVETICA_WIDTHS[c as usize - 32]),
            _ => 556,
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Encode for WinAnsiEncoding; anything outside Latin-1 becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (32..=126 | 160..=255) => code as u8,
            _ => b'?',
        })
        .collect()
}
