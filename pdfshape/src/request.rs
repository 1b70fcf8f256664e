//! Transform requests and their validation.
//!
//! A [`TransformRequest`] describes one operation and its parameters. It is
//! plain data (and serde-serializable, so it can arrive as JSON). Before
//! anything is executed it must pass [`TransformRequest::validate`], which
//! checks the parameters and the shape of the inputs and returns a
//! [`ValidatedRequest`]. Only a validated request can be executed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::document::{Anchor, PageSize};
use crate::error::{PdfShapeError, RangeError, Result};
use crate::range::PageRanges;

/// What kind of content an input carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A paginated document (PDF).
    Document,
    /// A raster image (PNG or JPEG).
    Image,
}

impl ContentKind {
    /// Guess the kind from a file extension. Anything that is not a known
    /// image extension is treated as a document.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png" | "jpg" | "jpeg") => Self::Image,
            _ => Self::Document,
        }
    }
}

/// One input: raw bytes plus the content kind the caller declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display name, usually the file name.
    pub name: String,
    /// Declared content kind.
    pub kind: ContentKind,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// A document input.
    pub fn document(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: ContentKind::Document,
            bytes,
        }
    }

    /// An image input.
    pub fn image(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: ContentKind::Image,
            bytes,
        }
    }

    /// File name without directory or extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

/// How a document is split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// One output per range, in the order written.
    Ranges(PageRanges),
    /// One output per page.
    AllIndividually,
    /// A single output holding the union of the ranges.
    Extract(PageRanges),
}

/// Absolute page rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RotationAngle {
    /// Upright.
    #[default]
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Quarter turn counter-clockwise.
    Deg270,
}

impl RotationAngle {
    /// Angle in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for RotationAngle {
    type Error = String;

    fn try_from(degrees: u16) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(format!(
                "Invalid rotation: {degrees}. Must be 0, 90, 180, or 270"
            )),
        }
    }
}

impl From<RotationAngle> for u16 {
    fn from(angle: RotationAngle) -> Self {
        angle.degrees()
    }
}

/// Which pages a rotation applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateScope {
    /// Every page.
    #[default]
    AllPages,
    /// The union of the given ranges.
    Pages(PageRanges),
}

/// What a watermark draws.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkContent {
    /// A line of text.
    Text {
        /// The text.
        text: String,
        /// Font size in points.
        #[serde(default = "default_watermark_font_size")]
        font_size: f32,
        /// Counter-clockwise rotation in degrees.
        #[serde(default = "default_watermark_rotation")]
        rotation: f32,
    },
    /// A PNG or JPEG image.
    Image {
        /// Encoded image bytes.
        data: Vec<u8>,
    },
}

impl fmt::Debug for WatermarkContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text {
                text,
                font_size,
                rotation,
            } => f
                .debug_struct("Text")
                .field("text", text)
                .field("font_size", font_size)
                .field("rotation", rotation)
                .finish(),
            Self::Image { data } => f
                .debug_struct("Image")
                .field("bytes", &data.len())
                .finish(),
        }
    }
}

fn default_watermark_font_size() -> f32 {
    40.0
}

fn default_watermark_rotation() -> f32 {
    45.0
}

fn default_watermark_opacity() -> u8 {
    30
}

/// Watermark parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkOptions {
    /// Text or image.
    pub content: WatermarkContent,
    /// Opacity in percent.
    #[serde(default = "default_watermark_opacity")]
    pub opacity: u8,
    /// Position on each page.
    #[serde(default)]
    pub anchor: Anchor,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            content: WatermarkContent::Text {
                text: String::from("CONFIDENTIAL"),
                font_size: default_watermark_font_size(),
                rotation: default_watermark_rotation(),
            },
            opacity: default_watermark_opacity(),
            anchor: Anchor::Center,
        }
    }
}

/// Standard page formats for image pages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFormat {
    /// ISO A4, 595 x 842 pt.
    #[default]
    A4,
    /// US Letter, 612 x 792 pt.
    Letter,
    /// US Legal, 612 x 1008 pt.
    Legal,
    /// Any size, in points.
    Custom {
        /// Width in points.
        width: f32,
        /// Height in points.
        height: f32,
    },
}

impl PageFormat {
    /// Portrait size in points.
    pub fn size(self) -> PageSize {
        match self {
            Self::A4 => PageSize::new(595.0, 842.0),
            Self::Letter => PageSize::new(612.0, 792.0),
            Self::Legal => PageSize::new(612.0, 1008.0),
            Self::Custom { width, height } => PageSize::new(width, height),
        }
    }
}

impl std::str::FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            other => {
                let (w, h) = other.split_once('x').ok_or_else(|| {
                    format!("Invalid page format: {s}. Use a4, letter, legal or WIDTHxHEIGHT")
                })?;
                let parse = |v: &str| {
                    v.trim()
                        .parse::<f32>()
                        .map_err(|_| format!("Invalid page dimension: {v}"))
                };
                Ok(Self::Custom {
                    width: parse(w)?,
                    height: parse(h)?,
                })
            }
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

fn default_image_margin() -> f32 {
    20.0
}

/// Page sizing policy for images-to-document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSizing {
    /// Each page is exactly the image's pixel size (1 px = 1 pt).
    #[default]
    FitToImage,
    /// Every page has the same size; images are scaled to fit the margins.
    FixedPageSize {
        /// Page format.
        #[serde(default)]
        format: PageFormat,
        /// Orientation.
        #[serde(default)]
        orientation: Orientation,
        /// Margin on every side, in points.
        #[serde(default = "default_image_margin")]
        margin: f32,
    },
}

impl PageSizing {
    /// Fixed sizing with the default margin.
    pub fn fixed(format: PageFormat, orientation: Orientation) -> Self {
        Self::FixedPageSize {
            format,
            orientation,
            margin: default_image_margin(),
        }
    }
}

/// Where page numbers go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberPosition {
    /// Centered in the bottom margin.
    #[default]
    BottomCenter,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Centered in the top margin.
    TopCenter,
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
}

impl std::str::FromStr for NumberPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "bottom-center" => Ok(Self::BottomCenter),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            "top-center" => Ok(Self::TopCenter),
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            _ => Err(format!("Invalid page number position: {s}")),
        }
    }
}

/// How page numbers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberStyle {
    /// `7`
    #[default]
    Plain,
    /// `Page 7`
    PageN,
    /// `7 of 12`
    NOfTotal,
    /// `vii`
    RomanLower,
    /// `VII`
    RomanUpper,
}

impl std::str::FromStr for NumberStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "plain" | "1" => Ok(Self::Plain),
            "page-n" | "page" => Ok(Self::PageN),
            "n-of-total" | "of" => Ok(Self::NOfTotal),
            "roman-lower" | "i" => Ok(Self::RomanLower),
            "roman-upper" | "roman" => Ok(Self::RomanUpper),
            _ => Err(format!(
                "Invalid number style: {s}. Use plain, page-n, n-of-total, roman-lower or roman-upper"
            )),
        }
    }
}

impl NumberStyle {
    /// Largest number the style can write. Roman numerals stop at 3999.
    pub fn max_number(self) -> u32 {
        match self {
            Self::RomanLower | Self::RomanUpper => 3999,
            _ => u32::MAX,
        }
    }
}

/// Page numbering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumberOptions {
    /// Where numbers go.
    pub position: NumberPosition,
    /// How numbers are written.
    pub style: NumberStyle,
    /// Number printed on the first numbered page.
    pub start_at: u32,
    /// Font size in points.
    pub font_size: f32,
    /// Distance from the page edge, in millimetres.
    pub margin_mm: f32,
    /// Leave the first page unnumbered.
    pub skip_first: bool,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self {
            position: NumberPosition::BottomCenter,
            style: NumberStyle::Plain,
            start_at: 1,
            font_size: 12.0,
            margin_mm: 15.0,
            skip_first: false,
        }
    }
}

/// One operation of the engine and its parameters.
///
/// # Examples
///
/// ```
/// use pdfshape::request::{SplitMode, TransformRequest};
///
/// let request: TransformRequest = serde_json::from_str(
///     r#"{"operation": "split", "mode": {"ranges": "1-3,5"}}"#,
/// ).unwrap();
/// assert!(matches!(request, TransformRequest::Split { mode: SplitMode::Ranges(_) }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum TransformRequest {
    /// Concatenate two or more documents.
    Merge,
    /// Split one document into several, or extract pages from it.
    Split {
        /// Split mode.
        mode: SplitMode,
    },
    /// Set the rotation of pages.
    Rotate {
        /// Absolute angle.
        angle: RotationAngle,
        /// Pages to rotate.
        #[serde(default)]
        scope: RotateScope,
    },
    /// Overlay text or an image on every page.
    Watermark(WatermarkOptions),
    /// Build a document with one page per image.
    ImagesToDocument {
        /// Page sizing policy.
        #[serde(default)]
        sizing: PageSizing,
    },
    /// Rebuild a document in a new page order.
    Reorder {
        /// 1-based page numbers; repeats are allowed.
        order: Vec<u32>,
    },
    /// Stamp page numbers.
    PageNumbers(PageNumberOptions),
}

impl TransformRequest {
    /// Operation name, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Merge => "Merge",
            Self::Split { .. } => "Split",
            Self::Rotate { .. } => "Rotate",
            Self::Watermark(_) => "Watermark",
            Self::ImagesToDocument { .. } => "ImagesToDocument",
            Self::Reorder { .. } => "Reorder",
            Self::PageNumbers(_) => "PageNumbers",
        }
    }

    /// Content kind every input must have.
    pub fn input_kind(&self) -> ContentKind {
        match self {
            Self::ImagesToDocument { .. } => ContentKind::Image,
            _ => ContentKind::Document,
        }
    }

    /// Check parameters and inputs, producing an executable request.
    ///
    /// Page bounds are not checked here; they need the opened document and
    /// are resolved during execution.
    ///
    /// # Errors
    ///
    /// - [`PdfShapeError::InsufficientInput`] when too few inputs are given
    /// - [`PdfShapeError::InvalidRequest`] for out-of-range parameters, inputs
    ///   of the wrong kind, or extra inputs
    /// - [`PdfShapeError::Range`] for an empty reorder list
    pub fn validate(self, sources: Vec<SourceFile>) -> Result<ValidatedRequest> {
        self.check_parameters()?;
        self.check_inputs(&sources)?;
        Ok(ValidatedRequest {
            request: self,
            sources,
        })
    }

    fn check_parameters(&self) -> Result<()> {
        match self {
            Self::Merge | Self::Split { .. } | Self::Rotate { .. } => Ok(()),
            Self::Watermark(options) => check_watermark(options),
            Self::ImagesToDocument { sizing } => check_sizing(sizing),
            Self::Reorder { order } => {
                if order.is_empty() {
                    return Err(RangeError::EmptySelection.into());
                }
                if order.contains(&0) {
                    return Err(RangeError::ZeroPage.into());
                }
                Ok(())
            }
            Self::PageNumbers(options) => check_numbering(options),
        }
    }

    fn check_inputs(&self, sources: &[SourceFile]) -> Result<()> {
        let expected = self.input_kind();
        if let Some(wrong) = sources.iter().find(|s| s.kind != expected) {
            return Err(PdfShapeError::invalid_request(format!(
                "{} expects {} inputs, but '{}' is {}",
                self.name(),
                kind_label(expected),
                wrong.name,
                kind_label(wrong.kind),
            )));
        }

        match self {
            Self::Merge if sources.len() < 2 => {
                Err(PdfShapeError::insufficient_input(2, sources.len()))
            }
            Self::Merge | Self::ImagesToDocument { .. } if sources.is_empty() => {
                Err(PdfShapeError::insufficient_input(1, 0))
            }
            Self::Merge | Self::ImagesToDocument { .. } => Ok(()),
            _ if sources.is_empty() => Err(PdfShapeError::insufficient_input(1, 0)),
            _ if sources.len() > 1 => Err(PdfShapeError::invalid_request(format!(
                "{} takes exactly one document, {} given",
                self.name(),
                sources.len()
            ))),
            _ => Ok(()),
        }
    }
}

fn kind_label(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Document => "document",
        ContentKind::Image => "image",
    }
}

fn check_watermark(options: &WatermarkOptions) -> Result<()> {
    if options.opacity > 100 {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid opacity: {}. Must be between 0 and 100",
            options.opacity
        )));
    }
    match &options.content {
        WatermarkContent::Text {
            text,
            font_size,
            rotation,
        } => {
            if text.trim().is_empty() {
                return Err(PdfShapeError::invalid_request("Watermark text is empty"));
            }
            if !(font_size.is_finite() && *font_size > 0.0) {
                return Err(PdfShapeError::invalid_request(format!(
                    "Invalid font size: {font_size}"
                )));
            }
            if !rotation.is_finite() {
                return Err(PdfShapeError::invalid_request("Invalid watermark rotation"));
            }
            Ok(())
        }
        WatermarkContent::Image { data } if data.is_empty() => {
            Err(PdfShapeError::invalid_request("Watermark image is empty"))
        }
        WatermarkContent::Image { .. } => Ok(()),
    }
}

fn check_sizing(sizing: &PageSizing) -> Result<()> {
    let PageSizing::FixedPageSize {
        format,
        orientation,
        margin,
    } = sizing
    else {
        return Ok(());
    };

    let size = oriented_size(*format, *orientation);
    if !(size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0)
    {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid page size: {} x {}",
            size.width, size.height
        )));
    }
    if !margin.is_finite() || *margin < 0.0 {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid margin: {margin}"
        )));
    }
    if size.width - 2.0 * margin <= 0.0 || size.height - 2.0 * margin <= 0.0 {
        return Err(PdfShapeError::invalid_request(format!(
            "Margin {margin} leaves no room on a {} x {} page",
            size.width, size.height
        )));
    }
    Ok(())
}

/// Page size for a format in the given orientation.
pub fn oriented_size(format: PageFormat, orientation: Orientation) -> PageSize {
    let size = format.size();
    let is_landscape = size.width > size.height;
    match (orientation, is_landscape) {
        (Orientation::Landscape, false) | (Orientation::Portrait, true) => size.transposed(),
        _ => size,
    }
}

fn check_numbering(options: &PageNumberOptions) -> Result<()> {
    if !(options.font_size.is_finite() && options.font_size > 0.0) {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid font size: {}",
            options.font_size
        )));
    }
    if !options.margin_mm.is_finite() || options.margin_mm < 0.0 {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid margin: {} mm",
            options.margin_mm
        )));
    }
    if options.start_at == 0
        && matches!(options.style, NumberStyle::RomanLower | NumberStyle::RomanUpper)
    {
        return Err(PdfShapeError::invalid_request(
            "Roman numerals start at 1",
        ));
    }
    if options.start_at > options.style.max_number() {
        return Err(PdfShapeError::invalid_request(format!(
            "Invalid start number: {}. This style stops at {}",
            options.start_at,
            options.style.max_number()
        )));
    }
    Ok(())
}

/// A request whose parameters and inputs have been checked.
///
/// Produced only by [`TransformRequest::validate`] and consumed by
/// [`ValidatedRequest::execute`].
#[derive(Debug)]
pub struct ValidatedRequest {
    pub(crate) request: TransformRequest,
    pub(crate) sources: Vec<SourceFile>,
}

impl ValidatedRequest {
    /// The validated request.
    pub fn request(&self) -> &TransformRequest {
        &self.request
    }

    /// The inputs, in the order they were given.
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }
}
