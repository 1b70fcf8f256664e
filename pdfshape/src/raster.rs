//! Raster image decoding for overlays and image-to-page conversion.
//!
//! Images are decoded once into 8-bit RGB samples plus an optional alpha
//! plane, which is the shape a PDF image XObject (with `/SMask`) needs.
//! JPEG inputs also keep their encoded stream, which PDF readers can
//! decode directly through `/DCTDecode`.

use image::ImageFormat;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Why a raster input could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes do not start with a known image signature.
    #[error("unrecognised image format")]
    UnknownFormat,

    /// Recognised, but not an encoding this crate embeds.
    #[error("unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// The encoded data is damaged or truncated.
    #[error("malformed image data: {details}")]
    Malformed { details: String },

    /// The image has no pixels.
    #[error("image has zero width or height")]
    Empty,
}

/// An encoded JPEG stream that can be embedded without re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JpegStream {
    bytes: Arc<[u8]>,
    components: u8,
    adobe: bool,
}

impl JpegStream {
    /// Scan the frame header. `None` for streams a PDF reader cannot take
    /// as-is (not 8-bit, or an unusual component count).
    pub fn scan(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
            return None;
        }

        let mut adobe = false;
        let mut pos = 2;
        while pos + 4 <= bytes.len() {
            if bytes[pos] != 0xFF {
                return None;
            }
            let marker = bytes[pos + 1];
            pos += 2;

            match marker {
                // Fill byte
                0xFF => pos -= 1,
                0x01 | 0xD0..=0xD7 => {}
                0xD9 | 0xDA => return None,
                0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                    // length(2) precision(1) height(2) width(2) components(1)
                    let header = bytes.get(pos..pos + 8)?;
                    let components = header[7];
                    if header[2] != 8 || !matches!(components, 1 | 3 | 4) {
                        return None;
                    }
                    return Some(Self {
                        bytes: Arc::from(bytes),
                        components,
                        adobe,
                    });
                }
                _ => {
                    let length = usize::from(u16::from_be_bytes([bytes[pos], bytes[pos + 1]]));
                    if marker == 0xEE && bytes[pos + 2..].starts_with(b"Adobe") {
                        adobe = true;
                    }
                    pos += length;
                }
            }
        }
        None
    }

    /// The encoded bytes, unchanged.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// PDF colour space matching the component count.
    pub fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }

    /// Adobe CMYK JPEGs store inverted samples and need a `/Decode` array.
    pub fn inverted(&self) -> bool {
        self.components == 4 && self.adobe
    }
}

/// A decoded image: RGB samples, row-major, with an optional alpha plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
    jpeg: Option<JpegStream>,
}

impl RasterImage {
    /// Decode PNG or JPEG bytes.
    ///
    /// The alpha plane is kept only if some pixel is not fully opaque.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let format = image::guess_format(bytes).map_err(|_| DecodeError::UnknownFormat)?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(DecodeError::UnsupportedFormat {
                format: format!("{format:?}"),
            });
        }

        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            DecodeError::Malformed {
                details: e.to_string(),
            }
        })?;

        let (width, height) = (decoded.width(), decoded.height());
        debug!(?format, width, height, "decoded image");
        let mut raster = Self::from_rgba(width, height, decoded.to_rgba8().into_raw())?;
        if format == ImageFormat::Jpeg {
            raster.jpeg = JpegStream::scan(bytes);
        }
        Ok(raster)
    }

    /// Build an image from interleaved RGBA samples.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty);
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DecodeError::Malformed {
                details: format!("expected {expected} RGBA bytes, got {}", rgba.len()),
            });
        }

        let pixels = rgba.len() / 4;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for px in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }

        let opaque = alpha.iter().all(|&a| a == u8::MAX);
        Ok(Self {
            width,
            height,
            rgb,
            alpha: (!opaque).then_some(alpha),
            jpeg: None,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether any pixel is transparent.
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Composite onto a white background, dropping the alpha plane.
    pub fn flatten(&self) -> Self {
        let Some(alpha) = &self.alpha else {
            return self.clone();
        };

        let rgb = self
            .rgb
            .chunks_exact(3)
            .zip(alpha)
            .flat_map(|(px, &a)| {
                let a = u16::from(a);
                px.iter()
                    .map(move |&c| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8)
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            rgb,
            alpha: None,
            jpeg: None,
        }
    }

    pub(crate) fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub(crate) fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// The original JPEG stream, when the image came from one.
    pub fn jpeg(&self) -> Option<&JpegStream> {
        self.jpeg.as_ref()
    }

    /// Content hash, used to embed identical images once per document.
    pub(crate) fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
