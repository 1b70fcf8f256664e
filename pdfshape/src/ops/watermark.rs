//! Text or image watermark on every page.

use std::sync::Arc;
use tracing::debug;

use super::{ExecutionContext, OutputDocument, open};
use crate::document::{OverlayContent, OverlaySpec, Placement, TextMark};
use crate::error::{PdfShapeError, Result};
use crate::raster::RasterImage;
use crate::request::{SourceFile, WatermarkContent, WatermarkOptions};

/// Gray level of watermark text.
const TEXT_GRAY: f32 = 0.5;

pub(crate) fn run(
    source: SourceFile,
    options: &WatermarkOptions,
    context: &ExecutionContext,
) -> Result<OutputDocument> {
    // Decode before opening so a bad image fails fast
    let spec = OverlaySpec {
        content: overlay_content(&options.content)?,
        opacity: options.opacity,
        placement: Placement::Anchor(options.anchor),
    };

    let mut handle = open(&source)?;
    for page in 1..=handle.page_count() {
        handle.draw_overlay(page, &spec)?;
    }
    debug!(
        pages = handle.page_count(),
        anchor = ?options.anchor,
        opacity = options.opacity,
        "watermarked"
    );

    let name = format!("{}_watermarked.pdf", context.base_name_or(source.stem()));
    context.finish(handle, name)
}

fn overlay_content(content: &WatermarkContent) -> Result<OverlayContent> {
    match content {
        WatermarkContent::Text {
            text,
            font_size,
            rotation,
        } => Ok(OverlayContent::Text(TextMark {
            text: text.clone(),
            font_size: *font_size,
            rotation: *rotation,
            gray: TEXT_GRAY,
        })),
        WatermarkContent::Image { data } => {
            let image = RasterImage::decode(data).map_err(|e| {
                PdfShapeError::invalid_request(format!("Watermark image cannot be used: {e}"))
            })?;
            Ok(OverlayContent::Image(Arc::new(image)))
        }
    }
}
