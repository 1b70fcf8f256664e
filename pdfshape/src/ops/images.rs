//! Build a document with one page per image.
//!
//! This is the only operation that tolerates bad inputs: an image that
//! cannot be decoded is skipped with an [`ImageDecodeWarning`] and the rest
//! of the batch still produces pages.

use std::sync::Arc;
use tracing::{debug, warn};

use super::{ExecutionContext, TransformOutcome, TransformResult};
use crate::document::{DocumentHandle, OverlayContent, OverlaySpec, PageSize, Placement};
use crate::error::{ImageDecodeWarning, PdfShapeError, Result};
use crate::raster::RasterImage;
use crate::request::{PageSizing, SourceFile, oriented_size};

pub(crate) fn run(
    sources: Vec<SourceFile>,
    sizing: &PageSizing,
    context: &ExecutionContext,
) -> Result<TransformOutcome> {
    let base = context.base_name_or("images");
    let mut target = DocumentHandle::new_document().with_name(format!("{base}.pdf"));
    let mut warnings = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        let image = match RasterImage::decode(&source.bytes) {
            Ok(image) => image.flatten(),
            Err(e) => {
                let warning = ImageDecodeWarning {
                    index,
                    name: source.name.clone(),
                    reason: e.to_string(),
                };
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }
        };

        let (size, frame) = layout(&image, sizing);
        let page = target.append_blank_page(size)?;
        target.draw_overlay(
            page,
            &OverlaySpec {
                content: OverlayContent::Image(Arc::new(image)),
                opacity: 100,
                placement: frame,
            },
        )?;
        debug!(index, name = %source.name, page, "placed image");
    }

    if target.page_count() == 0 {
        return Err(PdfShapeError::operation_failed(
            "ImagesToDocument",
            format!("none of the {} image(s) could be decoded", sources.len()),
        ));
    }

    let output = context.finish(target, format!("{base}.pdf"))?;
    Ok(TransformOutcome {
        result: TransformResult::Single(output),
        warnings,
    })
}

/// Page size and the frame the image is fitted into.
fn layout(image: &RasterImage, sizing: &PageSizing) -> (PageSize, Placement) {
    match *sizing {
        PageSizing::FitToImage => {
            let size = PageSize::new(image.width() as f32, image.height() as f32);
            (
                size,
                Placement::Frame {
                    x: 0.0,
                    y: 0.0,
                    width: size.width,
                    height: size.height,
                },
            )
        }
        PageSizing::FixedPageSize {
            format,
            orientation,
            margin,
        } => {
            let size = oriented_size(format, orientation);
            (
                size,
                Placement::Frame {
                    x: margin,
                    y: margin,
                    width: size.width - 2.0 * margin,
                    height: size.height - 2.0 * margin,
                },
            )
        }
    }
}
