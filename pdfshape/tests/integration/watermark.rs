//! Watermarking end to end.

use rstest::rstest;

use pdfshape::PdfShapeError;
use pdfshape::document::Anchor;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::request::{SourceFile, TransformRequest, WatermarkContent, WatermarkOptions};

use crate::common::{info, letter_source, page_labels, png, sample_pdf, translucent_png};

fn watermark(source: SourceFile, options: WatermarkOptions) -> pdfshape::Result<(String, Vec<u8>)> {
    let outcome = transform(
        TransformRequest::Watermark(options),
        vec![source],
        &ExecutionContext::default(),
    )?;
    let doc = outcome.result.into_documents().remove(0);
    Ok((doc.name, doc.bytes))
}

fn text(text: &str) -> WatermarkContent {
    WatermarkContent::Text {
        text: text.into(),
        font_size: 48.0,
        rotation: 30.0,
    }
}

#[test]
fn test_text_watermark_keeps_pages() {
    let (name, bytes) = watermark(letter_source("memo.pdf", 3), WatermarkOptions::default()).unwrap();

    assert_eq!(name, "memo_watermarked.pdf");
    let watermarked = info(&bytes);
    assert_eq!(watermarked.page_count, 3);
    assert!(watermarked.uniform_size);
    assert_eq!(page_labels(&bytes), ["Page 1", "Page 2", "Page 3"]);
}

#[rstest]
fn test_every_anchor_is_accepted(
    #[values(Anchor::Center, Anchor::TopLeft, Anchor::TopRight, Anchor::BottomLeft, Anchor::BottomRight)]
    anchor: Anchor,
) {
    let options = WatermarkOptions {
        content: text("DRAFT"),
        opacity: 50,
        anchor,
    };
    let (_, bytes) = watermark(letter_source("a.pdf", 1), options).unwrap();
    assert_eq!(info(&bytes).page_count, 1);
}

#[rstest]
#[case(png(60, 20))]
#[case(translucent_png(32, 32))]
fn test_image_watermark_on_mixed_page_sizes(#[case] image: Vec<u8>) {
    let source = SourceFile::document("mixed.pdf", sample_pdf(&[(612, 792), (842, 595)]));
    let options = WatermarkOptions {
        content: WatermarkContent::Image { data: image },
        opacity: 40,
        anchor: Anchor::BottomRight,
    };

    let (_, bytes) = watermark(source, options).unwrap();
    let sizes: Vec<_> = info(&bytes).pages.iter().map(|p| (p.width, p.height)).collect();
    assert_eq!(sizes, [(612.0, 792.0), (842.0, 595.0)]);
}

#[test]
fn test_opacity_above_full_is_rejected() {
    let options = WatermarkOptions {
        opacity: 101,
        ..WatermarkOptions::default()
    };
    let err = watermark(letter_source("a.pdf", 1), options).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_blank_text_is_rejected() {
    let options = WatermarkOptions {
        content: text("   "),
        ..WatermarkOptions::default()
    };
    let err = watermark(letter_source("a.pdf", 1), options).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_undecodable_image_is_rejected() {
    let options = WatermarkOptions {
        content: WatermarkContent::Image {
            data: b"GIF89a not really".to_vec(),
        },
        ..WatermarkOptions::default()
    };
    let err = watermark(letter_source("a.pdf", 1), options).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_watermark_request_defaults_from_json() {
    let request: TransformRequest = serde_json::from_str(
        r#"{"operation": "watermark", "content": {"type": "text", "text": "DRAFT"}}"#,
    )
    .unwrap();

    let TransformRequest::Watermark(options) = request else {
        panic!("expected a watermark request");
    };
    assert_eq!(options.opacity, 30);
    assert_eq!(options.anchor, Anchor::Center);
    assert_eq!(options.content, text_with_defaults("DRAFT"));
}

fn text_with_defaults(value: &str) -> WatermarkContent {
    WatermarkContent::Text {
        text: value.into(),
        font_size: 40.0,
        rotation: 45.0,
    }
}
