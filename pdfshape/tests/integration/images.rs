//! Building documents from images end to end.

use pdfshape::PdfShapeError;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::request::{Orientation, PageFormat, PageSizing, SourceFile, TransformRequest};

use crate::common::{info, letter_pdf, png, translucent_png};

fn images(sources: Vec<SourceFile>, sizing: PageSizing) -> pdfshape::Result<pdfshape::ops::TransformOutcome> {
    transform(
        TransformRequest::ImagesToDocument { sizing },
        sources,
        &ExecutionContext::default(),
    )
}

#[test]
fn test_fit_to_image_one_page_per_image() {
    let sources = vec![
        SourceFile::image("wide.png", png(200, 100)),
        SourceFile::image("tall.png", translucent_png(50, 80)),
    ];

    let outcome = images(sources, PageSizing::FitToImage).unwrap();
    let doc = &outcome.result.documents()[0];
    assert_eq!(doc.name, "images.pdf");

    let sizes: Vec<_> = info(&doc.bytes).pages.iter().map(|p| (p.width, p.height)).collect();
    assert_eq!(sizes, [(200.0, 100.0), (50.0, 80.0)]);
}

#[test]
fn test_fixed_size_landscape_pages() {
    let sources = vec![
        SourceFile::image("a.png", png(30, 30)),
        SourceFile::image("b.png", png(300, 10)),
    ];
    let sizing = PageSizing::fixed(PageFormat::A4, Orientation::Landscape);

    let outcome = images(sources, sizing).unwrap();
    let generated = info(&outcome.result.documents()[0].bytes);
    assert_eq!(generated.page_count, 2);
    assert!(generated.uniform_size);
    assert_eq!((generated.pages[0].width, generated.pages[0].height), (842.0, 595.0));
}

#[test]
fn test_bad_image_is_skipped_with_warning() {
    let sources = vec![
        SourceFile::image("one.png", png(10, 10)),
        SourceFile::image("broken.png", b"\x89PNG\r\n\x1a\ntruncated".to_vec()),
        SourceFile::image("three.png", png(20, 10)),
    ];

    let outcome = images(sources, PageSizing::FitToImage).unwrap();
    assert_eq!(info(&outcome.result.documents()[0].bytes).page_count, 2);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].index, 1);
    assert_eq!(outcome.warnings[0].name, "broken.png");
}

#[test]
fn test_no_decodable_image_fails() {
    let sources = vec![
        SourceFile::image("a.png", b"nope".to_vec()),
        SourceFile::image("b.png", Vec::new()),
    ];
    let err = images(sources, PageSizing::FitToImage).unwrap_err();
    assert!(matches!(err, PdfShapeError::OperationFailed { .. }));
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn test_documents_are_not_images() {
    let sources = vec![SourceFile::document("a.pdf", letter_pdf(1))];
    let err = images(sources, PageSizing::FitToImage).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_margin_larger_than_page_is_rejected() {
    let sizing = PageSizing::FixedPageSize {
        format: PageFormat::Custom {
            width: 100.0,
            height: 100.0,
        },
        orientation: Orientation::Portrait,
        margin: 60.0,
    };
    let err = images(vec![SourceFile::image("a.png", png(5, 5))], sizing).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_no_images_is_insufficient_input() {
    let err = images(Vec::new(), PageSizing::FitToImage).unwrap_err();
    assert!(matches!(
        err,
        PdfShapeError::InsufficientInput {
            required: 1,
            provided: 0
        }
    ));
}
