//! Merging documents end to end.

use pdfshape::PdfShapeError;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::request::{SourceFile, TransformRequest};

use crate::common::{info, letter_source, page_labels, sample_pdf};

#[test]
fn test_merge_concatenates_in_input_order() {
    let sources = vec![
        letter_source("intro.pdf", 2),
        letter_source("body.pdf", 3),
        letter_source("outro.pdf", 1),
    ];

    let outcome = transform(TransformRequest::Merge, sources, &ExecutionContext::default()).unwrap();
    let docs = outcome.result.documents();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name, "merged.pdf");
    assert!(outcome.warnings.is_empty());

    assert_eq!(
        page_labels(&docs[0].bytes),
        ["Page 1", "Page 2", "Page 1", "Page 2", "Page 3", "Page 1"]
    );
}

#[test]
fn test_merge_keeps_each_page_size() {
    let sources = vec![
        SourceFile::document("letter.pdf", sample_pdf(&[(612, 792)])),
        SourceFile::document("mixed.pdf", sample_pdf(&[(595, 842), (300, 200)])),
    ];

    let outcome = transform(TransformRequest::Merge, sources, &ExecutionContext::default()).unwrap();
    let merged = info(&outcome.result.documents()[0].bytes);

    assert_eq!(merged.page_count, 3);
    assert!(!merged.uniform_size);
    let sizes: Vec<_> = merged.pages.iter().map(|p| (p.width, p.height)).collect();
    assert_eq!(sizes, [(612.0, 792.0), (595.0, 842.0), (300.0, 200.0)]);
}

#[test]
fn test_merge_same_document_twice() {
    let source = letter_source("a.pdf", 2);
    let outcome = transform(
        TransformRequest::Merge,
        vec![source.clone(), source],
        &ExecutionContext::default(),
    )
    .unwrap();
    assert_eq!(info(&outcome.result.documents()[0].bytes).page_count, 4);
}

#[test]
fn test_merge_requires_two_documents() {
    let err = transform(
        TransformRequest::Merge,
        vec![letter_source("only.pdf", 3)],
        &ExecutionContext::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        PdfShapeError::InsufficientInput {
            required: 2,
            provided: 1
        }
    ));
}

#[test]
fn test_merge_rejects_image_inputs() {
    let sources = vec![
        letter_source("a.pdf", 1),
        SourceFile::image("photo.png", crate::common::png(4, 4)),
    ];
    let err = transform(TransformRequest::Merge, sources, &ExecutionContext::default())
        .unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_merge_fails_on_corrupt_input() {
    let sources = vec![
        letter_source("good.pdf", 2),
        SourceFile::document("bad.pdf", b"not a pdf at all".to_vec()),
    ];

    let err = transform(TransformRequest::Merge, sources, &ExecutionContext::default())
        .unwrap_err();
    assert!(matches!(err, PdfShapeError::Document { ref name, .. } if name == "bad.pdf"));
    assert_eq!(err.exit_code(), 3);
}
