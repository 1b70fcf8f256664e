//! Reordering pages and stamping page numbers.

use pdfshape::PdfShapeError;
use pdfshape::error::RangeError;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::request::{NumberPosition, NumberStyle, PageNumberOptions, TransformRequest};

use crate::common::{info, letter_source, page_labels, page_texts};

fn run(request: TransformRequest, pages: usize) -> pdfshape::Result<(String, Vec<u8>)> {
    let outcome = transform(
        request,
        vec![letter_source("deck.pdf", pages)],
        &ExecutionContext::default(),
    )?;
    let doc = outcome.result.into_documents().remove(0);
    Ok((doc.name, doc.bytes))
}

#[test]
fn test_reverse_order() {
    let (name, bytes) = run(TransformRequest::Reorder { order: vec![3, 2, 1] }, 3).unwrap();
    assert_eq!(name, "deck_reordered.pdf");
    assert_eq!(page_labels(&bytes), ["Page 3", "Page 2", "Page 1"]);
}

#[test]
fn test_reorder_can_drop_and_repeat_pages() {
    let (_, bytes) = run(TransformRequest::Reorder { order: vec![2, 2, 4] }, 4).unwrap();
    assert_eq!(page_labels(&bytes), ["Page 2", "Page 2", "Page 4"]);
}

#[test]
fn test_empty_order_is_rejected() {
    let err = run(TransformRequest::Reorder { order: Vec::new() }, 2).unwrap_err();
    assert!(matches!(err, PdfShapeError::Range(RangeError::EmptySelection)));
}

#[test]
fn test_order_past_last_page_is_rejected() {
    let err = run(TransformRequest::Reorder { order: vec![1, 5] }, 2).unwrap_err();
    assert!(matches!(
        err,
        PdfShapeError::Range(RangeError::OutOfBounds { page: 5, .. })
    ));
}

#[test]
fn test_page_numbers_on_every_page() {
    let (name, bytes) = run(TransformRequest::PageNumbers(PageNumberOptions::default()), 3).unwrap();

    assert_eq!(name, "deck_numbered.pdf");
    assert_eq!(info(&bytes).page_count, 3);
    let texts = page_texts(&bytes);
    assert_eq!(texts[1], ["Page 2", "2"]);
}

#[test]
fn test_page_numbers_n_of_total_from_top() {
    let options = PageNumberOptions {
        position: NumberPosition::TopRight,
        style: NumberStyle::NOfTotal,
        ..PageNumberOptions::default()
    };
    let (_, bytes) = run(TransformRequest::PageNumbers(options), 2).unwrap();

    let texts = page_texts(&bytes);
    assert_eq!(texts[0], ["Page 1", "1 of 2"]);
    assert_eq!(texts[1], ["Page 2", "2 of 2"]);
}

#[test]
fn test_roman_numerals_from_zero_are_rejected() {
    let options = PageNumberOptions {
        style: NumberStyle::RomanUpper,
        start_at: 0,
        ..PageNumberOptions::default()
    };
    let err = run(TransformRequest::PageNumbers(options), 1).unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[test]
fn test_huge_roman_start_is_rejected_before_drawing() {
    let options = PageNumberOptions {
        style: NumberStyle::RomanUpper,
        start_at: 3_000_000_000,
        ..PageNumberOptions::default()
    };
    let err = TransformRequest::PageNumbers(options)
        .validate(vec![letter_source("deck.pdf", 3)])
        .unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
    assert_eq!(err.exit_code(), 1);
}
