//! Splitting and extracting end to end.

use rstest::rstest;

use pdfshape::PdfShapeError;
use pdfshape::document::DocumentHandle;
use pdfshape::error::{ParseError, RangeError};
use pdfshape::ops::{ExecutionContext, TransformResult, transform};
use pdfshape::range::PageRanges;
use pdfshape::request::{SourceFile, SplitMode, TransformRequest};

use crate::common::{letter_source, page_labels, sample_pdf};

fn split(pages: usize, mode: SplitMode) -> pdfshape::Result<TransformResult> {
    let request = TransformRequest::Split { mode };
    transform(request, vec![letter_source("report.pdf", pages)], &ExecutionContext::default())
        .map(|outcome| outcome.result)
}

#[test]
fn test_split_by_ranges_one_output_per_range() {
    let ranges = PageRanges::parse("1-3, 5").unwrap();
    let result = split(6, SplitMode::Ranges(ranges)).unwrap();

    let docs = result.documents();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].name, "report_1.pdf");
    assert_eq!(docs[1].name, "report_2.pdf");
    assert_eq!(page_labels(&docs[0].bytes), ["Page 1", "Page 2", "Page 3"]);
    assert_eq!(page_labels(&docs[1].bytes), ["Page 5"]);
}

#[test]
fn test_single_range_still_yields_multiple_result() {
    let result = split(4, SplitMode::Ranges(PageRanges::parse("2-3").unwrap())).unwrap();
    assert!(matches!(result, TransformResult::Multiple(ref docs) if docs.len() == 1));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_split_each_page(#[case] pages: usize) {
    let result = split(pages, SplitMode::AllIndividually).unwrap();

    assert_eq!(result.len(), pages);
    for (i, doc) in result.documents().iter().enumerate() {
        assert_eq!(doc.name, format!("report_{}.pdf", i + 1));
        assert_eq!(page_labels(&doc.bytes), [format!("Page {}", i + 1)]);
    }
}

#[test]
fn test_split_then_merge_restores_pages() {
    let original = sample_pdf(&[(612, 792), (595, 842), (300, 200)]);
    let split = transform(
        TransformRequest::Split {
            mode: SplitMode::AllIndividually,
        },
        vec![SourceFile::document("mixed.pdf", original.clone())],
        &ExecutionContext::default(),
    )
    .unwrap();

    let parts: Vec<SourceFile> = split
        .result
        .into_documents()
        .into_iter()
        .map(|doc| SourceFile::document(doc.name, doc.bytes))
        .collect();
    assert_eq!(parts.len(), 3);

    let merged = transform(TransformRequest::Merge, parts, &ExecutionContext::default())
        .unwrap()
        .result
        .into_documents()
        .remove(0);

    let before = DocumentHandle::open(&original).unwrap();
    let after = DocumentHandle::open(&merged.bytes).unwrap();
    assert_eq!(after.page_count(), before.page_count());
    for page in 1..=before.page_count() {
        assert_eq!(after.page_size(page).unwrap(), before.page_size(page).unwrap());
    }
    assert_eq!(page_labels(&merged.bytes), page_labels(&original));
}

#[test]
fn test_extract_gives_one_document() {
    let ranges = PageRanges::parse("2,4-5").unwrap();
    let result = split(6, SplitMode::Extract(ranges)).unwrap();

    let TransformResult::Single(doc) = result else {
        panic!("extract should produce a single document");
    };
    assert_eq!(doc.name, "report_extracted.pdf");
    assert_eq!(page_labels(&doc.bytes), ["Page 2", "Page 4", "Page 5"]);
}

#[test]
fn test_range_past_last_page_is_rejected() {
    let err = split(3, SplitMode::Ranges(PageRanges::parse("2-5").unwrap())).unwrap_err();
    assert!(matches!(
        err,
        PdfShapeError::Range(RangeError::OutOfBounds { total_pages: 3, .. })
    ));
}

#[rstest]
#[case("3-1")]
#[case("0")]
#[case("a-b")]
#[case("")]
fn test_malformed_expressions_never_reach_the_engine(#[case] expression: &str) {
    let err: PdfShapeError = PageRanges::parse(expression).unwrap_err().into();
    assert!(matches!(err, PdfShapeError::Parse(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_inverted_range_reports_bounds() {
    assert_eq!(
        PageRanges::parse("5-2").unwrap_err(),
        ParseError::InvertedRange { start: 5, end: 2 }
    );
}
