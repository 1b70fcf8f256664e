//! Packaging results into deliverables.

use std::io::{Cursor, Read};
use zip::ZipArchive;

use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::package::{ContentType, package};
use pdfshape::range::PageRanges;
use pdfshape::request::{SplitMode, TransformRequest};

use crate::common::{letter_source, page_labels};

fn split(mode: SplitMode, pages: usize) -> pdfshape::ops::TransformResult {
    transform(
        TransformRequest::Split { mode },
        vec![letter_source("report.pdf", pages)],
        &ExecutionContext::default(),
    )
    .unwrap()
    .result
}

#[test]
fn test_many_outputs_become_one_archive() {
    let unit = package(split(SplitMode::AllIndividually, 3), "report").unwrap();

    assert_eq!(unit.file_name, "report.zip");
    assert_eq!(unit.content_type, ContentType::Zip);
    assert_eq!(unit.content_type.mime(), "application/zip");

    let mut archive = ZipArchive::new(Cursor::new(unit.bytes)).unwrap();
    assert_eq!(archive.len(), 3);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), format!("report_{}.pdf", i + 1));

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        assert_eq!(page_labels(&bytes), [format!("Page {}", i + 1)]);
    }
}

#[test]
fn test_one_range_is_delivered_as_pdf() {
    let ranges = PageRanges::parse("2-3").unwrap();
    let unit = package(split(SplitMode::Ranges(ranges), 4), "report").unwrap();

    assert_eq!(unit.file_name, "report_1.pdf");
    assert_eq!(unit.content_type, ContentType::Pdf);
    assert!(unit.bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_archives_are_reproducible() {
    let first = package(split(SplitMode::AllIndividually, 2), "report").unwrap();
    let second = package(split(SplitMode::AllIndividually, 2), "report").unwrap();
    assert_eq!(first.bytes, second.bytes);
}
