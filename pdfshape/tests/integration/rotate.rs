//! Page rotation end to end.

use rstest::rstest;

use pdfshape::PdfShapeError;
use pdfshape::error::RangeError;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::range::PageRanges;
use pdfshape::request::{RotateScope, RotationAngle, SourceFile, TransformRequest};

use crate::common::{letter_source, page_labels, rotations};

fn rotate(source: SourceFile, angle: RotationAngle, scope: RotateScope) -> pdfshape::Result<Vec<u8>> {
    let request = TransformRequest::Rotate { angle, scope };
    let outcome = transform(request, vec![source], &ExecutionContext::default())?;
    Ok(outcome.result.into_documents().remove(0).bytes)
}

#[rstest]
#[case(RotationAngle::Deg0, 0)]
#[case(RotationAngle::Deg90, 90)]
#[case(RotationAngle::Deg180, 180)]
#[case(RotationAngle::Deg270, 270)]
fn test_rotate_every_page(#[case] angle: RotationAngle, #[case] expected: u16) {
    let bytes = rotate(letter_source("scan.pdf", 3), angle, RotateScope::AllPages).unwrap();
    assert_eq!(rotations(&bytes), [expected; 3]);
    assert_eq!(page_labels(&bytes), ["Page 1", "Page 2", "Page 3"]);
}

#[test]
fn test_rotate_selected_pages() {
    let scope = RotateScope::Pages(PageRanges::parse("1,3").unwrap());
    let bytes = rotate(letter_source("scan.pdf", 4), RotationAngle::Deg270, scope).unwrap();
    assert_eq!(rotations(&bytes), [270, 0, 270, 0]);
}

#[test]
fn test_rotation_replaces_existing_value() {
    let once = rotate(letter_source("a.pdf", 2), RotationAngle::Deg180, RotateScope::AllPages)
        .unwrap();
    let twice = rotate(
        SourceFile::document("a.pdf", once),
        RotationAngle::Deg90,
        RotateScope::AllPages,
    )
    .unwrap();
    assert_eq!(rotations(&twice), [90, 90]);
}

#[test]
fn test_rotate_out_of_bounds_page() {
    let scope = RotateScope::Pages(PageRanges::parse("4").unwrap());
    let err = rotate(letter_source("a.pdf", 3), RotationAngle::Deg90, scope).unwrap_err();
    assert!(matches!(
        err,
        PdfShapeError::Range(RangeError::OutOfBounds {
            page: 4,
            total_pages: 3
        })
    ));
}

#[rstest]
#[case(45)]
#[case(360)]
#[case(91)]
fn test_invalid_angles_are_rejected(#[case] degrees: u16) {
    assert!(RotationAngle::try_from(degrees).is_err());
}

#[test]
fn test_rotate_request_from_json() {
    let request: TransformRequest = serde_json::from_str(
        r#"{"operation": "rotate", "angle": 90, "scope": {"pages": "2"}}"#,
    )
    .unwrap();
    let outcome = transform(
        request,
        vec![letter_source("a.pdf", 2)],
        &ExecutionContext::default(),
    )
    .unwrap();
    assert_eq!(rotations(&outcome.result.documents()[0].bytes), [0, 90]);
}
