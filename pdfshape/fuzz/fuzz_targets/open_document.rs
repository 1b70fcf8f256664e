#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::request::{RotateScope, RotationAngle, SourceFile, TransformRequest};

fuzz_target!(|data: &[u8]| {
    let source = SourceFile::document("fuzz.pdf", data.to_vec());
    let request = TransformRequest::Rotate {
        angle: RotationAngle::Deg90,
        scope: RotateScope::AllPages,
    };

    // Arbitrary bytes must fail cleanly or produce a loadable document
    if let Ok(outcome) = transform(request, vec![source], &ExecutionContext::default()) {
        let bytes = &outcome.result.documents()[0].bytes;
        assert!(pdfshape::validation::inspect("out.pdf", bytes).is_ok());
    }
});
