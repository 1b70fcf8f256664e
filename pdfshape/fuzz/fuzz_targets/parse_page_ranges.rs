#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfshape::range::{PageRanges, resolve_sequence, resolve_union};

fuzz_target!(|data: &[u8]| {
    let Ok(expression) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(ranges) = PageRanges::parse(expression) else {
        return;
    };

    // Every accepted expression is well formed
    for span in ranges.spans() {
        assert!(span.start >= 1);
        assert!(span.start <= span.end);
    }

    // Display output parses back to the same spans
    let reparsed = PageRanges::parse(&ranges.to_string()).unwrap();
    assert_eq!(reparsed, ranges);

    // Resolution never yields a page outside the document
    let total = 50;
    if let Ok(selector) = resolve_union(&ranges, total) {
        assert!(selector.pages().iter().all(|&p| (1..=total).contains(&p)));
        assert!(selector.pages().windows(2).all(|w| w[0] < w[1]));
    }
    if let Ok(parts) = resolve_sequence(&ranges, total) {
        assert_eq!(parts.len(), ranges.len());
    }
});
