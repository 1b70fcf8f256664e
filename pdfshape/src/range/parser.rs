//! Page-range expression parsing.
//!
//! Supports individual pages and closed ranges, separated by commas:
//! - "1" - single page
//! - "1-5" - range of pages (inclusive)
//! - "1,3,5" - multiple individual pages
//! - "1-5,10-15" - combination of ranges
//!
//! Parsing is purely syntactic. Whether a page exists is decided later by
//! [`crate::range::mapper`], once the document is known.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// One closed, 1-based span of pages as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSpan {
    /// First page, inclusive.
    pub start: u32,
    /// Last page, inclusive.
    pub end: u32,
}

impl PageSpan {
    /// A span covering a single page.
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    /// A span covering `start..=end`.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of pages in the span, zero if inverted.
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether the span selects nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parsed page ranges, in the order they were written.
///
/// Order is significant: when splitting, each span becomes one output
/// document in this order. Spans are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageRanges {
    spans: Vec<PageSpan>,
}

impl PageRanges {
    /// Parse a page range expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if a token is not a positive integer, a range
    /// is inverted, a segment has more than one dash, or nothing is selected.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfshape::range::{PageRanges, PageSpan};
    ///
    /// let ranges = PageRanges::parse("1-3,5,7-9").unwrap();
    /// assert_eq!(
    ///     ranges.spans(),
    ///     &[PageSpan::new(1, 3), PageSpan::single(5), PageSpan::new(7, 9)]
    /// );
    /// ```
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let mut spans = Vec::new();

        for segment in expression.split(',') {
            let segment = segment.trim();

            // Stray commas ("1,,3" or a trailing comma) select nothing
            if segment.is_empty() {
                continue;
            }

            spans.push(parse_segment(segment)?);
        }

        if spans.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(Self { spans })
    }

    /// Build ranges from spans that did not come from text.
    ///
    /// No validation happens here; the mapper rejects zero, inverted and
    /// out-of-bounds spans when they are resolved.
    pub fn from_spans(spans: impl IntoIterator<Item = PageSpan>) -> Self {
        Self {
            spans: spans.into_iter().collect(),
        }
    }

    /// Ranges covering `1..=total_pages`, the "select all" shortcut.
    pub fn all(total_pages: u32) -> Self {
        Self {
            spans: vec![PageSpan::new(1, total_pages)],
        }
    }

    /// The spans in user order.
    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Check if a page number is covered by any span.
    pub fn contains(&self, page: u32) -> bool {
        self.spans
            .iter()
            .any(|span| page >= span.start && page <= span.end)
    }
}

fn parse_segment(segment: &str) -> Result<PageSpan, ParseError> {
    let Some((start, end)) = segment.split_once('-') else {
        let page = parse_page(segment, segment)?;
        return Ok(PageSpan::single(page));
    };

    if end.contains('-') {
        return Err(ParseError::Malformed {
            segment: segment.to_string(),
        });
    }

    let start = parse_page(start, segment)?;
    let end = parse_page(end, segment)?;

    if end < start {
        return Err(ParseError::InvertedRange { start, end });
    }

    Ok(PageSpan::new(start, end))
}

fn parse_page(token: &str, segment: &str) -> Result<u32, ParseError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ParseError::Malformed {
            segment: segment.to_string(),
        });
    }

    let page: u32 = token.parse().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
    })?;

    if page == 0 {
        return Err(ParseError::ZeroPage {
            segment: segment.to_string(),
        });
    }

    Ok(page)
}

impl FromStr for PageRanges {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageRanges {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PageRanges> for String {
    fn from(ranges: PageRanges) -> Self {
        ranges.to_string()
    }
}

impl fmt::Display for PageRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{span}")?;
        }
        Ok(())
    }
}
