//! Resolution of parsed page ranges against a concrete page count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::RangeError;
use crate::range::parser::{PageRanges, PageSpan};

/// How parsed spans are turned into selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// All spans flattened into one ascending, duplicate-free selector.
    Union,
    /// One selector per span, in the order the spans were written.
    Sequence,
}

/// A non-empty, strictly increasing set of 1-based page numbers that are
/// known to exist in the document they were resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageSelector {
    pages: Vec<u32>,
}

impl PageSelector {
    /// Every page of a `total_pages` document, in natural order.
    pub fn all(total_pages: u32) -> Result<Self, RangeError> {
        if total_pages == 0 {
            return Err(RangeError::EmptyDocument);
        }
        Ok(Self {
            pages: (1..=total_pages).collect(),
        })
    }

    /// The selected page numbers.
    pub fn pages(&self) -> &[u32] {
        &self.pages
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no pages are selected.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Check if a page is selected.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.binary_search(&page).is_ok()
    }

    /// Consume the selector, returning its pages.
    pub fn into_pages(self) -> Vec<u32> {
        self.pages
    }
}

impl IntoIterator for PageSelector {
    type Item = u32;
    type IntoIter = std::vec::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageSelector {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

/// Resolve parsed ranges against a document with `total_pages` pages.
///
/// `Union` returns exactly one selector, `Sequence` one per span. A single
/// span that does not fit rejects the whole request.
///
/// # Examples
///
/// ```
/// use pdfshape::range::{PageRanges, ResolveMode, resolve};
///
/// let ranges = PageRanges::parse("1-3,5,7-9").unwrap();
/// let selectors = resolve(&ranges, 10, ResolveMode::Sequence).unwrap();
/// assert_eq!(selectors[0].pages(), &[1, 2, 3]);
/// assert_eq!(selectors[1].pages(), &[5]);
/// assert_eq!(selectors[2].pages(), &[7, 8, 9]);
/// ```
pub fn resolve(
    ranges: &PageRanges,
    total_pages: u32,
    mode: ResolveMode,
) -> Result<Vec<PageSelector>, RangeError> {
    match mode {
        ResolveMode::Union => resolve_union(ranges, total_pages).map(|selector| vec![selector]),
        ResolveMode::Sequence => resolve_sequence(ranges, total_pages),
    }
}

/// Flatten all spans into one ascending selector.
pub fn resolve_union(ranges: &PageRanges, total_pages: u32) -> Result<PageSelector, RangeError> {
    check_spans(ranges, total_pages)?;

    let pages: BTreeSet<u32> = ranges
        .spans()
        .iter()
        .flat_map(|span| span.start..=span.end)
        .collect();

    Ok(PageSelector {
        pages: pages.into_iter().collect(),
    })
}

/// One selector per span, preserving span order.
pub fn resolve_sequence(
    ranges: &PageRanges,
    total_pages: u32,
) -> Result<Vec<PageSelector>, RangeError> {
    check_spans(ranges, total_pages)?;

    Ok(ranges
        .spans()
        .iter()
        .map(|span| PageSelector {
            pages: (span.start..=span.end).collect(),
        })
        .collect())
}

/// Validate an explicit page list (which may repeat pages) against a page count.
pub fn check_pages(pages: &[u32], total_pages: u32) -> Result<(), RangeError> {
    if total_pages == 0 {
        return Err(RangeError::EmptyDocument);
    }
    if pages.is_empty() {
        return Err(RangeError::EmptySelection);
    }
    for &page in pages {
        if page == 0 {
            return Err(RangeError::ZeroPage);
        }
        if page > total_pages {
            return Err(RangeError::OutOfBounds { page, total_pages });
        }
    }
    Ok(())
}

fn check_spans(ranges: &PageRanges, total_pages: u32) -> Result<(), RangeError> {
    if total_pages == 0 {
        return Err(RangeError::EmptyDocument);
    }
    if ranges.is_empty() {
        return Err(RangeError::EmptySelection);
    }
    ranges
        .spans()
        .iter()
        .try_for_each(|span| check_span(span, total_pages))
}

fn check_span(span: &PageSpan, total_pages: u32) -> Result<(), RangeError> {
    if span.start == 0 {
        return Err(RangeError::ZeroPage);
    }
    if span.end < span.start {
        return Err(RangeError::Inverted {
            start: span.start,
            end: span.end,
        });
    }
    if span.end > total_pages {
        return Err(RangeError::OutOfBounds {
            page: span.end,
            total_pages,
        });
    }
    Ok(())
}
