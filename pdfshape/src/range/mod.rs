//! Page selection: parse expressions like `"1-3,5"`, then resolve them
//! against a document's page count.
//!
//! Syntax is checked by [`parser`] without a document; bounds are checked
//! by [`mapper`] once the page count is known.

pub mod mapper;
pub mod parser;

pub use mapper::{PageSelector, ResolveMode, check_pages, resolve, resolve_sequence, resolve_union};
pub use parser::{PageRanges, PageSpan};
