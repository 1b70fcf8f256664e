//! Rebuild a document in an explicit page order.

use super::{ExecutionContext, OutputDocument, open};
use crate::document::DocumentHandle;
use crate::error::Result;
use crate::range::check_pages;
use crate::request::SourceFile;

/// Pages may repeat or be left out; every entry must exist.
pub(crate) fn run(
    source: SourceFile,
    order: &[u32],
    context: &ExecutionContext,
) -> Result<OutputDocument> {
    let handle = open(&source)?;
    check_pages(order, handle.page_count())?;

    let batch = handle.copy_pages(order)?;
    drop(handle);

    let name = format!("{}_reordered.pdf", context.base_name_or(source.stem()));
    let mut target = DocumentHandle::new_document().with_name(name.clone());
    target.append_pages(batch)?;
    context.finish(target, name)
}
