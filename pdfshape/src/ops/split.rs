//! Split a document by ranges, into single pages, or extract a selection.

use tracing::debug;

use super::{ExecutionContext, OutputDocument, TransformResult, open};
use crate::document::DocumentHandle;
use crate::error::Result;
use crate::range::{PageSelector, resolve_sequence, resolve_union};
use crate::request::{SourceFile, SplitMode};

pub(crate) fn run(
    source: SourceFile,
    mode: &SplitMode,
    context: &ExecutionContext,
) -> Result<TransformResult> {
    let handle = open(&source)?;
    let base = context.base_name_or(source.stem());
    let total = handle.page_count();

    let parts: Vec<Vec<u32>> = match mode {
        SplitMode::Ranges(ranges) => resolve_sequence(ranges, total)?
            .into_iter()
            .map(PageSelector::into_pages)
            .collect(),
        SplitMode::AllIndividually => PageSelector::all(total)?
            .into_iter()
            .map(|page| vec![page])
            .collect(),
        SplitMode::Extract(ranges) => {
            let selector = resolve_union(ranges, total)?;
            let name = format!("{base}_extracted.pdf");
            let output = extract(&handle, selector.pages(), context, name)?;
            return Ok(TransformResult::Single(output));
        }
    };

    // Every part is resolved before any output is built
    let outputs = parts
        .iter()
        .enumerate()
        .map(|(i, pages)| extract(&handle, pages, context, format!("{base}_{}.pdf", i + 1)))
        .collect::<Result<Vec<_>>>()?;

    Ok(TransformResult::Multiple(outputs))
}

fn extract(
    source: &DocumentHandle,
    pages: &[u32],
    context: &ExecutionContext,
    name: String,
) -> Result<OutputDocument> {
    let batch = source.copy_pages(pages)?;
    let mut target = DocumentHandle::new_document().with_name(name.clone());
    target.append_pages(batch)?;

    debug!(output = %name, pages = pages.len(), "split part");
    context.finish(target, name)
}
