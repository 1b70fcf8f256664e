//! Concatenate documents.

use tracing::debug;

use super::{ExecutionContext, OutputDocument, open};
use crate::document::DocumentHandle;
use crate::error::{PdfShapeError, Result};
use crate::request::SourceFile;

/// Append every page of every source, in input order.
///
/// Sources are opened one at a time and released as soon as their pages
/// are copied, so at most one source is resident next to the output.
pub(crate) fn run(sources: Vec<SourceFile>, context: &ExecutionContext) -> Result<OutputDocument> {
    if sources.len() < 2 {
        return Err(PdfShapeError::insufficient_input(2, sources.len()));
    }

    let base = context.base_name_or("merged");
    let mut target = DocumentHandle::new_document().with_name(format!("{base}.pdf"));

    for (index, source) in sources.iter().enumerate() {
        let handle = open(source)?;
        let pages: Vec<u32> = (1..=handle.page_count()).collect();
        let batch = handle.copy_pages(&pages)?;
        drop(handle);

        debug!(
            index,
            source = %source.name,
            pages = batch.len(),
            "merging document"
        );
        target.append_pages(batch)?;
    }

    context.finish(target, format!("{base}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageSize;
    use crate::document::tests::page_labels;
    use crate::ops::tests::{letter_source, pdf_source};

    #[test]
    fn test_merge_preserves_document_and_page_order() {
        let sources = vec![letter_source("a.pdf", 3), letter_source("b.pdf", 2)];
        let output = run(sources, &ExecutionContext::default()).unwrap();

        assert_eq!(output.name, "merged.pdf");
        assert_eq!(
            page_labels(&output.bytes),
            ["Page 1", "Page 2", "Page 3", "Page 1", "Page 2"]
        );
    }

    #[test]
    fn test_merge_keeps_heterogeneous_sizes() {
        let sources = vec![
            pdf_source("a.pdf", &[(612.0, 792.0)]),
            pdf_source("b.pdf", &[(595.0, 842.0), (300.0, 300.0)]),
        ];
        let output = run(sources, &ExecutionContext::default()).unwrap();

        let merged = DocumentHandle::open(&output.bytes).unwrap();
        assert_eq!(merged.page_count(), 3);
        assert_eq!(merged.page_size(1).unwrap(), PageSize::new(612.0, 792.0));
        assert_eq!(merged.page_size(2).unwrap(), PageSize::new(595.0, 842.0));
        assert_eq!(merged.page_size(3).unwrap(), PageSize::new(300.0, 300.0));
    }

    #[test]
    fn test_merge_same_document_twice() {
        let source = letter_source("a.pdf", 2);
        let output = run(vec![source.clone(), source], &ExecutionContext::default()).unwrap();
        assert_eq!(
            page_labels(&output.bytes),
            ["Page 1", "Page 2", "Page 1", "Page 2"]
        );
    }

    #[test]
    fn test_merge_single_input_is_insufficient() {
        let err = run(vec![letter_source("a.pdf", 1)], &ExecutionContext::default()).unwrap_err();
        assert!(matches!(
            err,
            PdfShapeError::InsufficientInput {
                required: 2,
                provided: 1
            }
        ));
    }

    #[test]
    fn test_merge_uses_base_name_override() {
        let context = ExecutionContext {
            base_name: Some("binder".into()),
            ..ExecutionContext::default()
        };
        let output = run(
            vec![letter_source("a.pdf", 1), letter_source("b.pdf", 1)],
            &context,
        )
        .unwrap();
        assert_eq!(output.name, "binder.pdf");
    }
}
