//! Absolute page rotation, in place.

use super::{ExecutionContext, OutputDocument, open};
use crate::error::Result;
use crate::range::{PageSelector, resolve_union};
use crate::request::{RotateScope, RotationAngle, SourceFile};

pub(crate) fn run(
    source: SourceFile,
    angle: RotationAngle,
    scope: &RotateScope,
    context: &ExecutionContext,
) -> Result<OutputDocument> {
    let mut handle = open(&source)?;
    let total = handle.page_count();

    let selector = match scope {
        RotateScope::AllPages => PageSelector::all(total)?,
        RotateScope::Pages(ranges) => resolve_union(ranges, total)?,
    };

    for page in &selector {
        handle.set_rotation(*page, angle.degrees())?;
    }

    let name = format!("{}_rotated.pdf", context.base_name_or(source.stem()));
    context.finish(handle, name)
}
