//! Page number stamping.

use super::{ExecutionContext, OutputDocument, open};
use crate::document::overlay::text_width;
use crate::document::{OverlayContent, OverlaySpec, PageSize, Placement, TextMark};
use crate::error::{PdfShapeError, Result};
use crate::request::{NumberPosition, NumberStyle, PageNumberOptions, SourceFile};

/// Points per millimetre.
const POINTS_PER_MM: f32 = 2.83465;

/// Vertical offset from the drawing center to the text baseline, as a
/// fraction of the font size.
const BASELINE_OFFSET: f32 = 0.35;

pub(crate) fn run(
    source: SourceFile,
    options: &PageNumberOptions,
    context: &ExecutionContext,
) -> Result<OutputDocument> {
    let mut handle = open(&source)?;
    let total = handle.page_count();
    let first = if options.skip_first { 2 } else { 1 };
    let numbered = total.saturating_sub(first - 1);

    let last = options.start_at.saturating_add(numbered.saturating_sub(1));
    if numbered > 0 && last > options.style.max_number() {
        return Err(PdfShapeError::invalid_request(format!(
            "Numbering {} page(s) from {} reaches {last}, past the largest number this style writes ({})",
            numbered,
            options.start_at,
            options.style.max_number()
        )));
    }

    for page in first..=total {
        let label = format_label(
            options.style,
            options.start_at.saturating_add(page - first),
            numbered,
        );
        let size = handle.displayed_size(page)?;
        let spec = OverlaySpec {
            placement: placement(&label, options, size),
            content: OverlayContent::Text(TextMark {
                text: label,
                font_size: options.font_size,
                rotation: 0.0,
                gray: 0.0,
            }),
            opacity: 100,
        };
        handle.draw_overlay(page, &spec)?;
    }

    let name = format!("{}_numbered.pdf", context.base_name_or(source.stem()));
    context.finish(handle, name)
}

/// Label for one page. `total` is the count of numbered pages.
pub fn format_label(style: NumberStyle, number: u32, total: u32) -> String {
    match style {
        NumberStyle::Plain => number.to_string(),
        NumberStyle::PageN => format!("Page {number}"),
        NumberStyle::NOfTotal => format!("{number} of {total}"),
        NumberStyle::RomanLower => roman(number).to_lowercase(),
        NumberStyle::RomanUpper => roman(number),
    }
}

/// Upper-case roman numeral. Zero has none and yields an empty string.
fn roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, symbol) in NUMERALS {
        while number >= value {
            out.push_str(symbol);
            number -= value;
        }
    }
    out
}

/// Center point of the label, relative to the page box's lower-left.
fn placement(label: &str, options: &PageNumberOptions, page: PageSize) -> Placement {
    let margin = options.margin_mm * POINTS_PER_MM;
    let width = text_width(label, options.font_size);

    let left = match options.position {
        NumberPosition::BottomLeft | NumberPosition::TopLeft => margin,
        NumberPosition::BottomRight | NumberPosition::TopRight => page.width - margin - width,
        NumberPosition::BottomCenter | NumberPosition::TopCenter => (page.width - width) / 2.0,
    };
    let baseline = match options.position {
        NumberPosition::BottomCenter | NumberPosition::BottomLeft | NumberPosition::BottomRight => {
            margin
        }
        NumberPosition::TopCenter | NumberPosition::TopLeft | NumberPosition::TopRight => {
            page.height - margin
        }
    };

    Placement::Center {
        x: left + width / 2.0,
        y: baseline + BASELINE_OFFSET * options.font_size,
    }
}
