//! User-facing output for pdfshape.
//!
//! This module handles everything printed for a person rather than a log:
//! - Formatted status messages
//! - Skipped-input warnings
//! - Summaries of what was read, produced and written
//! - Document inspection reports
//!
//! # Examples
//!
//! ```no_run
//! use pdfshape::output::create_formatter;
//! use pdfshape::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = create_formatter(&config);
//! formatter.info("Splitting report.pdf");
//! formatter.success("Wrote report.zip");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::config::Config;
use crate::io::{ReadStatistics, WriteStatistics};
use crate::ops::TransformOutcome;
use crate::validation::{DocumentInfo, ValidationSummary};

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Display the pre-flight summary.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    formatter.info(&format!(
        "Validated {} file(s): {}",
        summary.files_validated(),
        summary.format_total_size()
    ));
}

/// Display read statistics.
pub fn display_read_statistics(formatter: &OutputFormatter, stats: &ReadStatistics) {
    formatter.debug(&format!(
        "Read {} file(s) in {:.2}s: {}",
        stats.file_count,
        stats.total_time.as_secs_f64(),
        format_file_size(stats.total_size)
    ));
}

/// Display produced documents and any skipped inputs.
pub fn display_outcome(formatter: &OutputFormatter, outcome: &TransformOutcome) {
    for warning in &outcome.warnings {
        formatter.warning(&warning.to_string());
    }

    let documents = outcome.result.documents();
    formatter.info(&format!(
        "Produced {} document(s), {}",
        documents.len(),
        format_file_size(outcome.result.total_bytes() as u64)
    ));
    for (i, doc) in documents.iter().enumerate() {
        if formatter.is_verbose() {
            formatter.list_item(
                i + 1,
                &format!("{} ({})", doc.name, format_file_size(doc.byte_size() as u64)),
            );
        }
    }
}

/// Display where the deliverable went.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Wrote {} ({})",
        stats.output_path.display(),
        format_file_size(stats.file_size)
    ));
    formatter.detail(
        "Write time",
        &format!("{:.3}s", stats.write_time.as_secs_f64()),
    );
}

/// Text report for one inspected document.
pub fn render_document_info(info: &DocumentInfo) -> String {
    let mut out = format!(
        "{}\n  Pages: {}\n  PDF version: {}\n  Size: {}\n",
        info.name,
        info.page_count,
        info.version,
        info.format_file_size()
    );

    if info.uniform_size
        && let Some(first) = info.pages.first()
    {
        out.push_str(&format!(
            "  Page size: {} x {} pt\n",
            first.width, first.height
        ));
    }

    for page in &info.pages {
        if !info.uniform_size || page.rotation != 0 {
            out.push_str(&format!(
                "  Page {}: {} x {} pt, rotated {}°\n",
                page.number, page.width, page.height, page.rotation
            ));
        }
    }

    out
}
