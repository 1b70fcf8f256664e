//! CLI argument parsing for pdfshape.
//!
//! This module defines the command-line interface structure using `clap`.
//! Each subcommand maps to one transform; global flags become the run
//! [`Config`].

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pdfshape::config::{CompressionLevel, Config, Metadata, OverwriteMode};
use pdfshape::document::Anchor;
use pdfshape::error::{ParseError, PdfShapeError, Result};
use pdfshape::range::PageRanges;
use pdfshape::request::{
    NumberPosition, NumberStyle, Orientation, PageFormat, PageNumberOptions, PageSizing,
    RotateScope, RotationAngle, SplitMode, TransformRequest, WatermarkContent, WatermarkOptions,
};

/// Reshape PDF documents.
///
/// pdfshape merges, splits, rotates, watermarks and renumbers PDF files,
/// and assembles images into a document. Several outputs are delivered as
/// one zip archive.
#[derive(Parser, Debug)]
#[command(name = "pdfshape")]
#[command(version)]
#[command(about = "Reshape PDF documents: merge, split, rotate, watermark", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output file path
    ///
    /// Defaults to the suggested name (e.g. report_rotated.pdf, report.zip)
    /// in the current directory.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Validate inputs and the request without writing anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Verbose output, including debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file without confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, global = true, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Structural compression for output documents
    ///
    /// - none: write streams as they are
    /// - standard: compress uncompressed streams (default)
    /// - maximum: also drop unused objects and renumber
    #[arg(short, long, value_name = "LEVEL", default_value = "standard", global = true)]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata on every output
    #[arg(long, value_name = "TEXT", global = true)]
    pub title: Option<String>,

    /// Set author metadata on every output
    #[arg(long, value_name = "TEXT", global = true)]
    pub author: Option<String>,

    /// Set subject metadata on every output
    #[arg(long, value_name = "TEXT", global = true)]
    pub subject: Option<String>,

    /// Set keywords metadata on every output (comma-separated)
    #[arg(long, value_name = "TEXT", global = true)]
    pub keywords: Option<String>,

    /// Base of the suggested output names
    ///
    /// Example: --name chapter with split gives chapter_1.pdf, chapter_2.pdf
    /// inside chapter.zip.
    #[arg(long, value_name = "NAME", global = true)]
    pub name: Option<String>,

    /// Read additional inputs from a file (one path per line, '-' for stdin)
    #[arg(long, value_name = "FILE", global = true)]
    pub input_list: Option<PathBuf>,

    /// Number of inputs read concurrently
    #[arg(short, long, value_name = "N", global = true)]
    pub jobs: Option<usize>,
}

/// The operations.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Concatenate documents in the order given
    Merge {
        /// Input PDF files or glob patterns
        #[arg(value_name = "FILE")]
        inputs: Vec<String>,
    },

    /// Split a document by ranges, into single pages, or extract pages
    Split(SplitArgs),

    /// Set the rotation of pages
    Rotate(RotateArgs),

    /// Stamp text or an image on every page
    Watermark(WatermarkArgs),

    /// Build a document with one page per image
    Images(ImagesArgs),

    /// Rebuild a document in a new page order
    Reorder(ReorderArgs),

    /// Stamp page numbers
    PageNumbers(PageNumberArgs),

    /// Show page count, sizes and rotation of documents
    Info(InfoArgs),

    /// Run a transform request described as JSON
    Apply(ApplyArgs),
}

/// Arguments for `split`.
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("mode").required(true).args(["ranges", "each", "extract"])))]
pub struct SplitArgs {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: String,

    /// One output per range, in the order typed (e.g. "1-3,5,8-10")
    #[arg(short, long, value_name = "RANGES")]
    pub ranges: Option<PageRanges>,

    /// One output per page
    #[arg(short, long)]
    pub each: bool,

    /// A single output with the selected pages in document order
    #[arg(short = 'x', long, value_name = "RANGES")]
    pub extract: Option<PageRanges>,
}

/// Arguments for `rotate`.
#[derive(Args, Debug, Clone)]
pub struct RotateArgs {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Absolute angle: 0, 90, 180 or 270
    #[arg(short, long, value_name = "DEGREES", value_parser = parse_angle)]
    pub angle: RotationAngle,

    /// Pages to rotate (default: all)
    #[arg(short, long, value_name = "RANGES")]
    pub pages: Option<PageRanges>,
}

/// Arguments for `watermark`.
#[derive(Args, Debug, Clone)]
pub struct WatermarkArgs {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Watermark text
    #[arg(short, long, value_name = "TEXT", default_value = "CONFIDENTIAL")]
    pub text: String,

    /// Use a PNG or JPEG image instead of text
    #[arg(short, long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Text size in points
    #[arg(long, value_name = "PT", default_value_t = 40.0)]
    pub font_size: f32,

    /// Counter-clockwise text rotation in degrees
    #[arg(long, value_name = "DEGREES", default_value_t = 45.0)]
    pub rotation: f32,

    /// Opacity in percent
    #[arg(long, value_name = "PERCENT", default_value_t = 30)]
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub opacity: u8,

    /// center, top-left, top-right, bottom-left or bottom-right
    #[arg(long, value_name = "ANCHOR", default_value = "center")]
    pub position: Anchor,
}

/// Arguments for `images`.
#[derive(Args, Debug, Clone)]
pub struct ImagesArgs {
    /// Input PNG or JPEG files or glob patterns
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Fixed page size: a4, letter, legal or WIDTHxHEIGHT in points
    ///
    /// Without it every page takes the image's pixel size.
    #[arg(long, value_name = "FORMAT")]
    pub page_size: Option<PageFormat>,

    /// Landscape pages (with --page-size)
    #[arg(long, requires = "page_size")]
    pub landscape: bool,

    /// Margin in points (with --page-size)
    #[arg(long, value_name = "PT", default_value_t = 20.0)]
    pub margin: f32,
}

/// Arguments for `reorder`.
#[derive(Args, Debug, Clone)]
pub struct ReorderArgs {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: String,

    /// New page order; pages may repeat or be left out (e.g. "3,1-2,2")
    #[arg(long, value_name = "PAGES", value_parser = parse_order)]
    pub order: PageOrder,
}

/// A page order expanded from a range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder(pub Vec<u32>);

/// Arguments for `page-numbers`.
#[derive(Args, Debug, Clone)]
pub struct PageNumberArgs {
    /// Input PDF
    #[arg(value_name = "FILE")]
    pub input: String,

    /// bottom-center, bottom-left, bottom-right, top-center, top-left or top-right
    #[arg(long, value_name = "POSITION", default_value = "bottom-center")]
    pub position: NumberPosition,

    /// plain, page-n, n-of-total, roman-lower or roman-upper
    #[arg(long, value_name = "STYLE", default_value = "plain")]
    pub style: NumberStyle,

    /// Number on the first numbered page
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub start_at: u32,

    /// Text size in points
    #[arg(long, value_name = "PT", default_value_t = 12.0)]
    pub font_size: f32,

    /// Distance from the page edge in millimetres
    #[arg(long, value_name = "MM", default_value_t = 15.0)]
    pub margin: f32,

    /// Leave the first page unnumbered
    #[arg(long)]
    pub skip_first: bool,
}

/// Arguments for `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Input PDF files or glob patterns
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `apply`.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// JSON file holding the request, e.g. {"operation": "merge"}
    #[arg(short, long, value_name = "FILE")]
    pub request: PathBuf,

    /// Input files or glob patterns
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,
}

fn parse_angle(s: &str) -> std::result::Result<RotationAngle, String> {
    let degrees: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid rotation degrees: {s}"))?;
    RotationAngle::try_from(degrees)
}

/// Expand a range expression in typed order, keeping repeats.
fn parse_order(s: &str) -> std::result::Result<PageOrder, ParseError> {
    let ranges = PageRanges::from_str(s)?;
    Ok(PageOrder(
        ranges
            .spans()
            .iter()
            .flat_map(|span| span.start..=span.end)
            .collect(),
    ))
}

impl Command {
    /// Input arguments as typed (paths or glob patterns).
    pub fn inputs(&self) -> Vec<String> {
        match self {
            Self::Merge { inputs } => inputs.clone(),
            Self::Images(args) => args.inputs.clone(),
            Self::Info(args) => args.inputs.clone(),
            Self::Apply(args) => args.inputs.clone(),
            Self::Split(args) => vec![args.input.clone()],
            Self::Rotate(args) => vec![args.input.clone()],
            Self::Watermark(args) => vec![args.input.clone()],
            Self::Reorder(args) => vec![args.input.clone()],
            Self::PageNumbers(args) => vec![args.input.clone()],
        }
    }

    /// Image file a watermark reads, if any.
    pub fn watermark_image(&self) -> Option<&Path> {
        match self {
            Self::Watermark(args) => args.image.as_deref(),
            _ => None,
        }
    }

    /// Build the transform request.
    ///
    /// `watermark_image` carries the bytes of [`Command::watermark_image`].
    ///
    /// # Errors
    ///
    /// Returns an error for `info` and `apply`, which carry no parameters.
    pub fn to_request(&self, watermark_image: Option<Vec<u8>>) -> Result<TransformRequest> {
        let request = match self {
            Self::Merge { .. } => TransformRequest::Merge,
            Self::Split(args) => {
                let mode = match (&args.ranges, &args.extract) {
                    (Some(ranges), _) => SplitMode::Ranges(ranges.clone()),
                    (None, Some(ranges)) => SplitMode::Extract(ranges.clone()),
                    (None, None) => SplitMode::AllIndividually,
                };
                TransformRequest::Split { mode }
            }
            Self::Rotate(args) => TransformRequest::Rotate {
                angle: args.angle,
                scope: match &args.pages {
                    Some(ranges) => RotateScope::Pages(ranges.clone()),
                    None => RotateScope::AllPages,
                },
            },
            Self::Watermark(args) => {
                let content = match watermark_image {
                    Some(data) => WatermarkContent::Image { data },
                    None if args.image.is_some() => {
                        return Err(PdfShapeError::invalid_request(
                            "Watermark image was not loaded",
                        ));
                    }
                    None => WatermarkContent::Text {
                        text: args.text.clone(),
                        font_size: args.font_size,
                        rotation: args.rotation,
                    },
                };
                TransformRequest::Watermark(WatermarkOptions {
                    content,
                    opacity: args.opacity,
                    anchor: args.position,
                })
            }
            Self::Images(args) => TransformRequest::ImagesToDocument {
                sizing: match args.page_size {
                    Some(format) => PageSizing::FixedPageSize {
                        format,
                        orientation: if args.landscape {
                            Orientation::Landscape
                        } else {
                            Orientation::Portrait
                        },
                        margin: args.margin,
                    },
                    None => PageSizing::FitToImage,
                },
            },
            Self::Reorder(args) => TransformRequest::Reorder {
                order: args.order.0.clone(),
            },
            Self::PageNumbers(args) => TransformRequest::PageNumbers(PageNumberOptions {
                position: args.position,
                style: args.style,
                start_at: args.start_at,
                font_size: args.font_size,
                margin_mm: args.margin,
                skip_first: args.skip_first,
            }),
            Self::Info(_) | Self::Apply(_) => {
                return Err(PdfShapeError::invalid_request(
                    "This command does not take transform parameters",
                ));
            }
        };
        Ok(request)
    }
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is invalid
    /// - Configuration validation fails
    pub fn to_config(&self, inputs: Vec<PathBuf>, request: TransformRequest) -> Result<Config> {
        let global = &self.global;

        let compression = CompressionLevel::from_str(&global.compression)?;

        let overwrite_mode = if global.force {
            OverwriteMode::Force
        } else if global.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            global.title.clone(),
            global.author.clone(),
            global.subject.clone(),
            global.keywords.clone(),
        );

        let config = Config {
            inputs,
            output: global.output.clone(),
            dry_run: global.dry_run,
            verbose: global.verbose,
            quiet: global.quiet,
            overwrite_mode,
            compression,
            metadata,
            jobs: global.jobs,
            base_name: global.name.clone(),
            request,
        };

        config.validate().map_err(|e| {
            PdfShapeError::invalid_request(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
