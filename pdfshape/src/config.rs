//! Run configuration for pdfshape.
//!
//! This module turns CLI arguments into a validated, normalized configuration
//! that drives one transform run. It handles:
//! - Validation of argument combinations
//! - Application of defaults
//! - Where the deliverable ends up on disk

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::PdfShapeError;
use crate::request::{ContentKind, TransformRequest};

/// Structural compression applied when documents are saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Write streams as they are.
    None,
    /// Flate-compress uncompressed streams.
    #[default]
    Standard,
    /// Compress, drop unreachable objects and renumber.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfShapeError;

    /// Parse `none`, `standard` or `maximum`, ignoring case.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfShapeError::invalid_request(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Document information written to every output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    ///
    /// Blank values are treated as unset.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let trimmed = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: trimmed(title),
            author: trimmed(author),
            subject: trimmed(subject),
            keywords: trimmed(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for one transform run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, in the order the operation consumes them.
    pub inputs: Vec<PathBuf>,

    /// Where to write the deliverable. `None` writes the suggested file
    /// name into the current directory.
    pub output: Option<PathBuf>,

    /// Validate and report without writing anything.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for outputs.
    pub compression: CompressionLevel,

    /// Metadata to set on every output document.
    pub metadata: Metadata,

    /// Number of inputs read concurrently (None = auto-detect).
    pub jobs: Option<usize>,

    /// Overrides the base of suggested output names.
    pub base_name: Option<String>,

    /// The operation to run.
    pub request: TransformRequest,
}

impl Config {
    /// A configuration with defaults for everything but inputs and request.
    pub fn new(inputs: Vec<PathBuf>, request: TransformRequest) -> Self {
        Self {
            inputs,
            output: None,
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            jobs: None,
            base_name: None,
            request,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Content kind the inputs are read as.
    pub fn input_kind(&self) -> ContentKind {
        self.request.input_kind()
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies between flags. Operation
    /// parameters are checked later by [`TransformRequest::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The base name contains a path separator
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if let Some(name) = &self.base_name
            && (name.trim().is_empty() || name.contains(['/', '\\']))
        {
            bail!("Invalid output name: '{name}'");
        }

        if let Some(output) = &self.output
            && self.inputs.iter().any(|input| input == output)
        {
            bail!(
                "Output file cannot be the same as an input file: {}",
                output.display()
            );
        }

        Ok(())
    }

    /// Where a deliverable with the given suggested name is written.
    ///
    /// An output that names an existing directory receives the suggested
    /// name inside it.
    pub fn output_path(&self, suggested: &str) -> PathBuf {
        match &self.output {
            Some(dir) if dir.is_dir() => dir.join(suggested),
            Some(path) => path.clone(),
            None => Path::new(".").join(suggested),
        }
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
