//! pdfshape - Reshape PDF documents from the command line.

mod cli;
mod inputs;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Command, InfoArgs};
use pdfshape::config::{Config, OverwriteMode};
use pdfshape::error::PdfShapeError;
use pdfshape::io::{DeliverableWriter, SourceReader};
use pdfshape::ops::ExecutionContext;
use pdfshape::output::{
    OutputFormatter, create_formatter, display_outcome, display_read_statistics,
    display_validation_summary, display_write_statistics, render_document_info,
};
use pdfshape::package::package;
use pdfshape::request::ContentKind;
use pdfshape::validation::Validator;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flag.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pdfshape=debug"
    } else {
        "pdfshape=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfShapeError> {
    let patterns = cli.command.inputs();
    let all_inputs = inputs::collect_inputs(&patterns, cli.global.input_list.as_deref()).await?;
    debug!(inputs = all_inputs.len(), "collected inputs");

    if let Command::Info(args) = &cli.command {
        let formatter = OutputFormatter::new(cli.global.quiet, cli.global.verbose);
        return inspect(&all_inputs, args, &formatter).await;
    }

    let request = match &cli.command {
        Command::Apply(args) => inputs::read_request(&args.request).await?,
        command => {
            let image = match command.watermark_image() {
                Some(path) => {
                    let source = SourceReader::new(ContentKind::Image).read(path).await?;
                    Some(source.bytes)
                }
                None => None,
            };
            command.to_request(image)?
        }
    };
    let declared_by_extension = matches!(cli.command, Command::Apply(_));

    let config = cli.to_config(all_inputs, request)?;
    let formatter = create_formatter(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfshape::NAME, pdfshape::VERSION));
        formatter.blank_line();
    }

    formatter.info("Validating input files...");
    let validator = Validator::new();
    let summary = validator
        .validate_inputs(config.inputs(), config.input_kind())
        .await?;
    display_validation_summary(&formatter, &summary);

    let reader = SourceReader::new(config.input_kind());
    let (mut sources, read_stats) = reader
        .read_all(config.inputs(), config.effective_jobs())
        .await?;
    display_read_statistics(&formatter, &read_stats);

    if declared_by_extension {
        for (source, path) in sources.iter_mut().zip(config.inputs()) {
            source.kind = ContentKind::from_path(path);
        }
    }

    let validated = config.request.clone().validate(sources)?;
    let context = ExecutionContext::from(&config);
    let base_name = context.base_name_for(&validated);

    if config.dry_run {
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!(
            "  {} would run on {} input(s)",
            validated.request().name(),
            validated.sources().len()
        ));
        formatter.info("  Run without --dry-run to write the output");
        return Ok(());
    }

    formatter.info(&format!("Running {}...", validated.request().name()));
    let outcome = tokio::task::spawn_blocking(move || validated.execute(&context))
        .await
        .map_err(|e| PdfShapeError::other(format!("Transform task failed: {e}")))??;
    display_outcome(&formatter, &outcome);

    let unit = package(outcome.result, &base_name)?;
    let output_path = config.output_path(&unit.file_name);

    validator.validate_output(&config, &output_path).await?;
    handle_output_overwrite(&config, &output_path, &formatter)?;

    let write_stats = DeliverableWriter::new().write(&unit, &output_path).await?;
    display_write_statistics(&formatter, &write_stats);

    if formatter.is_verbose() {
        formatter.blank_line();
        formatter.section("Statistics");
        formatter.detail("Operation", config.request.name());
        formatter.detail("Inputs", &config.inputs().len().to_string());
        formatter.detail("Content type", unit.content_type.mime());
        if !config.metadata.is_empty() {
            formatter.detail("Metadata", "Set");
        }
    }

    Ok(())
}

/// Print facts about each input document.
async fn inspect(
    paths: &[PathBuf],
    args: &InfoArgs,
    formatter: &OutputFormatter,
) -> Result<(), PdfShapeError> {
    if paths.is_empty() {
        return Err(PdfShapeError::invalid_request("No input files specified"));
    }

    let validator = Validator::new();
    let mut infos = Vec::with_capacity(paths.len());
    for path in paths {
        infos.push(validator.inspect_file(path).await?);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&infos)
            .map_err(|e| PdfShapeError::other(format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    for info in &infos {
        print!("{}", render_document_info(info));
    }
    formatter.debug(&format!("Inspected {} file(s)", infos.len()));
    Ok(())
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    config: &Config,
    output: &Path,
    formatter: &OutputFormatter,
) -> Result<(), PdfShapeError> {
    if !output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfShapeError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            // In quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(PdfShapeError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfShapeError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(PdfShapeError::Cancelled)
            }
        }
    }
}
