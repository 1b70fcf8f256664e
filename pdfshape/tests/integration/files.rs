//! Reading inputs from disk and writing deliverables.

use std::path::PathBuf;
use tempfile::TempDir;

use pdfshape::PdfShapeError;
use pdfshape::config::{Config, OverwriteMode};
use pdfshape::io::{DeliverableWriter, SourceReader, read_sources};
use pdfshape::ops::{ExecutionContext, transform};
use pdfshape::package::package;
use pdfshape::request::{ContentKind, SplitMode, TransformRequest};
use pdfshape::validation::Validator;

use crate::common::{letter_pdf, png, write_fixture};

#[tokio::test]
async fn test_merge_files_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_fixture(temp_dir.path(), "a.pdf", &letter_pdf(2)),
        write_fixture(temp_dir.path(), "b.pdf", &letter_pdf(3)),
    ];

    let sources = read_sources(&inputs, ContentKind::Document).await.unwrap();
    assert_eq!(sources[0].name, "a.pdf");

    let outcome = transform(TransformRequest::Merge, sources, &ExecutionContext::default()).unwrap();
    let unit = package(outcome.result, "merged").unwrap();

    let output = temp_dir.path().join(&unit.file_name);
    let stats = DeliverableWriter::new().write(&unit, &output).await.unwrap();
    assert_eq!(stats.file_size, unit.bytes.len() as u64);

    let merged = Validator::new().inspect_file(&output).await.unwrap();
    assert_eq!(merged.name, "merged.pdf");
    assert_eq!(merged.page_count, 5);
}

#[tokio::test]
async fn test_split_archive_written_next_to_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_fixture(temp_dir.path(), "report.pdf", &letter_pdf(3));

    let mut config = Config::new(
        vec![input],
        TransformRequest::Split {
            mode: SplitMode::AllIndividually,
        },
    );
    config.output = Some(temp_dir.path().to_path_buf());

    let (sources, stats) = SourceReader::new(config.input_kind())
        .read_all(config.inputs(), config.effective_jobs())
        .await
        .unwrap();
    assert_eq!(stats.file_count, 1);

    let validated = config.request.clone().validate(sources).unwrap();
    let context = ExecutionContext::from(&config);
    let base_name = context.base_name_for(&validated);
    let outcome = validated.execute(&context).unwrap();

    let unit = package(outcome.result, &base_name).unwrap();
    let output = config.output_path(&unit.file_name);
    assert_eq!(output, temp_dir.path().join("report.zip"));

    DeliverableWriter::new().write(&unit, &output).await.unwrap();
    assert!(output.exists());
}

#[tokio::test]
async fn test_images_read_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (1..=3)
        .map(|i| write_fixture(temp_dir.path(), &format!("scan{i}.png"), &png(10 * i, 10)))
        .collect();

    let sources = read_sources(&inputs, ContentKind::Image).await.unwrap();
    let outcome = transform(
        TransformRequest::ImagesToDocument {
            sizing: Default::default(),
        },
        sources,
        &ExecutionContext::default(),
    )
    .unwrap();

    let info = pdfshape::validation::inspect("images.pdf", &outcome.result.documents()[0].bytes)
        .unwrap();
    let widths: Vec<_> = info.pages.iter().map(|p| p.width).collect();
    assert_eq!(widths, [10.0, 20.0, 30.0]);
}

#[tokio::test]
async fn test_empty_image_on_disk_is_skipped_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_fixture(temp_dir.path(), "first.png", &png(20, 10)),
        write_fixture(temp_dir.path(), "blank.png", b""),
        write_fixture(temp_dir.path(), "last.png", &png(40, 10)),
    ];
    let config = Config::new(
        inputs,
        TransformRequest::ImagesToDocument {
            sizing: Default::default(),
        },
    );

    let summary = Validator::new()
        .validate_inputs(config.inputs(), config.input_kind())
        .await
        .unwrap();
    assert_eq!(summary.files_validated(), 3);

    let (sources, _) = SourceReader::new(config.input_kind())
        .read_all(config.inputs(), config.effective_jobs())
        .await
        .unwrap();
    let validated = config.request.clone().validate(sources).unwrap();
    let outcome = validated.execute(&ExecutionContext::from(&config)).unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].index, 1);
    assert_eq!(outcome.warnings[0].name, "blank.png");

    let info = pdfshape::validation::inspect("images.pdf", &outcome.result.documents()[0].bytes)
        .unwrap();
    let widths: Vec<_> = info.pages.iter().map(|p| p.width).collect();
    assert_eq!(widths, [20.0, 40.0]);
}

#[tokio::test]
async fn test_empty_document_on_disk_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_fixture(temp_dir.path(), "a.pdf", &letter_pdf(1)),
        write_fixture(temp_dir.path(), "empty.pdf", b""),
    ];

    let err = Validator::new()
        .validate_inputs(&inputs, ContentKind::Document)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfShapeError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_missing_input_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![temp_dir.path().join("absent.pdf")];

    let err = read_sources(&inputs, ContentKind::Document).await.unwrap_err();
    assert!(matches!(err, PdfShapeError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_existing_output_with_no_clobber() {
    let temp_dir = TempDir::new().unwrap();
    let existing = write_fixture(temp_dir.path(), "merged.pdf", b"old");

    let mut config = Config::new(
        vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        TransformRequest::Merge,
    );
    config.overwrite_mode = OverwriteMode::NoClobber;

    let err = Validator::new()
        .validate_output(&config, &existing)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfShapeError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(std::fs::read(&existing).unwrap(), b"old");
}
