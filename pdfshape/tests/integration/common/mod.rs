//! Fixtures shared by the integration tests.
//!
//! Documents and images are generated in memory so the tests carry no
//! binary files.

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use pdfshape::request::SourceFile;
use pdfshape::validation::{DocumentInfo, inspect};

/// A PDF whose pages have the given sizes, each labelled "Page N".
pub fn sample_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for (i, &(width, height)) in sizes.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![50.into(), 50.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => sizes.len() as i64,
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A Letter-sized document with `pages` pages.
pub fn letter_pdf(pages: usize) -> Vec<u8> {
    sample_pdf(&vec![(612, 792); pages])
}

/// A document input named `name`.
pub fn letter_source(name: &str, pages: usize) -> SourceFile {
    SourceFile::document(name, letter_pdf(pages))
}

/// An opaque PNG of the given pixel size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255])), ImageFormat::Png)
}

/// A PNG with a half-transparent body.
pub fn translucent_png(width: u32, height: u32) -> Vec<u8> {
    encode(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 128])), ImageFormat::Png)
}

fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

/// The "Page N" label on every page, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_and_decode_page_content(page_id).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .find_map(|op| match op.operands.first() {
                    Some(Object::String(text, StringFormat::Literal)) => {
                        let text = String::from_utf8_lossy(text).into_owned();
                        text.starts_with("Page ").then_some(text)
                    }
                    _ => None,
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Inspect produced bytes.
pub fn info(bytes: &[u8]) -> DocumentInfo {
    inspect("output.pdf", bytes).unwrap()
}

/// Effective rotation of every page.
pub fn rotations(bytes: &[u8]) -> Vec<u16> {
    info(bytes).pages.iter().map(|p| p.rotation).collect()
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Every literal `Tj` string on every page.
pub fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_and_decode_page_content(page_id).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, StringFormat::Literal)) => {
                        Some(String::from_utf8_lossy(text).into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}
