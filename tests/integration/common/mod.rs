//! Shared fixtures and helpers for integration tests.
//!
//! Fixtures are generated on the fly with lopdf and the image crate, so the
//! tests carry no binary files.

use image::{Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bidbind::config::{CompilationOptions, DocumentInfo, IndexOptions};

/// Write an n-page PDF whose page k draws the marker text "<marker> page k".
pub fn make_pdf(dir: &TempDir, name: &str, pages: usize, marker: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in 1..=pages {
        let text = format!("{marker} page {page}");
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(&path).unwrap();
    path
}

/// Write a square opaque PNG usable as a stamp image.
pub fn make_png(dir: &TempDir, name: &str, size: u32) -> PathBuf {
    let path = dir.path().join(name);
    let img = RgbaImage::from_pixel(size, size, Rgba([160, 30, 30, 255]));
    img.save(&path).unwrap();
    path
}

pub fn doc_info(id: &str, name: &str, path: Option<PathBuf>, order: i32) -> DocumentInfo {
    DocumentInfo {
        id: id.to_string(),
        document_name: name.to_string(),
        file_path: path,
        order,
    }
}

/// A minimal valid compilation request; tests adjust fields as needed.
pub fn base_options(
    documents: Vec<DocumentInfo>,
    output_path: PathBuf,
    include_index: bool,
) -> CompilationOptions {
    CompilationOptions {
        response_name: "Technical Response".into(),
        response_type: "technical".into(),
        remarks: None,
        documents,
        stamp_options: None,
        index_options: IndexOptions {
            include_index,
            start_from: 1,
            title: None,
        },
        bid_number: Some("BID-2026-042".into()),
        output_path,
    }
}

pub fn load_output(path: &Path) -> Document {
    Document::load(path).expect("output PDF should load")
}

/// Decode every content stream of one page (1-based) into operations.
pub fn page_operations(doc: &Document, page_number: u32) -> Vec<Operation> {
    let page_id = doc.get_pages()[&page_number];
    let mut data = Vec::new();
    for content_id in doc.get_page_contents(page_id) {
        if let Ok(stream) = doc.get_object(content_id).and_then(Object::as_stream) {
            let bytes = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            data.extend(bytes);
            data.push(b'\n');
        }
    }
    Content::decode(&data).expect("page content should decode").operations
}

/// All Tj string operands drawn on one page, in drawing order.
pub fn page_strings(doc: &Document, page_number: u32) -> Vec<String> {
    page_operations(doc, page_number)
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// The footer string drawn on one page, if any.
pub fn page_footer(doc: &Document, page_number: u32) -> Option<String> {
    page_strings(doc, page_number)
        .into_iter()
        .find(|s| s.starts_with("Page no : "))
}

/// Operands of the `cm` matrix in effect when the named XObject is invoked
/// on one page.
pub fn xobject_matrix(doc: &Document, page_number: u32, name: &str) -> Option<[f32; 6]> {
    let mut last_cm: Option<[f32; 6]> = None;
    for op in page_operations(doc, page_number) {
        match op.operator.as_str() {
            "cm" => {
                let values: Vec<f32> = op
                    .operands
                    .iter()
                    .filter_map(|o| o.as_float().ok())
                    .collect();
                if values.len() == 6 {
                    last_cm = Some([
                        values[0], values[1], values[2], values[3], values[4], values[5],
                    ]);
                }
            }
            "Do" => {
                if let Some(Object::Name(n)) = op.operands.first() {
                    if n == name.as_bytes() {
                        return last_cm;
                    }
                }
            }
            _ => {}
        }
    }
    None
}
