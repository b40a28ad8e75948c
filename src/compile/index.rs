//! Index (table of contents) page generation.
//!
//! The builder produces a standalone A4 document, one line per manifest
//! document, with leader dots filling the gap between the truncated label
//! and the right-aligned page number. Long manifests overflow onto further
//! pages. Index pages carry their own "Page no : N" footer so the compiler
//! never re-numbers them; every index page prints the configured start page,
//! including overflow pages.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::config::IndexOptions;
use crate::error::{BidBindError, Result};

use super::pagination::IndexEntry;
use super::text::{A4_HEIGHT, A4_WIDTH, footer_ops, text_ops, text_width};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 14.0;
const ENTRY_SIZE: f32 = 11.0;

const LEFT_MARGIN: f32 = 50.0;
const RIGHT_MARGIN: f32 = 50.0;
const TOP_START: f32 = A4_HEIGHT - 60.0;
const HEADING_GAP: f32 = 30.0;
const LINE_HEIGHT: f32 = 20.0;
const BOTTOM_LIMIT: f32 = 70.0;

/// Gap between a label and its leader dots, and between the dots and the
/// page number.
const DOT_GAP: f32 = 4.0;

/// Labels longer than this are cut and suffixed with "...".
const MAX_LABEL_CHARS: usize = 60;

/// The fixed placeholder line above the entries has no page number, just a
/// decorative dot run.
const INTRO_LABEL: &str = "Introduction";
const INTRO_DOT_COUNT: usize = 80;

/// Builds the leading index pages of a compiled submission.
pub(crate) struct IndexBuilder<'a> {
    start_from: i64,
    bid_number: Option<&'a str>,
}

impl<'a> IndexBuilder<'a> {
    pub(crate) fn new(options: &IndexOptions, bid_number: Option<&'a str>) -> Self {
        Self {
            start_from: options.start_from,
            bid_number,
        }
    }

    /// Render the index as a self-contained document.
    pub(crate) fn build(&self, entries: &[IndexEntry]) -> Result<Document> {
        let mut pages: Vec<Vec<Operation>> = Vec::new();
        let mut ops: Vec<Operation> = Vec::new();
        let mut y = TOP_START;

        if let Some(bid) = self.bid_number {
            ops.extend(centered(BOLD_FONT, TITLE_SIZE, y, bid));
            y -= HEADING_GAP;
        }
        ops.extend(centered(BOLD_FONT, HEADING_SIZE, y, "INDEX"));
        y -= HEADING_GAP;

        ops.extend(text_ops(REGULAR_FONT, ENTRY_SIZE, LEFT_MARGIN, y, INTRO_LABEL));
        let intro_x = LEFT_MARGIN + text_width(INTRO_LABEL, ENTRY_SIZE, false) + DOT_GAP;
        ops.extend(text_ops(
            REGULAR_FONT,
            ENTRY_SIZE,
            intro_x,
            y,
            &".".repeat(INTRO_DOT_COUNT),
        ));
        y -= LINE_HEIGHT;

        for entry in entries {
            if y < BOTTOM_LIMIT {
                pages.push(std::mem::take(&mut ops));
                y = TOP_START;
            }
            ops.extend(entry_line_ops(entry, y));
            y -= LINE_HEIGHT;
        }
        pages.push(ops);

        for page_ops in &mut pages {
            page_ops.extend(footer_ops(REGULAR_FONT, A4_WIDTH, self.start_from));
        }

        assemble(pages)
    }
}

fn centered(font: &str, size: f32, y: f32, line: &str) -> Vec<Operation> {
    super::text::centered_text_ops(font, size, true, A4_WIDTH, y, line)
}

/// One index line: truncated label, computed leader-dot run, right-aligned
/// page number.
fn entry_line_ops(entry: &IndexEntry, y: f32) -> Vec<Operation> {
    let label = truncate_label(&entry.label);
    let number = entry.first_page.to_string();

    let mut ops = text_ops(REGULAR_FONT, ENTRY_SIZE, LEFT_MARGIN, y, &label);

    let number_x = A4_WIDTH - RIGHT_MARGIN - text_width(&number, ENTRY_SIZE, false);
    let dots_x = LEFT_MARGIN + text_width(&label, ENTRY_SIZE, false) + DOT_GAP;
    let dot_width = text_width(".", ENTRY_SIZE, false);
    let gap = number_x - DOT_GAP - dots_x;
    let dot_count = if gap > 0.0 {
        (gap / dot_width).floor() as usize
    } else {
        0
    };
    if dot_count > 0 {
        ops.extend(text_ops(
            REGULAR_FONT,
            ENTRY_SIZE,
            dots_x,
            y,
            &".".repeat(dot_count),
        ));
    }

    ops.extend(text_ops(REGULAR_FONT, ENTRY_SIZE, number_x, y, &number));
    ops
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(MAX_LABEL_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Assemble rendered page operations into a document with the two shared
/// Helvetica font resources.
fn assemble(pages: Vec<Vec<Operation>>) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut kids: Vec<Object> = Vec::new();
    let page_count = pages.len() as i64;
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| BidBindError::assembly_failed(format!("Index encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    REGULAR_FONT => Object::Reference(regular_id),
                    BOLD_FONT => Object::Reference(bold_id),
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}
