//! Text measurement and content-stream helpers.
//!
//! Index pages and page-number footers use the standard-14 Helvetica fonts,
//! so no font program is embedded; the AFM advance widths below are enough
//! to measure lines for centering, right-alignment, and leader-dot fills.

use lopdf::Object;
use lopdf::content::Operation;

/// A4 page width in points.
pub(crate) const A4_WIDTH: f32 = 595.28;

/// A4 page height in points.
pub(crate) const A4_HEIGHT: f32 = 841.89;

/// Baseline of the "Page no : N" footer.
pub(crate) const FOOTER_Y: f32 = 40.0;

/// Footer font size.
pub(crate) const FOOTER_SIZE: f32 = 10.0;

/// Resource name used for the footer font on merged content pages.
///
/// Deliberately unusual so it cannot collide with font names already
/// present in source-document resources.
pub(crate) const FOOTER_FONT_RES: &str = "bbF1";

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // !"#$%&'()*+,-./
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :;<=>?@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, // A-P
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // Q-Z
    278, 278, 278, 469, 556, 333, // [\]^_`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, // a-p
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // q-z
    334, 260, 334, 584, // {|}~
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667,
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611,
    611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Fallback advance for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold {
        &HELVETICA_BOLD_WIDTHS
    } else {
        &HELVETICA_WIDTHS
    };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Measure a string at the given font size, in points.
pub(crate) fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, bold))).sum();
    units as f32 * size / 1000.0
}

/// Operations drawing one line of text at a baseline position.
pub(crate) fn text_ops(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Operations drawing one line of text centered on the page width.
pub(crate) fn centered_text_ops(
    font: &str,
    size: f32,
    bold: bool,
    page_width: f32,
    y: f32,
    text: &str,
) -> Vec<Operation> {
    let x = (page_width - text_width(text, size, bold)) / 2.0;
    text_ops(font, size, x.max(0.0), y, text)
}

/// Operations drawing a centered "Page no : N" footer.
///
/// Wrapped in q/Q with an explicit fill color and text-render mode so the
/// footer is legible regardless of the graphics state left behind by the
/// page's own content.
pub(crate) fn footer_ops(font: &str, page_width: f32, page_number: i64) -> Vec<Operation> {
    let label = format!("Page no : {page_number}");
    let x = (page_width - text_width(&label, FOOTER_SIZE, false)) / 2.0;

    vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        Operation::new("Tr", vec![0.into()]),
        Operation::new("Tf", vec![font.into(), FOOTER_SIZE.into()]),
        Operation::new("Td", vec![x.max(0.0).into(), FOOTER_Y.into()]),
        Operation::new("Tj", vec![Object::string_literal(label.as_str())]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}
