//! Page stamping with a company seal or signature image.
//!
//! The image is decoded once per compilation and shared by every page as a
//! single image XObject. PNGs are re-encoded as flate-compressed RGB (with a
//! soft mask when the source has meaningful alpha); JPEGs pass through
//! untouched as DCTDecode streams. The stamp is drawn into a fixed 100-unit
//! bounding box, aspect ratio preserved, inset 20 units from the anchored
//! page edges.

use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::Context;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::Operation;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::config::{StampOptions, StampPosition};
use crate::error::{BidBindError, Result};

use super::pages;

/// Side length of the stamp's bounding box, in PDF units.
const STAMP_TARGET: f32 = 100.0;

/// Inset from the anchored page edges.
const STAMP_MARGIN: f32 = 20.0;

/// Resource names registered on stamped pages. Prefixed to stay clear of
/// names the source documents already use.
const STAMP_IMAGE_RES: &str = "bbIm0";
const STAMP_GS_RES: &str = "bbGs0";

struct PreparedImage {
    width: u32,
    height: u32,
    xobject: Stream,
    smask: Option<Stream>,
}

/// Applies one prepared stamp image to documents.
pub(crate) struct Stamper {
    position: StampPosition,
    opacity: f32,
    image: PreparedImage,
}

impl Stamper {
    /// Decode and encode the stamp image. Any failure here is fatal to the
    /// whole compilation; a misconfigured stamp must not produce an
    /// unstamped submission.
    pub(crate) fn prepare(options: &StampOptions) -> Result<Self> {
        let image = prepare_image(&options.image_path).map_err(|e| {
            BidBindError::stamp_image(options.image_path.clone(), format!("{e:#}"))
        })?;
        debug!(
            path = %options.image_path.display(),
            width = image.width,
            height = image.height,
            "stamp image prepared"
        );
        Ok(Self {
            position: options.position,
            opacity: options.opacity,
            image,
        })
    }

    /// Stamp every page of `doc`.
    pub(crate) fn apply(&self, doc: &mut Document) -> Result<()> {
        let image_id = self.insert_image(doc);
        let gs_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "CA" => self.opacity,
            "ca" => self.opacity,
        });

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for page_id in page_ids {
            let (page_w, page_h) = pages::media_box(doc, page_id);
            let (x, y, w, h) = stamp_rect(
                self.image.width,
                self.image.height,
                page_w,
                page_h,
                self.position,
            );

            pages::add_page_resource(
                doc,
                page_id,
                "XObject",
                STAMP_IMAGE_RES,
                Object::Reference(image_id),
            )?;
            pages::add_page_resource(
                doc,
                page_id,
                "ExtGState",
                STAMP_GS_RES,
                Object::Reference(gs_id),
            )?;

            let ops = vec![
                Operation::new("q", vec![]),
                Operation::new("gs", vec![STAMP_GS_RES.into()]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
                ),
                Operation::new("Do", vec![STAMP_IMAGE_RES.into()]),
                Operation::new("Q", vec![]),
            ];
            pages::append_page_content(doc, page_id, ops)?;
        }
        Ok(())
    }

    fn insert_image(&self, doc: &mut Document) -> ObjectId {
        let mut xobject = self.image.xobject.clone();
        if let Some(smask) = &self.image.smask {
            let smask_id = doc.add_object(Object::Stream(smask.clone()));
            xobject.dict.set("SMask", Object::Reference(smask_id));
        }
        doc.add_object(Object::Stream(xobject))
    }
}

/// Placement and size of the stamp on one page: scaled to fit a
/// [`STAMP_TARGET`]-unit box, anchored with a [`STAMP_MARGIN`] inset.
fn stamp_rect(
    img_w: u32,
    img_h: u32,
    page_w: f32,
    page_h: f32,
    position: StampPosition,
) -> (f32, f32, f32, f32) {
    let scale = (STAMP_TARGET / img_w as f32).min(STAMP_TARGET / img_h as f32);
    let w = img_w as f32 * scale;
    let h = img_h as f32 * scale;

    let (x, y) = match position {
        StampPosition::BottomRight => (page_w - STAMP_MARGIN - w, STAMP_MARGIN),
        StampPosition::BottomLeft => (STAMP_MARGIN, STAMP_MARGIN),
        StampPosition::TopRight => (page_w - STAMP_MARGIN - w, page_h - STAMP_MARGIN - h),
        StampPosition::TopLeft => (STAMP_MARGIN, page_h - STAMP_MARGIN - h),
        StampPosition::Center => ((page_w - w) / 2.0, (page_h - h) / 2.0),
    };
    (x, y, w, h)
}

fn prepare_image(path: &Path) -> anyhow::Result<PreparedImage> {
    let data = std::fs::read(path)
        .with_context(|| format!("cannot read stamp image {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => prepare_png(&data),
        Some("jpg") | Some("jpeg") => prepare_jpeg(&data),
        // Unknown extension: sniff by attempting both decoders.
        _ => prepare_png(&data).or_else(|_| prepare_jpeg(&data)),
    }
}

fn prepare_png(data: &[u8]) -> anyhow::Result<PreparedImage> {
    let decoded = image::load(Cursor::new(data), image::ImageFormat::Png)
        .context("PNG decoding failed")?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity((width as usize) * (height as usize) * 3);
    let mut alpha = Vec::with_capacity((width as usize) * (height as usize));
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
        has_alpha |= pixel.0[3] != 255;
    }

    let xobject = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&rgb)?,
    );

    let smask = if has_alpha {
        Some(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(&alpha)?,
        ))
    } else {
        None
    };

    Ok(PreparedImage {
        width,
        height,
        xobject,
        smask,
    })
}

/// JPEG data goes straight into the PDF; DCTDecode is the JPEG codec.
///
/// Because the encoded bytes pass through untouched, the color space must
/// describe the encoded stream, not the decoded pixels: grayscale JPEGs are
/// one-component and get DeviceGray, CMYK is rejected rather than mislabeled.
fn prepare_jpeg(data: &[u8]) -> anyhow::Result<PreparedImage> {
    let decoded = image::load(Cursor::new(data), image::ImageFormat::Jpeg)
        .context("JPEG decoding failed")?;
    let (width, height) = (decoded.width(), decoded.height());

    let components = jpeg_component_count(data)
        .unwrap_or_else(|| if decoded.color().has_color() { 3 } else { 1 });
    let color_space = match components {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        other => anyhow::bail!("unsupported JPEG with {other} components"),
    };

    let xobject = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        data.to_vec(),
    );

    Ok(PreparedImage {
        width,
        height,
        xobject,
        smask: None,
    })
}

/// Component count from the first frame header (SOF marker) of a JPEG.
fn jpeg_component_count(data: &[u8]) -> Option<u8> {
    let mut i = 2; // past SOI
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        // RST0-RST7 and TEM carry no length field.
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            i += 2;
            continue;
        }
        // SOF0-SOF15, excluding DHT, JPG and DAC which share the range.
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(i + 9).copied();
        }
        let length = usize::from(data[i + 2]) << 8 | usize::from(data[i + 3]);
        i += 2 + length;
    }
    None
}

fn deflate(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).context("flate encoding failed")?;
    encoder.finish().context("flate encoding failed")
}
