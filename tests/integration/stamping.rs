//! Stamp placement, opacity, and the index-pages-are-never-stamped rule.

use bidbind::config::{StampOptions, StampPosition};
use bidbind::{BidBindError, Compiler};
use lopdf::Object;
use tempfile::TempDir;

use crate::common::{base_options, doc_info, load_output, make_pdf, make_png, xobject_matrix};

const STAMP_RES: &str = "bbIm0";

fn stamp(path: std::path::PathBuf, position: StampPosition) -> StampOptions {
    StampOptions {
        image_path: path,
        position,
        opacity: 0.8,
        scale: None,
    }
}

#[tokio::test]
async fn test_stamp_on_content_pages_but_not_index() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 2, "alpha");
    let seal = make_png(&temp_dir, "seal.png", 200);
    let output_path = temp_dir.path().join("out.pdf");

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        true,
    );
    options.stamp_options = Some(stamp(seal, StampPosition::BottomRight));

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    assert!(xobject_matrix(&doc, 1, STAMP_RES).is_none(), "index page was stamped");
    assert!(xobject_matrix(&doc, 2, STAMP_RES).is_some());
    assert!(xobject_matrix(&doc, 3, STAMP_RES).is_some());
}

#[tokio::test]
async fn test_stamp_geometry_bottom_right() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let seal = make_png(&temp_dir, "seal.png", 200);
    let output_path = temp_dir.path().join("out.pdf");

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    options.stamp_options = Some(stamp(seal, StampPosition::BottomRight));

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    // Square 200x200 image in a 100-unit box on a 595x842 page, inset 20.
    let [w, _, _, h, x, y] = xobject_matrix(&doc, 1, STAMP_RES).unwrap();
    assert!((w - 100.0).abs() < 0.01);
    assert!((h - 100.0).abs() < 0.01);
    assert!((x - 475.0).abs() < 0.01, "x = {x}");
    assert!((y - 20.0).abs() < 0.01, "y = {y}");
}

#[tokio::test]
async fn test_stamp_geometry_center() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let seal = make_png(&temp_dir, "seal.png", 200);
    let output_path = temp_dir.path().join("out.pdf");

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    options.stamp_options = Some(stamp(seal, StampPosition::Center));

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    let [_, _, _, _, x, y] = xobject_matrix(&doc, 1, STAMP_RES).unwrap();
    assert!((x - (595.0 - 100.0) / 2.0).abs() < 0.01, "x = {x}");
    assert!((y - (842.0 - 100.0) / 2.0).abs() < 0.01, "y = {y}");
}

#[tokio::test]
async fn test_stamp_opacity_in_extgstate() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let seal = make_png(&temp_dir, "seal.png", 200);
    let output_path = temp_dir.path().join("out.pdf");

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    let mut stamp_options = stamp(seal, StampPosition::BottomRight);
    stamp_options.opacity = 0.5;
    options.stamp_options = Some(stamp_options);

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    let page_id = doc.get_pages()[&1];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let gstates = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
    let gs = match gstates.get(b"bbGs0").unwrap() {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected ExtGState entry: {other:?}"),
    };
    let ca = gs.get(b"ca").unwrap().as_float().unwrap();
    assert!((ca - 0.5).abs() < 0.001);
}

#[tokio::test]
async fn test_missing_stamp_image_fails_whole_compilation() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let output_path = temp_dir.path().join("out.pdf");

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    options.stamp_options = Some(stamp(
        temp_dir.path().join("no-such-seal.png"),
        StampPosition::BottomRight,
    ));

    let result = Compiler::new().compile(&options).await;
    assert!(matches!(result, Err(BidBindError::StampImage { .. })));
    assert!(!output_path.exists(), "failed compilation wrote output");
}

#[tokio::test]
async fn test_jpeg_stamp_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let output_path = temp_dir.path().join("out.pdf");

    let seal = temp_dir.path().join("seal.jpg");
    let img = image::RgbImage::from_pixel(120, 80, image::Rgb([10, 10, 120]));
    img.save(&seal).unwrap();

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    options.stamp_options = Some(stamp(seal, StampPosition::TopLeft));

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    // 120x80 scales by 100/120: 100 wide, 66.67 tall.
    let [w, _, _, h, _, _] = xobject_matrix(&doc, 1, STAMP_RES).unwrap();
    assert!((w - 100.0).abs() < 0.01);
    assert!((h - 66.6667).abs() < 0.01);
}

#[tokio::test]
async fn test_grayscale_jpeg_stamp_keeps_gray_colorspace() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_pdf(&temp_dir, "a.pdf", 1, "alpha");
    let output_path = temp_dir.path().join("out.pdf");

    // A scanned-signature seal is typically a grayscale JPEG; its
    // one-component stream must not be labeled as an RGB image.
    let seal = temp_dir.path().join("seal.jpg");
    let img = image::GrayImage::from_pixel(64, 64, image::Luma([60]));
    img.save(&seal).unwrap();

    let mut options = base_options(
        vec![doc_info("a", "Alpha", Some(a), 1)],
        output_path.clone(),
        false,
    );
    options.stamp_options = Some(stamp(seal, StampPosition::BottomRight));

    Compiler::new().compile(&options).await.unwrap();
    let doc = load_output(&output_path);

    let page_id = doc.get_pages()[&1];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let image_id = match xobjects.get(STAMP_RES.as_bytes()).unwrap() {
        Object::Reference(id) => *id,
        other => panic!("unexpected XObject entry: {other:?}"),
    };
    let dict = &doc.get_object(image_id).unwrap().as_stream().unwrap().dict;
    assert_eq!(
        dict.get(b"ColorSpace").unwrap(),
        &Object::Name(b"DeviceGray".to_vec())
    );
    assert_eq!(
        dict.get(b"Filter").unwrap(),
        &Object::Name(b"DCTDecode".to_vec())
    );
}
