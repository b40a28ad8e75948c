//! Page-tree surgery shared by the compiler and the submission merger.
//!
//! Imported pages are re-parented under a single output page tree. Because
//! the source document's own page tree is discarded, attributes a page
//! inherits from its ancestors (MediaBox, Resources, CropBox, Rotate) are
//! materialized onto the page dictionary before the move.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{BidBindError, Result};

use super::text::{A4_HEIGHT, A4_WIDTH};

/// Page attributes that may live on an ancestor Pages node.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Move every page of `source` into `output`, re-parented under
/// `pages_root`. Returns the imported page ids in page order.
pub(crate) fn import_pages(
    output: &mut Document,
    mut source: Document,
    pages_root: ObjectId,
) -> Vec<ObjectId> {
    materialize_inherited(&mut source);

    source.renumber_objects_with(output.max_id + 1);
    output.max_id = source.max_id;

    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

    // The source catalog and page-tree nodes are not carried over; pages
    // hang off the output tree instead.
    for (id, object) in source.objects {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" | b"Pages" | b"Outlines" | b"Outline" => {}
            _ => {
                output.objects.insert(id, object);
            }
        }
    }

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(page)) = output.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_root));
        }
    }

    page_ids
}

/// Copy inheritable attributes from ancestor Pages nodes down onto each
/// page dictionary that lacks them.
fn materialize_inherited(source: &mut Document) {
    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

    for page_id in page_ids {
        let mut resolved: Vec<(&[u8], Object)> = Vec::new();

        for key in INHERITABLE_KEYS {
            let on_page = source
                .get_object(page_id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .is_some_and(|d| d.has(key));
            if on_page {
                continue;
            }
            if let Some(value) = lookup_ancestor(source, page_id, key) {
                resolved.push((key, value));
            }
        }

        if resolved.is_empty() {
            continue;
        }
        if let Ok(Object::Dictionary(page)) = source.get_object_mut(page_id) {
            for (key, value) in resolved {
                page.set(key, value);
            }
        }
    }
}

/// Walk the Parent chain looking for `key`. Depth-limited so a cyclic
/// Parent reference in a malformed file cannot loop forever.
fn lookup_ancestor(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    for _ in 0..16 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = doc.get_object(parent_id).ok()?.as_dict().ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        current = parent_id;
    }
    None
}

/// Register a named resource in one category (Font, XObject, ExtGState) of
/// a page's resource dictionary, cloning indirect dictionaries inline so
/// the addition never leaks into pages that share the same Resources
/// object.
pub(crate) fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    value: Object,
) -> Result<()> {
    let mut resources =
        resolve_dict(doc, page_id, b"Resources")?.unwrap_or_else(Dictionary::new);
    let mut entries = match resources.get(category.as_bytes()) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };
    entries.set(name, value);
    resources.set(category, Object::Dictionary(entries));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| BidBindError::assembly_failed(format!("Page {page_id:?}: {e}")))?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Resolve a dictionary-valued page attribute that may be inline or a
/// reference. Returns `None` when the key is absent.
fn resolve_dict(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Dictionary>> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| BidBindError::assembly_failed(format!("Page {page_id:?}: {e}")))?;

    match page.get(key) {
        Ok(Object::Dictionary(dict)) => Ok(Some(dict.clone())),
        Ok(Object::Reference(id)) => Ok(doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .ok()
            .cloned()),
        _ => Ok(None),
    }
}

/// Append drawing operations to a page as a new content stream, preserving
/// the page's existing streams.
pub(crate) fn append_page_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<()> {
    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| BidBindError::assembly_failed(format!("Content encoding failed: {e}")))?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| BidBindError::assembly_failed(format!("Page {page_id:?}: {e}")))?;

    match page.get_mut(b"Contents") {
        Ok(Object::Array(streams)) => {
            streams.push(Object::Reference(stream_id));
        }
        Ok(contents @ Object::Reference(_)) => {
            let existing = contents.clone();
            *contents = Object::Array(vec![existing, Object::Reference(stream_id)]);
        }
        _ => {
            page.set("Contents", Object::Reference(stream_id));
        }
    }
    Ok(())
}

/// MediaBox width and height of a page, defaulting to A4 when the box is
/// absent or malformed.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let resolved = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| match obj {
            Object::Array(values) => Some(values.clone()),
            Object::Reference(id) => doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_array().ok())
                .cloned(),
            _ => None,
        });

    if let Some(values) = resolved {
        if values.len() == 4 {
            let coords: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
            if coords.len() == 4 {
                return (coords[2] - coords[0], coords[3] - coords[1]);
            }
        }
    }
    (A4_WIDTH, A4_HEIGHT)
}

/// Install the output page tree and catalog, then renumber into a compact
/// object space. A zero-page tree (empty Kids, Count 0) is valid output.
pub(crate) fn finish_document(output: &mut Document, pages_root: ObjectId, kids: Vec<ObjectId>) {
    let count = kids.len() as i64;
    let kid_refs: Vec<Object> = kids.into_iter().map(Object::Reference).collect();

    output.objects.insert(
        pages_root,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kid_refs,
            "Count" => count,
        }),
    );

    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_root),
    });
    output.trailer.set("Root", Object::Reference(catalog_id));

    output.prune_objects();
    output.renumber_objects();
}
