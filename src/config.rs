//! Compilation request types for bidbind.
//!
//! The web-API layer that owns uploads and persistence hands this library a
//! fully-resolved manifest: every document carries a stable id and an
//! on-disk path. This module defines that manifest, applies defaults, and
//! validates option combinations before the compiler runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BidBindError, Result};

/// One input document to be merged into the submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// Opaque identifier, unique within one compilation request.
    pub id: String,

    /// Display name used as the index label.
    pub document_name: String,

    /// Path to the PDF file on disk. Absence or non-existence is tolerated;
    /// the document is skipped, not fatal.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Documents are processed in ascending order (stable sort on ties).
    pub order: i32,
}

/// Anchor position for the stamp image on each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StampPosition {
    /// Bottom-right corner (default).
    #[default]
    BottomRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Top-right corner.
    TopRight,
    /// Top-left corner.
    TopLeft,
    /// Centered in both axes.
    Center,
}

/// Visual stamp applied to every page of every merged document.
///
/// Index pages are never stamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampOptions {
    /// Path to a PNG or JPEG image.
    pub image_path: PathBuf,

    /// Anchor position on each page.
    #[serde(default)]
    pub position: StampPosition,

    /// Stamp opacity, 0..1.
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Vestigial multiplicative scale carried over from older manifests.
    ///
    /// The rendered stamp size is a fixed 100-unit bounding box that
    /// preserves aspect ratio; this field is accepted but ignored so that
    /// old callers keep working.
    #[serde(default)]
    pub scale: Option<f32>,
}

fn default_opacity() -> f32 {
    0.8
}

/// Controls generation of the leading index page(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOptions {
    /// Whether to generate index pages at all.
    pub include_index: bool,

    /// Page number printed on the index page itself; the first content page
    /// after the index prints `start_from + 1`. Without an index the first
    /// content page prints `start_from`.
    pub start_from: i64,

    /// Free-form title, accepted for manifest compatibility. The index
    /// heading is always the literal "INDEX".
    #[serde(default)]
    pub title: Option<String>,
}

/// One compilation request.
///
/// Request-scoped and never persisted by this library; the sole durable
/// side effect of a compilation is the written output PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationOptions {
    /// Pass-through metadata recorded by the caller's persistence layer.
    pub response_name: String,

    /// Pass-through metadata recorded by the caller's persistence layer.
    pub response_type: String,

    /// Pass-through metadata recorded by the caller's persistence layer.
    #[serde(default)]
    pub remarks: Option<String>,

    /// Ordered set of input documents.
    pub documents: Vec<DocumentInfo>,

    /// Optional stamp applied to every merged content page.
    #[serde(default)]
    pub stamp_options: Option<StampOptions>,

    /// Index generation settings.
    pub index_options: IndexOptions,

    /// Optional bid number rendered as a centered index-page title.
    #[serde(default)]
    pub bid_number: Option<String>,

    /// Destination file path; parent directories are created if missing.
    pub output_path: PathBuf,
}

impl CompilationOptions {
    /// Parse a compilation request from the caller's JSON manifest.
    ///
    /// # Errors
    ///
    /// Returns [`BidBindError::InvalidOptions`] if the JSON is malformed or
    /// missing required fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BidBindError::invalid_options(e.to_string()))
    }

    /// Validate the request.
    ///
    /// An empty document list is allowed: a compilation with zero documents
    /// still produces a valid (possibly index-only) output PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output path is empty
    /// - The stamp opacity is outside 0..=1
    /// - The index start page is negative
    pub fn validate(&self) -> Result<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(BidBindError::invalid_options("Output path is empty"));
        }

        if let Some(stamp) = &self.stamp_options {
            if !(0.0..=1.0).contains(&stamp.opacity) {
                return Err(BidBindError::invalid_options(format!(
                    "Stamp opacity must be between 0 and 1, got {}",
                    stamp.opacity
                )));
            }
        }

        if self.index_options.start_from < 0 {
            return Err(BidBindError::invalid_options(format!(
                "Index start page must not be negative, got {}",
                self.index_options.start_from
            )));
        }

        Ok(())
    }
}
