//! Plain submission merging.
//!
//! Concatenates already-compiled submission PDFs in the order given, with no
//! index, stamps, or footer renumbering; each input keeps whatever page
//! decorations it was compiled with. Unreadable inputs are skipped and
//! reported, matching the compiler's degrade-dont-abort posture.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use lopdf::Document;
use serde::Serialize;
use tokio::task;
use tracing::{info, warn};

use crate::compile::pages;
use crate::error::{BidBindError, Result};
use crate::io::PdfWriter;

/// Diagnostic record for one input left out of the merged output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInput {
    /// Path of the skipped input.
    pub path: PathBuf,

    /// Why it was skipped.
    pub reason: String,
}

/// Result of a successful submission merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Where the merged PDF was written.
    pub output_path: PathBuf,

    /// Number of input files that made it into the output.
    pub files_merged: usize,

    /// Total pages in the output.
    pub total_pages: usize,

    /// Inputs that were left out, with reasons.
    pub skipped: Vec<SkippedInput>,

    /// Wall-clock time for the whole merge.
    pub merge_time: Duration,

    /// Size of the output file in bytes.
    pub file_size: u64,
}

/// Merge compiled submission PDFs into one document, in input order.
///
/// # Errors
///
/// Returns an error if assembly fails or the output cannot be written.
/// Missing or unparseable inputs are skipped, not fatal; merging an empty
/// or fully-skipped input list still writes a valid zero-page PDF.
pub async fn merge_submissions(inputs: &[PathBuf], output_path: &Path) -> Result<MergeOutcome> {
    let start = Instant::now();
    let inputs = inputs.to_vec();

    let (document, files_merged, total_pages, skipped) = task::spawn_blocking(move || {
        let mut output = Document::with_version("1.5");
        let pages_root = output.new_object_id();

        let mut kids = Vec::new();
        let mut skipped: Vec<SkippedInput> = Vec::new();
        let mut files_merged = 0usize;

        for path in &inputs {
            if !path.exists() {
                warn!(path = %path.display(), "skipping missing submission");
                skipped.push(SkippedInput {
                    path: path.clone(),
                    reason: "file not found".to_string(),
                });
                continue;
            }
            let source = match Document::load(path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable submission");
                    skipped.push(SkippedInput {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            kids.extend(pages::import_pages(&mut output, source, pages_root));
            files_merged += 1;
        }

        let total_pages = kids.len();
        pages::finish_document(&mut output, pages_root, kids);
        (output, files_merged, total_pages, skipped)
    })
    .await
    .map_err(|e| BidBindError::assembly_failed(format!("Merge task failed: {e}")))?;

    let writer = PdfWriter::new();
    let stats = writer.save(&document, output_path).await?;

    info!(
        output = %stats.output_path.display(),
        files = files_merged,
        pages = total_pages,
        skipped = skipped.len(),
        "submission merge finished"
    );

    Ok(MergeOutcome {
        output_path: stats.output_path,
        files_merged,
        total_pages,
        skipped,
        merge_time: start.elapsed(),
        file_size: stats.file_size,
    })
}
