//! PDF loading and the page-count prepass.
//!
//! Loading runs on the blocking thread pool since lopdf parses
//! synchronously. The prepass opens every resolvable document once, in
//! parallel, solely to record page counts; the compiler's assembly pass
//! re-loads documents independently so a file that went bad between the two
//! passes degrades to a skip rather than an error.

use lopdf::Document;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, warn};

use crate::config::DocumentInfo;
use crate::error::{BidBindError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// File size in bytes.
    pub file_size: u64,
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages after loading.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts page-less documents.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid PDF, or
    /// has no pages (when verification is enabled).
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let verify = self.verify;

        task::spawn_blocking(move || {
            let document = Document::load(&path_buf)
                .map_err(|e| BidBindError::failed_to_load_pdf(path_buf.clone(), e.to_string()))?;

            let page_count = document.get_pages().len();
            if verify && page_count == 0 {
                return Err(BidBindError::failed_to_load_pdf(
                    path_buf.clone(),
                    "PDF has no pages",
                ));
            }

            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok(LoadedPdf {
                document,
                path: path_buf,
                page_count,
                file_size,
            })
        })
        .await
        .map_err(|e| BidBindError::assembly_failed(format!("Load task failed: {e}")))?
    }

    /// Run the page-count prepass over an ordered document manifest.
    ///
    /// Returns a map from document id to page count. Documents without a
    /// resolvable path get no entry. Documents whose file exists but fails
    /// to load get a fallback count of 1, so index generation can proceed
    /// even when one input is bad.
    ///
    /// Documents are opened concurrently with at most `workers` loads in
    /// flight; the result is a map, so completion order does not matter.
    pub async fn count_pages(
        &self,
        documents: &[DocumentInfo],
        workers: usize,
    ) -> HashMap<String, usize> {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1);

        let tasks = documents.iter().filter_map(|doc| {
            let path = doc.file_path.clone()?;
            if !path.exists() {
                debug!(
                    document = %doc.id,
                    path = %path.display(),
                    "prepass: file does not exist, no page count recorded"
                );
                return None;
            }

            let id = doc.id.clone();
            let reader = self.clone();
            Some(async move {
                match reader.load(&path).await {
                    Ok(loaded) => (id, loaded.page_count),
                    Err(e) => {
                        warn!(
                            document = %id,
                            error = %e,
                            "prepass: failed to count pages, falling back to 1"
                        );
                        (id, 1)
                    }
                }
            })
        });

        stream::iter(tasks)
            .buffer_unordered(workers)
            .collect::<HashMap<_, _>>()
            .await
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
