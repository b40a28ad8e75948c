//! The document compiler.
//!
//! `compile` turns one [`CompilationOptions`] manifest into a single output
//! PDF: index pages first (when requested), then every resolvable document
//! in manifest order, each page stamped and footered. Per-document failures
//! are recorded as [`SkippedDocument`] diagnostics rather than aborting the
//! run; only stamp preparation, assembly, and the final write are fatal.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use lopdf::{Document, Object, ObjectId, dictionary};
use serde::Serialize;
use tokio::task;
use tracing::{debug, info, warn};

use crate::config::{CompilationOptions, DocumentInfo};
use crate::error::{BidBindError, Result};
use crate::io::{PdfReader, PdfWriter};

use super::index::IndexBuilder;
use super::pages;
use super::pagination::{self, IndexEntry, PageAssignment};
use super::stamp::Stamper;
use super::text;

/// Default number of concurrent loads in the page-count prepass.
const DEFAULT_PREPASS_WORKERS: usize = 4;

/// Why a manifest document was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// The manifest entry carried no file path.
    MissingPath,
    /// The file path does not exist on disk.
    FileNotFound(PathBuf),
    /// The file exists but could not be parsed as a usable PDF.
    LoadFailed(String),
    /// The document loaded but the stamp could not be applied to its pages.
    StampFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPath => write!(f, "no file path in manifest"),
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::LoadFailed(reason) => write!(f, "failed to load: {reason}"),
            Self::StampFailed(reason) => write!(f, "failed to stamp: {reason}"),
        }
    }
}

/// Diagnostic record for one skipped document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDocument {
    /// Manifest id of the document.
    pub id: String,

    /// Display name of the document.
    pub document_name: String,

    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Where the output PDF was written.
    pub output_path: PathBuf,

    /// Total pages in the output, index pages included.
    pub pages_written: usize,

    /// Number of manifest documents that made it into the output.
    pub documents_merged: usize,

    /// Documents that were left out, with reasons.
    pub skipped: Vec<SkippedDocument>,

    /// Wall-clock time for the whole compilation.
    pub compile_time: Duration,

    /// Size of the output file in bytes.
    pub file_size: u64,
}

/// Compiles bid submission manifests into single PDFs.
pub struct Compiler {
    reader: PdfReader,
    writer: PdfWriter,
    prepass_workers: usize,
}

impl Compiler {
    /// Create a compiler with default settings.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
            writer: PdfWriter::new(),
            prepass_workers: DEFAULT_PREPASS_WORKERS,
        }
    }

    /// Set the number of concurrent loads used by the page-count prepass.
    pub fn with_prepass_workers(mut self, workers: usize) -> Self {
        self.prepass_workers = workers.max(1);
        self
    }

    /// Compile one manifest into its output PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the options fail validation, the stamp image
    /// cannot be prepared, assembly fails, or the output cannot be written.
    /// Unreadable input documents are not errors, and neither is a stamp
    /// that fails to apply to one document's pages; both are skipped and
    /// reported in the outcome.
    pub async fn compile(&self, options: &CompilationOptions) -> Result<CompileOutcome> {
        let start = Instant::now();
        options.validate()?;

        let documents = pagination::sort_documents(&options.documents);

        // A broken stamp image must fail the run before any work happens,
        // never silently produce an unstamped submission.
        let stamper = options
            .stamp_options
            .as_ref()
            .map(Stamper::prepare)
            .transpose()?;

        let counts = self
            .reader
            .count_pages(&documents, self.prepass_workers)
            .await;
        let assignment = PageAssignment::compute(&documents, &counts, &options.index_options);
        debug!(
            documents = documents.len(),
            first_content_page = assignment.first_content_page,
            "page assignment computed"
        );

        let index_doc = if options.index_options.include_index {
            let builder = IndexBuilder::new(&options.index_options, options.bid_number.as_deref());
            Some(builder.build(&assignment.entries)?)
        } else {
            None
        };

        let entries = assignment.entries;
        let assembled = task::spawn_blocking(move || {
            assemble(&documents, &entries, index_doc, stamper.as_ref())
        })
        .await
        .map_err(|e| BidBindError::assembly_failed(format!("Assembly task failed: {e}")))??;

        let stats = self.writer.save(&assembled.document, &options.output_path).await?;

        info!(
            output = %stats.output_path.display(),
            pages = assembled.pages_written,
            merged = assembled.documents_merged,
            skipped = assembled.skipped.len(),
            "compilation finished"
        );

        Ok(CompileOutcome {
            output_path: stats.output_path,
            pages_written: assembled.pages_written,
            documents_merged: assembled.documents_merged,
            skipped: assembled.skipped,
            compile_time: start.elapsed(),
            file_size: stats.file_size,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

struct Assembled {
    document: Document,
    pages_written: usize,
    documents_merged: usize,
    skipped: Vec<SkippedDocument>,
}

/// Build the output document synchronously: index pages, then each source
/// document stamped, imported, and footered in order.
///
/// Each document's footers start at its assigned first page from `entries`,
/// the same numbers the index prints. A skipped document therefore leaves a
/// gap in the footer sequence instead of shifting every document after it
/// away from its index entry.
fn assemble(
    documents: &[DocumentInfo],
    entries: &[IndexEntry],
    index_doc: Option<Document>,
    stamper: Option<&Stamper>,
) -> Result<Assembled> {
    let mut output = Document::with_version("1.5");
    let pages_root = output.new_object_id();
    let footer_font_id = output.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<ObjectId> = Vec::new();
    let mut skipped: Vec<SkippedDocument> = Vec::new();
    let mut documents_merged = 0usize;

    // Index pages carry their own footers and are never stamped.
    if let Some(index) = index_doc {
        kids.extend(pages::import_pages(&mut output, index, pages_root));
    }

    for (doc_info, entry) in documents.iter().zip(entries) {
        let mut source = match load_source(doc_info) {
            Ok(doc) => doc,
            Err(reason) => {
                warn!(
                    document = %doc_info.id,
                    name = %doc_info.document_name,
                    %reason,
                    "skipping document"
                );
                skipped.push(SkippedDocument {
                    id: doc_info.id.clone(),
                    document_name: doc_info.document_name.clone(),
                    reason,
                });
                continue;
            }
        };

        // Stamp-image preparation failures are fatal, but applying a good
        // stamp to one document with odd page dictionaries is a fault of
        // that document; it degrades to a skip like any other bad input.
        if let Some(stamper) = stamper {
            if let Err(e) = stamper.apply(&mut source) {
                warn!(
                    document = %doc_info.id,
                    name = %doc_info.document_name,
                    error = %e,
                    "skipping document: stamp application failed"
                );
                skipped.push(SkippedDocument {
                    id: doc_info.id.clone(),
                    document_name: doc_info.document_name.clone(),
                    reason: SkipReason::StampFailed(e.to_string()),
                });
                continue;
            }
        }

        let mut page_number = entry.first_page;
        for page_id in pages::import_pages(&mut output, source, pages_root) {
            let (page_width, _) = pages::media_box(&output, page_id);
            pages::add_page_resource(
                &mut output,
                page_id,
                "Font",
                text::FOOTER_FONT_RES,
                Object::Reference(footer_font_id),
            )?;
            pages::append_page_content(
                &mut output,
                page_id,
                text::footer_ops(text::FOOTER_FONT_RES, page_width, page_number),
            )?;
            kids.push(page_id);
            page_number += 1;
        }
        documents_merged += 1;
    }

    let pages_written = kids.len();
    pages::finish_document(&mut output, pages_root, kids);

    Ok(Assembled {
        document: output,
        pages_written,
        documents_merged,
        skipped,
    })
}

fn load_source(doc_info: &DocumentInfo) -> std::result::Result<Document, SkipReason> {
    let Some(path) = &doc_info.file_path else {
        return Err(SkipReason::MissingPath);
    };
    if !path.exists() {
        return Err(SkipReason::FileNotFound(path.clone()));
    }
    let document = Document::load(path).map_err(|e| SkipReason::LoadFailed(e.to_string()))?;
    if document.get_pages().is_empty() {
        return Err(SkipReason::LoadFailed("PDF has no pages".to_string()));
    }
    Ok(document)
}
