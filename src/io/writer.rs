//! PDF writing and saving.
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a crash mid-write never leaves a partially-written submission
//! at the final path. The destination's parent directories are created on
//! demand.

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{BidBindError, Result};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress the PDF before writing.
    pub compress: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

/// PDF writer with configurable behavior.
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
        }
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save a PDF document to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory cannot be created, the
    /// document cannot be serialized, or the file cannot be written.
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        // lopdf serialization is synchronous; run it off the async runtime.
        let mut doc_clone = doc.clone();

        task::spawn_blocking(move || {
            let start = Instant::now();

            if let Some(parent) = path_buf.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        BidBindError::FailedToCreateOutput {
                            path: parent.to_path_buf(),
                            source: e,
                        }
                    })?;
                }
            }

            if options.compress {
                doc_clone.compress();
            }

            let write_path = if options.atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                BidBindError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

            doc_clone
                .save_to(&mut writer)
                .map_err(|e| BidBindError::FailedToWrite {
                    path: write_path.clone(),
                    source: std::io::Error::other(e),
                })?;

            writer.flush().map_err(|e| BidBindError::FailedToWrite {
                path: write_path.clone(),
                source: e,
            })?;

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    BidBindError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            let write_time = start.elapsed();
            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok::<_, BidBindError>(WriteStatistics {
                write_time,
                file_size,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| BidBindError::assembly_failed(format!("Write task failed: {e}")))?
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// A temp path in the destination's directory, unique within and across
/// processes, so concurrent writes of sibling outputs never collide and an
/// output literally named `*.tmp` stays untouched until the rename.
fn temp_path(path: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(format!(".{}.{sequence}.tmp", std::process::id()));
    path.with_file_name(name)
}
