//! bidbind - Compile ordered bid documents into one submission PDF.
//!
//! This library merges a set of independently-authored PDF documents into a
//! single bid submission. It supports:
//!
//! - An ordered document manifest with per-document skip tolerance
//! - A generated table-of-contents ("INDEX") page whose entries carry the
//!   final page number of each merged document
//! - A positioned, scaled stamp image overlaid on every content page
//! - Sequential "Page no : N" footers across the whole output
//! - A simpler concatenation operation to roll compiled submissions into a
//!   master archive
//!
//! # Examples
//!
//! ## Compiling a submission
//!
//! ```no_run
//! use bidbind::compile::Compiler;
//! use bidbind::config::{CompilationOptions, DocumentInfo, IndexOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = CompilationOptions {
//!     response_name: "Response A".into(),
//!     response_type: "technical".into(),
//!     remarks: None,
//!     documents: vec![DocumentInfo {
//!         id: "doc-1".into(),
//!         document_name: "Cover Letter".into(),
//!         file_path: Some(PathBuf::from("uploads/cover.pdf")),
//!         order: 1,
//!     }],
//!     stamp_options: None,
//!     index_options: IndexOptions {
//!         include_index: true,
//!         start_from: 1,
//!         title: None,
//!     },
//!     bid_number: Some("BID-2024-117".into()),
//!     output_path: PathBuf::from("out/response-a.pdf"),
//! };
//!
//! let outcome = Compiler::new().compile(&options).await?;
//! println!(
//!     "wrote {} pages to {}",
//!     outcome.pages_written,
//!     outcome.output_path.display()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Rolling up compiled submissions
//!
//! ```no_run
//! use bidbind::merge::merge_submissions;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let outcome = merge_submissions(&inputs, Path::new("all.pdf")).await?;
//! println!("merged {} files", outcome.files_merged);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compile;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod utils;

// Re-export commonly used types
pub use compile::{CompileOutcome, Compiler, SkipReason, SkippedDocument};
pub use config::CompilationOptions;
pub use error::{BidBindError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
