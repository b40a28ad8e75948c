//! Submission compilation: page counting, index generation, stamping, and
//! footered merging.

mod compiler;
mod index;
pub(crate) mod pages;
mod pagination;
mod stamp;
pub(crate) mod text;

pub use compiler::{CompileOutcome, Compiler, SkipReason, SkippedDocument};
