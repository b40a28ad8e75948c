//! Page-number assignment.
//!
//! Page numbers are computed once, up front, from the prepass counts. The
//! index builder and the footer stamping both read from the same
//! [`PageAssignment`], so an index entry can never disagree with the footer
//! printed on the page it points to.

use std::collections::HashMap;

use crate::config::{DocumentInfo, IndexOptions};

/// One line of the generated index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexEntry {
    /// Id of the document this entry points to.
    pub id: String,

    /// Display label (the document name, before truncation).
    pub label: String,

    /// Printed page number of the document's first page.
    pub first_page: i64,
}

/// The complete page-numbering plan for one compilation.
#[derive(Debug, Clone)]
pub(crate) struct PageAssignment {
    /// Printed page number of the first merged content page.
    pub first_content_page: i64,

    /// Index entries in merge order, one per manifest document.
    pub entries: Vec<IndexEntry>,
}

/// Sort a manifest by ascending `order`, keeping ties in manifest order.
pub(crate) fn sort_documents(documents: &[DocumentInfo]) -> Vec<DocumentInfo> {
    let mut sorted = documents.to_vec();
    sorted.sort_by_key(|d| d.order);
    sorted
}

impl PageAssignment {
    /// Compute the numbering plan for an already-sorted manifest.
    ///
    /// With an index, the index page itself takes `start_from` and content
    /// starts at `start_from + 1`; without one, content starts at
    /// `start_from`. A document missing from `counts` (unresolvable path or
    /// unreadable file) is budgeted at one page so the entries after it stay
    /// plausible even if it later gets skipped entirely.
    pub(crate) fn compute(
        documents: &[DocumentInfo],
        counts: &HashMap<String, usize>,
        index_options: &IndexOptions,
    ) -> Self {
        let first_content_page = if index_options.include_index {
            index_options.start_from + 1
        } else {
            index_options.start_from
        };

        let mut next_page = first_content_page;
        let entries = documents
            .iter()
            .map(|doc| {
                let entry = IndexEntry {
                    id: doc.id.clone(),
                    label: doc.document_name.clone(),
                    first_page: next_page,
                };
                next_page += counts.get(&doc.id).copied().unwrap_or(1) as i64;
                entry
            })
            .collect();

        Self {
            first_content_page,
            entries,
        }
    }
}
