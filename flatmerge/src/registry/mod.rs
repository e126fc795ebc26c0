//! Deduplicated, ordered collection of source documents.
//!
//! A [`Registry`] is owned by the caller, one per independent user session.
//! Registration hashes the bytes, rejects duplicates and unreadable PDFs, and
//! appends everything else; the order of the registry is the merge order.
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::registry::{Registry, RegisterOutcome};
//!
//! # fn example(bytes: Vec<u8>) {
//! let mut registry = Registry::new();
//! match registry.register(bytes, "form.pdf") {
//!     RegisterOutcome::Registered { page_count, .. } => println!("{page_count} pages"),
//!     RegisterOutcome::Duplicate { .. } => println!("already added"),
//!     RegisterOutcome::Invalid { reason } => eprintln!("skipped: {reason}"),
//! }
//! # }
//! ```

pub mod document;

pub use document::{ContentHash, DocumentId, DocumentSummary, SourceDocument};

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{FlatMergeError, Result};
use crate::render;

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The document was appended to the registry.
    Registered {
        /// Identifier of the new entry.
        id: DocumentId,
        /// Number of pages in the document.
        page_count: usize,
        /// Size of the document in bytes.
        byte_size: usize,
    },

    /// Identical bytes are already registered; nothing changed.
    Duplicate {
        /// Identifier of the entry holding the same content.
        existing: DocumentId,
    },

    /// The bytes could not be opened as a PDF; nothing changed.
    Invalid {
        /// Why the document was rejected.
        reason: String,
    },
}

impl RegisterOutcome {
    /// Whether the registry grew.
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Ordered collection of [`SourceDocument`]s with unique content.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    documents: Vec<SourceDocument>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document.
    ///
    /// Duplicate content and unreadable PDFs are reported through the
    /// returned outcome and leave the registry untouched.
    pub fn register(&mut self, bytes: impl Into<Vec<u8>>, display_name: &str) -> RegisterOutcome {
        let bytes = bytes.into();
        let content_hash = ContentHash::of(&bytes);

        if let Some(existing) = self
            .documents
            .iter()
            .find(|doc| doc.content_hash == content_hash)
        {
            tracing::info!(
                name = display_name,
                existing = %existing.id,
                checksum = %content_hash,
                "Skipping duplicate document"
            );
            return RegisterOutcome::Duplicate {
                existing: existing.id,
            };
        }

        let page_count = match render::probe_page_count(&bytes) {
            Ok(count) => count,
            Err(reason) => {
                tracing::warn!(name = display_name, %reason, "Rejecting unreadable document");
                return RegisterOutcome::Invalid { reason };
            }
        };

        let document = SourceDocument {
            id: DocumentId::new(),
            display_name: display_name.to_string(),
            content: Arc::from(bytes),
            content_hash,
            page_count,
        };
        let outcome = RegisterOutcome::Registered {
            id: document.id,
            page_count,
            byte_size: document.byte_size(),
        };

        tracing::debug!(
            name = display_name,
            id = %document.id,
            pages = page_count,
            size = document.byte_size(),
            "Registered document"
        );
        self.documents.push(document);

        outcome
    }

    /// Replace the order of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`FlatMergeError::InvalidPermutation`] unless `new_order`
    /// names every registered document exactly once.
    pub fn reorder(&mut self, new_order: &[DocumentId]) -> Result<()> {
        let invalid = || FlatMergeError::InvalidPermutation {
            expected: self.documents.len(),
            given: new_order.len(),
        };

        if new_order.len() != self.documents.len() {
            return Err(invalid());
        }

        let mut seen = HashSet::with_capacity(new_order.len());
        let mut reordered = Vec::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(*id) {
                return Err(invalid());
            }
            let doc = self.get(*id).ok_or_else(invalid)?;
            reordered.push(doc.clone());
        }

        self.documents = reordered;
        Ok(())
    }

    /// Move a document `offset` positions (negative moves towards the front).
    ///
    /// Returns false, leaving the order unchanged, if the document is unknown
    /// or the target position falls outside the registry.
    pub fn move_by(&mut self, id: DocumentId, offset: isize) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let target = match index.checked_add_signed(offset) {
            Some(target) if target < self.documents.len() => target,
            _ => return false,
        };

        if target != index {
            let doc = self.documents.remove(index);
            self.documents.insert(target, doc);
        }
        true
    }

    /// Remove a document. Returns whether anything was removed.
    pub fn remove(&mut self, id: DocumentId) -> bool {
        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        before != self.documents.len()
    }

    /// Remove every document.
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Read-only view of the documents in merge order.
    pub fn snapshot(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Look up a document by identifier.
    pub fn get(&self, id: DocumentId) -> Option<&SourceDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Position of a document in merge order.
    pub fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id == id)
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Sum of page counts over all documents.
    pub fn total_pages(&self) -> usize {
        self.documents.iter().map(SourceDocument::page_count).sum()
    }

    /// Sum of byte sizes over all documents.
    pub fn total_bytes(&self) -> u64 {
        self.documents.iter().map(|doc| doc.byte_size() as u64).sum()
    }

    /// Iterate over the documents in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceDocument> {
        self.documents.iter()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a SourceDocument;
    type IntoIter = std::slice::Iter<'a, SourceDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
