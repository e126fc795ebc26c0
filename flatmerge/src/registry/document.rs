//! Registered source documents and their identity types.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::utils::format_file_size;

/// Opaque identifier assigned to a document when it enters a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// SHA-1 digest of a document's raw bytes, used only to detect duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 20]);

impl ContentHash {
    /// Hash the given bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha1::digest(bytes).into())
    }

    /// Lowercase hexadecimal form of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A PDF accepted into a [`Registry`](super::Registry).
///
/// The content is shared and immutable, so cloning a document (or a whole
/// snapshot) never copies the PDF bytes.
#[derive(Clone)]
pub struct SourceDocument {
    pub(crate) id: DocumentId,
    pub(crate) display_name: String,
    pub(crate) content: Arc<[u8]>,
    pub(crate) content_hash: ContentHash,
    pub(crate) page_count: usize,
}

impl SourceDocument {
    /// Identifier assigned at registration.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Caller-supplied label, usually the original file name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Raw PDF bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Shared handle to the raw bytes, for handing to render workers.
    pub fn shared_content(&self) -> Arc<[u8]> {
        Arc::clone(&self.content)
    }

    /// Digest of the raw bytes.
    pub fn content_hash(&self) -> ContentHash {
        self.content_hash
    }

    /// Number of pages counted when the document was registered.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Size of the raw bytes.
    pub fn byte_size(&self) -> usize {
        self.content.len()
    }

    /// Size of the raw bytes as a human-readable string.
    pub fn human_size(&self) -> String {
        format_file_size(self.byte_size() as u64)
    }

    /// Serializable description of the document, without its content.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            name: self.display_name.clone(),
            pages: self.page_count,
            size: self.byte_size(),
            checksum: self.content_hash,
        }
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("content_hash", &self.content_hash.to_hex())
            .field("page_count", &self.page_count)
            .field("byte_size", &self.byte_size())
            .finish()
    }
}

/// Metadata of a registered document, for listings and reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Registry identifier.
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Page count.
    pub pages: usize,
    /// Size in bytes.
    pub size: usize,
    /// Content digest.
    pub checksum: ContentHash,
}
