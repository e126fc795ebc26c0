//! A user session: one registry plus the most recent flattened output.
//!
//! Front ends that let a user add files, reorder them and flatten repeatedly
//! keep one [`Session`] per user. A failed merge leaves the previous output
//! available for download.

use chrono::{DateTime, Local};

use crate::config::RenderParameters;
use crate::error::Result;
use crate::merge::{MergeResult, MergeStatistics, Merger};
use crate::registry::{RegisterOutcome, Registry};

/// A flattened PDF produced by a session.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// The serialized PDF.
    pub bytes: Vec<u8>,

    /// Number of pages in the PDF.
    pub total_pages: usize,

    /// Suggested download name, e.g. `flattened-merge-20240101-120000.pdf`.
    pub file_name: String,

    /// Resolution the pages were rasterized at.
    pub resolution_dpi: u32,

    /// When the merge finished.
    pub created_at: DateTime<Local>,

    /// Statistics of the run that produced this artifact.
    pub statistics: MergeStatistics,
}

impl OutputArtifact {
    fn from_result(result: MergeResult, created_at: DateTime<Local>) -> Self {
        Self {
            file_name: artifact_file_name(&created_at),
            resolution_dpi: result.statistics.resolution_dpi,
            total_pages: result.total_pages,
            bytes: result.output_bytes,
            statistics: result.statistics,
            created_at,
        }
    }

    /// Size of the PDF in bytes.
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Download name for an artifact created at `created_at`.
pub fn artifact_file_name(created_at: &DateTime<Local>) -> String {
    created_at
        .format("flattened-merge-%Y%m%d-%H%M%S.pdf")
        .to_string()
}

/// Registry and last output of one user.
#[derive(Debug, Default)]
pub struct Session {
    registry: Registry,
    last_output: Option<OutputArtifact>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document in this session's registry.
    pub fn register(&mut self, bytes: impl Into<Vec<u8>>, display_name: &str) -> RegisterOutcome {
        self.registry.register(bytes, display_name)
    }

    /// The registered documents.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for reordering and removal.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The most recent successful output, if any.
    pub fn last_output(&self) -> Option<&OutputArtifact> {
        self.last_output.as_ref()
    }

    /// Flatten the registered documents in their current order.
    ///
    /// On success the new artifact replaces the previous one. On failure the
    /// previous artifact is kept and the error is returned.
    ///
    /// # Errors
    ///
    /// Any error of [`Merger::flatten_and_merge`].
    pub async fn merge(
        &mut self,
        merger: &Merger,
        params: &RenderParameters,
    ) -> Result<&OutputArtifact> {
        let result = merger
            .flatten_and_merge(self.registry.snapshot(), params)
            .await?;
        Ok(self.store(result))
    }

    /// Like [`merge`](Self::merge), rendering on the current thread.
    ///
    /// # Errors
    ///
    /// Any error of [`Merger::flatten_and_merge_blocking`].
    pub fn merge_blocking(
        &mut self,
        merger: &Merger,
        params: &RenderParameters,
    ) -> Result<&OutputArtifact> {
        let result = merger.flatten_and_merge_blocking(self.registry.snapshot(), params)?;
        Ok(self.store(result))
    }

    /// Remove every document and drop the last output.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.last_output = None;
    }

    fn store(&mut self, result: MergeResult) -> &OutputArtifact {
        let artifact = OutputArtifact::from_result(result, Local::now());
        tracing::debug!(
            file_name = %artifact.file_name,
            pages = artifact.total_pages,
            "Stored session output"
        );
        self.last_output.insert(artifact)
    }
}
