//! Flatten-and-merge operations.
//!
//! This module turns an ordered list of registered documents into a single
//! image-only PDF:
//! - Page rasterization and encoding (through [`crate::render`])
//! - Output page assembly
//! - Metadata management
//! - Order preservation, also under parallel rendering
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::config::{ImageCodec, RenderParameters};
//! use flatmerge::merge::Merger;
//! use flatmerge::registry::Registry;
//!
//! # async fn example(registry: Registry) -> Result<(), Box<dyn std::error::Error>> {
//! let params = RenderParameters::new(300, ImageCodec::Png);
//! let merger = Merger::new().with_jobs(4);
//! let result = merger.flatten_and_merge(registry.snapshot(), &params).await?;
//! println!("Flattened {} pages", result.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;
pub mod metadata;
pub mod pages;

pub use merger::{MergeResult, MergeStatistics, Merger, PageProgress};
pub use metadata::MetadataManager;
pub use pages::PageAssembler;

use crate::config::RenderParameters;
use crate::error::Result;
use crate::registry::SourceDocument;

/// Flatten and merge documents with a default [`Merger`].
///
/// Convenience function for one-off runs.
///
/// # Errors
///
/// See [`Merger::flatten_and_merge`].
pub async fn flatten_and_merge(
    documents: &[SourceDocument],
    params: &RenderParameters,
) -> Result<MergeResult> {
    Merger::new().flatten_and_merge(documents, params).await
}

/// Blocking counterpart of [`flatten_and_merge`]; needs no async runtime.
///
/// # Errors
///
/// See [`Merger::flatten_and_merge_blocking`].
pub fn flatten_and_merge_blocking(
    documents: &[SourceDocument],
    params: &RenderParameters,
) -> Result<MergeResult> {
    Merger::new().flatten_and_merge_blocking(documents, params)
}
