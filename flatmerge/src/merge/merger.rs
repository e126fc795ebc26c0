//! The flatten-and-merge engine.
//!
//! Every page of every source document is rasterized, encoded and appended
//! as a full-page image to a fresh output document. Documents are processed
//! in the order given; pages in page order.

use chrono::Local;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::task::JoinError;

use crate::config::{ImageCodec, Metadata, RenderParameters};
use crate::error::{FlatMergeError, Result};
use crate::merge::pages::PageAssembler;
use crate::registry::SourceDocument;
use crate::render::{self, EncodedImage};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of source documents flattened.
    pub documents_merged: usize,

    /// Total number of pages in the output document.
    pub total_pages: usize,

    /// Total size of the source documents.
    pub input_bytes: u64,

    /// Size of the output document.
    pub output_bytes: u64,

    /// Time spent rendering and assembling.
    #[serde(serialize_with = "serialize_millis", rename = "renderTimeMs")]
    pub render_time: Duration,

    /// Resolution used for rasterization.
    pub resolution_dpi: u32,

    /// Codec used for the page images.
    pub image_codec: ImageCodec,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_bytes)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_bytes)
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of a flatten-and-merge run.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The serialized output PDF.
    pub output_bytes: Vec<u8>,

    /// Number of pages in the output, equal to the sum of the source page counts.
    pub total_pages: usize,

    /// Statistics about the run.
    pub statistics: MergeStatistics,
}

/// Progress of a merge, reported once per output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// Position of the source document in the input.
    pub document_index: usize,

    /// Page index within the source document.
    pub page_index: usize,

    /// Output pages written so far, including this one.
    pub pages_done: usize,

    /// Output pages expected in total.
    pub total_pages: usize,
}

/// Flatten-and-merge engine.
///
/// A `Merger` carries only settings; it holds no documents and can be reused
/// for any number of runs.
#[derive(Debug, Clone)]
pub struct Merger {
    /// Maximum number of documents rendered concurrently in async mode.
    jobs: usize,

    /// Metadata written to every output document.
    metadata: Metadata,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self {
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            metadata: Metadata::default(),
        }
    }

    /// Set the number of documents rendered concurrently (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set the metadata written to the output Info dictionary.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Configured concurrency.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Flatten and merge `documents` on the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `documents` is empty ([`FlatMergeError::EmptyInput`])
    /// - `params` are out of range ([`FlatMergeError::InvalidConfig`])
    /// - a document cannot be opened or a page cannot be rasterized or
    ///   encoded ([`FlatMergeError::RenderError`])
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use flatmerge::merge::Merger;
    /// # use flatmerge::config::RenderParameters;
    /// # use flatmerge::registry::Registry;
    /// # fn example(registry: &Registry) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let result = merger.flatten_and_merge_blocking(registry.snapshot(), &RenderParameters::default())?;
    /// println!("Flattened {} pages", result.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub fn flatten_and_merge_blocking(
        &self,
        documents: &[SourceDocument],
        params: &RenderParameters,
    ) -> Result<MergeResult> {
        self.flatten_and_merge_blocking_with_progress(documents, params, |_| {})
    }

    /// Like [`flatten_and_merge_blocking`](Self::flatten_and_merge_blocking),
    /// calling `on_page` after each output page is appended.
    #[tracing::instrument(level = "debug", skip_all, fields(documents = documents.len()))]
    pub fn flatten_and_merge_blocking_with_progress<F>(
        &self,
        documents: &[SourceDocument],
        params: &RenderParameters,
        mut on_page: F,
    ) -> Result<MergeResult>
    where
        F: FnMut(PageProgress),
    {
        Self::check_request(documents, params)?;
        let start = Instant::now();
        let total_pages = expected_pages(documents);

        let mut assembler = PageAssembler::new();
        for (document_index, document) in documents.iter().enumerate() {
            let mut page_index = 0;
            render::render_document(
                document_index,
                document.display_name(),
                document.content(),
                params,
                |image| {
                    assembler.add_image_page(image, params)?;
                    on_page(PageProgress {
                        document_index,
                        page_index,
                        pages_done: assembler.page_count(),
                        total_pages,
                    });
                    page_index += 1;
                    Ok(())
                },
            )?;
        }

        self.finish(assembler, documents, params, start)
    }

    /// Flatten and merge `documents`, rendering up to `jobs` documents
    /// concurrently on the blocking thread pool.
    ///
    /// The output is identical in page order to the sequential mode.
    ///
    /// # Errors
    ///
    /// Same as [`flatten_and_merge_blocking`](Self::flatten_and_merge_blocking).
    /// When several documents fail, the first one in input order is reported.
    pub async fn flatten_and_merge(
        &self,
        documents: &[SourceDocument],
        params: &RenderParameters,
    ) -> Result<MergeResult> {
        self.flatten_and_merge_with_progress(documents, params, |_| {})
            .await
    }

    /// Like [`flatten_and_merge`](Self::flatten_and_merge), calling
    /// `on_page` in output order after each page is appended.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(documents = documents.len(), jobs = self.jobs)
    )]
    pub async fn flatten_and_merge_with_progress<F>(
        &self,
        documents: &[SourceDocument],
        params: &RenderParameters,
        mut on_page: F,
    ) -> Result<MergeResult>
    where
        F: FnMut(PageProgress),
    {
        Self::check_request(documents, params)?;
        let start = Instant::now();
        let total_pages = expected_pages(documents);

        let tasks = documents.iter().enumerate().map(|(document_index, document)| {
            let name = document.display_name().to_string();
            let content = document.shared_content();
            let params = *params;
            async move {
                let worker_name = name.clone();
                let rendered = tokio::task::spawn_blocking(move || {
                    render::render_document_pages(document_index, &worker_name, &content, &params)
                })
                .await
                .unwrap_or_else(|err| Err(worker_failed(document_index, name, err)));
                (document_index, rendered)
            }
        });

        let mut rendered: Vec<(usize, Result<Vec<EncodedImage>>)> = stream::iter(tasks)
            .buffer_unordered(self.jobs)
            .collect()
            .await;

        // Sort by original index to maintain order
        rendered.sort_by_key(|(idx, _)| *idx);

        let mut assembler = PageAssembler::new();
        for (document_index, pages) in rendered {
            for (page_index, image) in pages?.into_iter().enumerate() {
                assembler.add_image_page(image, params)?;
                on_page(PageProgress {
                    document_index,
                    page_index,
                    pages_done: assembler.page_count(),
                    total_pages,
                });
            }
        }

        self.finish(assembler, documents, params, start)
    }

    fn check_request(documents: &[SourceDocument], params: &RenderParameters) -> Result<()> {
        if documents.is_empty() {
            return Err(FlatMergeError::EmptyInput);
        }
        params.validate()
    }

    fn finish(
        &self,
        assembler: PageAssembler,
        documents: &[SourceDocument],
        params: &RenderParameters,
        start: Instant,
    ) -> Result<MergeResult> {
        let total_pages = assembler.page_count();
        let output_bytes = assembler.finish(&self.metadata, Local::now().fixed_offset())?;

        let statistics = MergeStatistics {
            documents_merged: documents.len(),
            total_pages,
            input_bytes: documents.iter().map(|doc| doc.byte_size() as u64).sum(),
            output_bytes: output_bytes.len() as u64,
            render_time: start.elapsed(),
            resolution_dpi: params.resolution_dpi,
            image_codec: params.image_codec,
        };

        tracing::info!(
            documents = statistics.documents_merged,
            pages = total_pages,
            output = %statistics.format_output_size(),
            elapsed_ms = statistics.render_time.as_millis() as u64,
            "Flatten-and-merge complete"
        );

        Ok(MergeResult {
            output_bytes,
            total_pages,
            statistics,
        })
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// A render worker that panicked or was cancelled still names its document.
fn worker_failed(document_index: usize, document_name: String, err: JoinError) -> FlatMergeError {
    FlatMergeError::open_failed(
        document_index,
        document_name,
        format!("render worker failed: {err}"),
    )
}

fn expected_pages(documents: &[SourceDocument]) -> usize {
    documents.iter().map(SourceDocument::page_count).sum()
}
