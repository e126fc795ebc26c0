//! Input reading.
//!
//! This module reads input files into memory with support for:
//! - Sequential and parallel loading
//! - Existence and file-type checks
//! - Detailed load statistics
//!
//! Reading does not parse the PDF; that happens when the bytes are
//! registered (see [`crate::registry::Registry::register`]).
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{FlatMergeError, Result};
use crate::utils::format_file_size;

/// An input file read into memory.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// Path to the source file.
    pub path: PathBuf,

    /// Name shown to the user, the file name of `path`.
    pub display_name: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,

    /// Time taken to read the file.
    pub load_time: Duration,
}

impl LoadedInput {
    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedInput>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of files successfully read.
    pub success_count: usize,

    /// Number of files that failed to read.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Average time per successful load.
    pub average_time: Duration,

    /// Total size of successfully read files.
    pub total_size: u64,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut success_count = 0;
        let mut total_size = 0;
        let mut total_load_time = Duration::ZERO;

        for loaded in results.iter().flatten() {
            success_count += 1;
            total_size += loaded.file_size();
            total_load_time += loaded.load_time;
        }

        let average_time = if success_count > 0 {
            total_load_time / success_count as u32
        } else {
            Duration::ZERO
        };

        Self {
            success_count,
            failure_count: results.len() - success_count,
            total_time,
            average_time,
            total_size,
        }
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reader for input files.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a single input file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The path is not a regular file
    /// - The file cannot be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use flatmerge::io::reader::PdfReader;
    /// # use std::path::Path;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load(Path::new("form.pdf")).await?;
    /// println!("Read {} bytes in {:?}", loaded.file_size(), loaded.load_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, path: &Path) -> LoadResult {
        let start = Instant::now();

        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FlatMergeError::file_not_found(path.to_path_buf()),
            _ => FlatMergeError::FailedToReadInput {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_file() {
            return Err(FlatMergeError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FlatMergeError::FailedToReadInput {
                path: path.to_path_buf(),
                source: e,
            })?;

        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::trace!(path = %path.display(), size = bytes.len(), "Read input file");

        Ok(LoadedInput {
            path: path.to_path_buf(),
            display_name,
            bytes,
            load_time: start.elapsed(),
        })
    }

    /// Read multiple files one at a time, in the order provided.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.load(path).await);
        }

        results
    }

    /// Read multiple files concurrently with at most `workers` in flight.
    ///
    /// # Returns
    ///
    /// A vector of results in the same order as the input paths.
    pub async fn load_parallel(&self, paths: &[PathBuf], workers: usize) -> Vec<LoadResult> {
        self.load_with_progress(paths, workers, |_, _| {}).await
    }

    /// Read all files, choosing sequential reads for small batches.
    ///
    /// # Returns
    ///
    /// A tuple of (results, statistics) with one result per path, in order.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if paths.len() <= 3 {
            self.load_sequential(paths).await
        } else {
            self.load_parallel(paths, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }

    /// Read files concurrently, calling `on_progress` for each file in
    /// input order once all reads are done.
    pub async fn load_with_progress<F>(
        &self,
        paths: &[PathBuf],
        workers: usize,
        mut on_progress: F,
    ) -> Vec<LoadResult>
    where
        F: FnMut(usize, &LoadResult),
    {
        use futures::stream::{self, StreamExt};

        let tasks = paths.iter().enumerate().map(|(idx, path)| async move {
            let result = self.load(path).await;
            (idx, result)
        });

        let mut indexed_results: Vec<(usize, LoadResult)> = stream::iter(tasks)
            .buffer_unordered(workers.max(1))
            .collect()
            .await;

        // Sort by original index to maintain order
        indexed_results.sort_by_key(|(idx, _)| *idx);

        indexed_results
            .into_iter()
            .map(|(idx, result)| {
                on_progress(idx, &result);
                result
            })
            .collect()
    }
}
