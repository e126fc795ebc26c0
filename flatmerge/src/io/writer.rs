//! Output writing.
//!
//! This module writes the flattened PDF bytes to disk with:
//! - Atomic writes (write to a temp file beside the target, then rename)
//! - Parent directory creation
//! - Overwrite checks
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&bytes, Path::new("flattened.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;

use crate::error::{FlatMergeError, Result};
use crate::utils::format_file_size;

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

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writer for output PDF bytes.
///
/// Writes go to a temp file beside the target, then a rename replaces the
/// target. Missing parent directories are created.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output file cannot be created
    /// - Writing or renaming fails
    pub async fn save(&self, bytes: &[u8], path: &Path) -> Result<()> {
        self.save_with_stats(bytes, path).await.map(|_| ())
    }

    /// Write `bytes` to `path` and return statistics about the operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use flatmerge::io::writer::PdfWriter;
    /// # use std::path::Path;
    /// # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer.save_with_stats(&bytes, Path::new("flattened.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save_with_stats(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FlatMergeError::FailedToCreateOutput {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }

        let temp_path = temp_path_for(path);
        if let Err(err) = write_file(&temp_path, bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err);
        }

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| FlatMergeError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })?;

        let file_size = tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .unwrap_or(bytes.len() as u64);

        tracing::debug!(path = %path.display(), file_size, "Wrote output file");

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory exists but is not a
    /// writable directory.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        match tokio::fs::metadata(parent).await {
            Ok(metadata) if !metadata.is_dir() => Err(FlatMergeError::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            ))),
            Ok(metadata) if metadata.permissions().readonly() => {
                Err(FlatMergeError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )))
            }
            // Missing directories are created by `save`.
            Ok(_) | Err(_) => Ok(()),
        }
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file =
        tokio::fs::File::create(path)
            .await
            .map_err(|e| FlatMergeError::FailedToCreateOutput {
                path: path.to_path_buf(),
                source: e,
            })?;

    let failed = |e| FlatMergeError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    };
    file.write_all(bytes).await.map_err(failed)?;
    file.sync_all().await.map_err(failed)?;

    Ok(())
}

/// Temp file beside the target so the final rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
}
