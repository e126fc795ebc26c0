//! I/O operations for flatmerge.
//!
//! This module handles all file I/O operations including:
//! - Reading input files into memory
//! - Writing the flattened output to disk
//! - Parallel input reading
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::io::{PdfReader, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let input = reader.load(Path::new("form.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&input.bytes, Path::new("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedInput, PdfReader};
pub use writer::{PdfWriter, WriteStatistics};

use crate::error::Result;
use std::path::Path;

/// Read a single input file.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be read.
pub async fn read_input(path: &Path) -> Result<LoadedInput> {
    PdfReader::new().load(path).await
}

/// Write output bytes atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_output(bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
    PdfWriter::new().save_with_stats(bytes, path).await
}
