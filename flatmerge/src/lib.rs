//! flatmerge - Flatten PDF files into images and merge them into one document.
//!
//! Every page of every input is rasterized at a chosen resolution, so form
//! fields, annotations and other interactive content are baked into the
//! page image. The images are then assembled, in order, into a single new
//! PDF. This library provides:
//!
//! - A deduplicating, reorderable registry of source documents
//! - Page rasterization (MuPDF) with JPEG or lossless Flate encoding
//! - Output assembly with metadata
//! - Order-preserving parallel rendering
//! - File I/O helpers and user-facing output for the CLI
//!
//! # Examples
//!
//! ## Flatten two files
//!
//! ```no_run
//! use flatmerge::config::{ImageCodec, RenderParameters};
//! use flatmerge::{Merger, Registry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.register(std::fs::read("a.pdf")?, "a.pdf");
//! registry.register(std::fs::read("b.pdf")?, "b.pdf");
//!
//! let params = RenderParameters::new(200, ImageCodec::Jpeg);
//! let result = Merger::new().flatten_and_merge(registry.snapshot(), &params).await?;
//! std::fs::write("flattened.pdf", &result.output_bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! ```no_run
//! use flatmerge::config::RenderParameters;
//! use flatmerge::{Merger, Session};
//!
//! # fn example(upload: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new();
//! session.register(upload, "upload.pdf");
//!
//! let artifact = session.merge_blocking(&Merger::new(), &RenderParameters::default())?;
//! println!("{} ({} pages)", artifact.file_name, artifact.total_pages);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod registry;
pub mod render;
pub mod session;
pub mod utils;

#[cfg(test)]
#[path = "../tests/integration/common.rs"]
mod test_support;

// Re-export commonly used types
pub use config::{Config, ImageCodec, RenderParameters};
pub use error::{FlatMergeError, Result};
pub use merge::{MergeResult, Merger};
pub use registry::{RegisterOutcome, Registry};
pub use session::{OutputArtifact, Session};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
