//! Configuration module for flatmerge.
//!
//! This module holds the rendering parameters that drive flattening and the
//! validated, normalized configuration the CLI derives from its arguments. It
//! handles:
//! - Validation of render parameters and argument combinations
//! - Parsing of codecs and overwrite modes
//! - Application of defaults
//! - Output metadata

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::FlatMergeError;

/// Default rasterization resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 200;

/// Lowest accepted rasterization resolution.
pub const MIN_DPI: u32 = 36;

/// Highest accepted rasterization resolution.
pub const MAX_DPI: u32 = 1200;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Image codec used to store each flattened page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCodec {
    /// Lossy JPEG at the configured quality.
    #[default]
    Jpeg,
    /// Lossless: raw RGB samples, zlib-compressed (`/FlateDecode`).
    Png,
}

impl ImageCodec {
    /// Short lowercase name of the codec.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageCodec {
    type Err = FlatMergeError;

    /// Parse an image codec from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "jpeg", "jpg" or "png" (any case)
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(FlatMergeError::invalid_config(format!(
                "Invalid image codec: {s}. Must be one of: jpeg, png"
            ))),
        }
    }
}

/// Parameters controlling how every page is rasterized and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParameters {
    /// Dots per inch used to rasterize each page.
    pub resolution_dpi: u32,

    /// Codec used to store the page bitmaps.
    pub image_codec: ImageCodec,

    /// JPEG quality (1-100). Ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            resolution_dpi: DEFAULT_DPI,
            image_codec: ImageCodec::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl RenderParameters {
    /// Create parameters for the given resolution and codec with default quality.
    pub fn new(resolution_dpi: u32, image_codec: ImageCodec) -> Self {
        Self {
            resolution_dpi,
            image_codec,
            ..Default::default()
        }
    }

    /// Return a copy with a different JPEG quality.
    pub fn with_jpeg_quality(self, jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality,
            ..self
        }
    }

    /// Scale factor from PDF points (1/72 inch) to output pixels.
    pub fn scale(&self) -> f32 {
        self.resolution_dpi as f32 / 72.0
    }

    /// Convert a pixel length of the rendered bitmap back to PDF points.
    pub fn pixels_to_points(&self, pixels: u32) -> f32 {
        pixels as f32 * 72.0 / self.resolution_dpi as f32
    }

    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution is outside `MIN_DPI..=MAX_DPI` or
    /// the JPEG quality is outside `1..=100`.
    pub fn validate(&self) -> crate::Result<()> {
        if !(MIN_DPI..=MAX_DPI).contains(&self.resolution_dpi) {
            return Err(FlatMergeError::invalid_config(format!(
                "Invalid resolution: {} DPI. Must be between {MIN_DPI} and {MAX_DPI}",
                self.resolution_dpi
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(FlatMergeError::invalid_config(format!(
                "Invalid JPEG quality: {}. Must be between 1 and 100",
                self.jpeg_quality
            )));
        }

        Ok(())
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

impl FromStr for OverwriteMode {
    type Err = FlatMergeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "force" => Ok(Self::Force),
            "no-clobber" | "noclobber" => Ok(Self::NoClobber),
            _ => Err(FlatMergeError::invalid_config(format!(
                "Invalid overwrite mode: {s}. Must be one of: prompt, force, no-clobber"
            ))),
        }
    }
}

/// Complete configuration for a flatten-and-merge run.
///
/// This structure contains all settings needed to perform a merge,
/// derived and validated from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input PDF file paths (in merge order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - register and list inputs without rendering.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Skip unreadable input files instead of stopping.
    pub continue_on_error: bool,

    /// Number of parallel render jobs (None = auto-detect).
    pub jobs: Option<usize>,

    /// Rasterization and encoding parameters.
    pub render: RenderParameters,

    /// Metadata to set on the output document.
    pub metadata: Metadata,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    /// - Render parameters are out of range
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.jobs == Some(0) {
            bail!("Number of jobs must be at least 1");
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        self.render.validate()?;

        Ok(())
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
