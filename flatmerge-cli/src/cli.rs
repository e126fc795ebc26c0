//! CLI argument parsing for flatmerge.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::Parser;
use std::path::PathBuf;

use flatmerge::config::{
    Config, DEFAULT_DPI, DEFAULT_JPEG_QUALITY, ImageCodec, Metadata, OverwriteMode,
    RenderParameters,
};
use flatmerge::error::{FlatMergeError, Result};
use flatmerge::utils::{collect_paths_for_patterns, read_input_list};

/// Flatten PDF files into page images and merge them into one document.
///
/// Every page is rasterized, so filled form fields, checkboxes, signatures
/// and other annotations become part of the page image and can no longer be
/// edited. Pages keep their input order.
#[derive(Parser, Debug)]
#[command(name = "flatmerge")]
#[command(version)]
#[command(
    about = "Flatten PDF files into page images and merge them into one document",
    long_about = None
)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files to flatten (in order)
    ///
    /// Specify multiple files or use glob patterns. Matches of a glob are
    /// sorted by name; files keep the order in which they are given.
    ///
    /// Examples:
    ///   flatmerge form1.pdf form2.pdf -o packet.pdf
    ///   flatmerge 'signed/*.pdf' -o signed.pdf
    #[arg(value_name = "FILE", required_unless_present = "input_list")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    ///
    /// Use --force to overwrite existing files without confirmation.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Rasterization resolution in dots per inch (36-1200)
    ///
    /// Higher values give sharper pages and larger files.
    #[arg(long, value_name = "DPI", env = "FLATMERGE_DPI", default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Image codec for the flattened pages
    ///
    /// - jpeg: Lossy, small files (default)
    /// - png: Lossless, larger files
    #[arg(long, value_name = "CODEC", env = "FLATMERGE_CODEC", default_value = "jpeg")]
    #[arg(value_parser = ["jpeg", "jpg", "png"])]
    pub codec: String,

    /// JPEG quality (1-100), ignored for PNG
    #[arg(
        long,
        value_name = "N",
        env = "FLATMERGE_JPEG_QUALITY",
        default_value_t = DEFAULT_JPEG_QUALITY
    )]
    pub quality: u8,

    /// Dry run - register inputs and show the merge order without rendering
    ///
    /// Reads every input, reports duplicates and unreadable files, then
    /// lists what would be flattened without creating the output file.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show details about each document and the run
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    ///
    /// By default, flatmerge will prompt before overwriting an existing file.
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    ///
    /// If the output file already exists, exit with an error
    /// instead of prompting or overwriting.
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Continue processing even if some files cannot be read
    ///
    /// By default, flatmerge stops on the first unreadable file.
    /// With this flag, such files are skipped with a warning.
    /// Files that are not valid PDFs are always skipped.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Read input file list from a file (one path per line)
    ///
    /// Lines starting with '#' are ignored. Paths from the list are
    /// appended after the inputs given on the command line.
    ///
    /// Example:
    ///   flatmerge --input-list files.txt -o output.pdf
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Number of documents rendered in parallel
    ///
    /// Default is number of CPU cores. Use 1 for sequential processing.
    #[arg(short, long, value_name = "N", env = "FLATMERGE_JOBS")]
    pub jobs: Option<usize>,

    /// Print a JSON report of the run to stdout
    ///
    /// Human-readable messages are moved to stderr.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config over `inputs`, the
    /// paths returned by [`get_all_inputs`](Self::get_all_inputs).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The image codec is invalid
    /// - Configuration validation fails
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let image_codec: ImageCodec = self.codec.parse()?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            inputs,
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            continue_on_error: self.continue_on_error,
            jobs: self.jobs,
            render: RenderParameters::new(self.dpi, image_codec).with_jpeg_quality(self.quality),
            metadata,
        };

        config.validate().map_err(|e| {
            FlatMergeError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early validation that doesn't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(FlatMergeError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(FlatMergeError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        let image_codec: ImageCodec = self.codec.parse()?;
        RenderParameters::new(self.dpi, image_codec)
            .with_jpeg_quality(self.quality)
            .validate()
    }

    /// Get all input paths: expanded globs followed by the input list.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is malformed, the input list file cannot
    /// be read, or no inputs remain.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs =
            collect_paths_for_patterns(self.inputs.iter().map(|p| p.to_string_lossy()))?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        if all_inputs.is_empty() {
            return Err(FlatMergeError::EmptyInput);
        }

        Ok(all_inputs)
    }
}
