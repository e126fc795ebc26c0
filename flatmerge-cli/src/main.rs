//! flatmerge - Flatten PDF files into page images and merge them into one document.
//!
//! Command-line front end for the `flatmerge` library.

mod cli;

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use flatmerge::config::Config;
use flatmerge::error::FlatMergeError;
use flatmerge::io::{LoadedInput, PdfReader, PdfWriter, WriteStatistics};
use flatmerge::merge::{MergeStatistics, Merger};
use flatmerge::output::{
    OutputFormatter, ProgressBar, display_load_statistics, display_merge_order,
    display_merge_summary, display_registration,
};
use flatmerge::registry::{DocumentSummary, RegisterOutcome, Registry};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(&cli);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Log to stderr; `RUST_LOG` overrides the level derived from the flags.
fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "flatmerge=debug,warn"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// A file skipped during the run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkippedInput {
    path: PathBuf,
    reason: String,
}

/// Machine-readable report printed with `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    output: Option<&'a Path>,
    dry_run: bool,
    documents: Vec<DocumentSummary>,
    skipped: &'a [SkippedInput],
    statistics: Option<&'a MergeStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_bytes: Option<u64>,
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), FlatMergeError> {
    // Validate CLI arguments
    cli.validate()?;

    // Expand globs and the input list
    let all_inputs = cli.get_all_inputs().await?;

    // Convert CLI to config
    let config = cli.to_config(all_inputs)?;

    let formatter = if cli.json {
        OutputFormatter::from_config(&config).reserve_stdout()
    } else {
        OutputFormatter::from_config(&config)
    };

    formatter.debug(&format!("{} v{}", flatmerge::NAME, flatmerge::VERSION));

    // Read and register every input
    let mut skipped = Vec::new();
    let loaded = load_inputs(&config, &formatter, &mut skipped).await?;
    let registry = register_inputs(loaded, &formatter, &mut skipped);

    if registry.is_empty() {
        return Err(FlatMergeError::EmptyInput);
    }

    // Dry run mode - stop here
    if config.dry_run {
        display_merge_order(&formatter, &registry);
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));

        if cli.json {
            print_report(&RunReport {
                output: None,
                dry_run: true,
                documents: registry.iter().map(|doc| doc.summary()).collect(),
                skipped: &skipped,
                statistics: None,
                output_bytes: None,
            })?;
        }
        return Ok(());
    }

    // Handle output file existence
    handle_output_overwrite(&config, &formatter).await?;

    // Flatten
    formatter.info(&format!(
        "Flattening {} document(s), {} page(s) at {} DPI...",
        registry.len(),
        registry.total_pages(),
        config.render.resolution_dpi
    ));

    let merger = Merger::new()
        .with_jobs(config.effective_jobs())
        .with_metadata(config.metadata.clone());

    let mut progress = if formatter.is_quiet() {
        ProgressBar::disabled()
    } else {
        ProgressBar::for_pages(registry.total_pages())
    };

    let result = merger
        .flatten_and_merge_with_progress(registry.snapshot(), &config.render, |page| {
            progress.observe(&page)
        })
        .await;
    match &result {
        Ok(_) => progress.finish(),
        Err(_) => progress.clear(),
    }
    let result = result?;

    // Write the output
    let write_stats = write_output(&result.output_bytes, &config).await?;

    display_merge_summary(&formatter, &result.statistics, &write_stats);
    if !config.metadata.is_empty() {
        formatter.detail("Metadata", "Set");
    }

    if cli.json {
        print_report(&RunReport {
            output: Some(&write_stats.output_path),
            dry_run: false,
            documents: registry.iter().map(|doc| doc.summary()).collect(),
            skipped: &skipped,
            statistics: Some(&result.statistics),
            output_bytes: Some(write_stats.file_size),
        })?;
    }

    Ok(())
}

/// Read every input file. Unreadable files stop the run unless
/// `--continue-on-error` is set.
async fn load_inputs(
    config: &Config,
    formatter: &OutputFormatter,
    skipped: &mut Vec<SkippedInput>,
) -> Result<Vec<LoadedInput>, FlatMergeError> {
    formatter.info(&format!("Reading {} file(s)...", config.inputs.len()));

    let reader = PdfReader::new();
    let (results, stats) = reader
        .load_all(&config.inputs, config.effective_jobs())
        .await;

    let mut loaded = Vec::with_capacity(results.len());
    for (path, result) in config.inputs.iter().zip(results) {
        match result {
            Ok(input) => loaded.push(input),
            Err(err) if config.continue_on_error && err.is_recoverable() => {
                formatter.warning(&format!("Skipping {}: {err}", path.display()));
                skipped.push(SkippedInput {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    display_load_statistics(formatter, &stats);
    Ok(loaded)
}

/// Register loaded files in input order. Duplicates and invalid PDFs are
/// reported and skipped.
fn register_inputs(
    loaded: Vec<LoadedInput>,
    formatter: &OutputFormatter,
    skipped: &mut Vec<SkippedInput>,
) -> Registry {
    let mut registry = Registry::new();

    for input in loaded {
        let outcome = registry.register(input.bytes, &input.display_name);
        display_registration(formatter, &input.display_name, &outcome, &registry);

        match outcome {
            RegisterOutcome::Registered { .. } => {}
            RegisterOutcome::Duplicate { existing } => skipped.push(SkippedInput {
                path: input.path,
                reason: format!(
                    "Duplicate of {}",
                    registry
                        .get(existing)
                        .map(|doc| doc.display_name())
                        .unwrap_or("an earlier file")
                ),
            }),
            RegisterOutcome::Invalid { reason } => skipped.push(SkippedInput {
                path: input.path,
                reason,
            }),
        }
    }

    registry
}

async fn write_output(bytes: &[u8], config: &Config) -> Result<WriteStatistics, FlatMergeError> {
    let writer = PdfWriter::new();
    writer.can_write(&config.output).await?;
    writer.save_with_stats(bytes, &config.output).await
}

fn print_report(report: &RunReport<'_>) -> Result<(), FlatMergeError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| FlatMergeError::other(format!("Failed to serialize report: {err}")))?;
    println!("{json}");
    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), FlatMergeError> {
    use flatmerge::config::OverwriteMode;

    // Check if output exists
    if !PdfWriter::new().exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(FlatMergeError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // In quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(FlatMergeError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            eprint!("Overwrite? [y/N]: ");
            io::stderr().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| FlatMergeError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(FlatMergeError::Cancelled)
            }
        }
    }
}
