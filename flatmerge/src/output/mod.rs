//! Output formatting and display for flatmerge.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Page progress
//! - Registration notices
//! - Merge order listings and summary reports
//!
//! # Examples
//!
//! ```no_run
//! use flatmerge::output::OutputFormatter;
//! use flatmerge::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Flattening 3 document(s)");
//! formatter.success("Done");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::io::{LoadStatistics, WriteStatistics};
use crate::merge::MergeStatistics;
use crate::registry::{RegisterOutcome, Registry};
use crate::utils::format_file_size;

/// Report the outcome of registering one file.
pub fn display_registration(
    formatter: &OutputFormatter,
    display_name: &str,
    outcome: &RegisterOutcome,
    registry: &Registry,
) {
    match outcome {
        RegisterOutcome::Registered {
            page_count,
            byte_size,
            ..
        } => formatter.debug(&format!(
            "Added {display_name}: {page_count} page(s), {}",
            format_file_size(*byte_size as u64)
        )),
        RegisterOutcome::Duplicate { existing } => {
            let original = registry
                .get(*existing)
                .map(|doc| doc.display_name())
                .unwrap_or("an earlier file");
            formatter.info(&format!(
                "Skipping {display_name}: same content as {original}"
            ));
        }
        RegisterOutcome::Invalid { reason } => {
            formatter.warning(&format!("Skipping {display_name}: {reason}"));
        }
    }
}

/// List the registered documents in merge order.
pub fn display_merge_order(formatter: &OutputFormatter, registry: &Registry) {
    formatter.section("Merge order:");
    for (idx, doc) in registry.iter().enumerate() {
        formatter.list_item(
            idx + 1,
            &format!(
                "{} ({} page(s), {})",
                doc.display_name(),
                doc.page_count(),
                doc.human_size()
            ),
        );
        formatter.detail("Checksum", &doc.content_hash().to_hex());
    }
    formatter.info(&format!(
        "Total: {} document(s), {} page(s), {}",
        registry.len(),
        registry.total_pages(),
        format_file_size(registry.total_bytes())
    ));
}

/// Display load statistics to the user.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!(
            "{} file(s) could not be read",
            stats.failure_count
        ));
    }

    formatter.debug(&format!(
        "Read {} file(s) in {:.2}s: {}",
        stats.success_count,
        stats.total_time.as_secs_f64(),
        stats.format_total_size()
    ));
}

/// Display the final summary of a run.
pub fn display_merge_summary(
    formatter: &OutputFormatter,
    merge: &MergeStatistics,
    write: &WriteStatistics,
) {
    formatter.success(&format!(
        "Flattened {} document(s) into {} page(s): {}",
        merge.documents_merged,
        merge.total_pages,
        write.output_path.display()
    ));
    formatter.detail(
        "Rendering",
        &format!("{} DPI, {}", merge.resolution_dpi, merge.image_codec),
    );
    formatter.detail("Input size", &merge.format_input_size());
    formatter.detail("Output size", &write.format_file_size());
    formatter.detail(
        "Time",
        &format!(
            "{:.2}s render, {:.2}s write",
            merge.render_time.as_secs_f64(),
            write.write_time.as_secs_f64()
        ),
    );
}
