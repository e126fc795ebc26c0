//! Integration tests for error handling and edge cases.

use flatmerge::config::{Config, ImageCodec, RenderParameters};
use flatmerge::error::FlatMergeError;
use flatmerge::io::PdfReader;
use flatmerge::render;
use flatmerge::{Merger, Registry, Session};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{PAGE_SIZE, Rgb, sized_pdf, solid_pdf};

/// Two documents; the second page of the second one is 100 000 px wide at
/// 36 DPI, which rasterizes fine but exceeds the JPEG dimension limit.
fn registry_with_failing_page() -> Registry {
    let mut registry = Registry::new();
    assert!(registry.register(solid_pdf(&[Rgb::RED]), "cover.pdf").is_registered());
    let wide = sized_pdf(&[
        (PAGE_SIZE, PAGE_SIZE, Rgb::GREEN),
        (200_000.0, 10.0, Rgb::BLUE),
    ]);
    assert!(matches!(
        registry.register(wide, "banner.pdf"),
        flatmerge::RegisterOutcome::Registered { page_count: 2, .. }
    ));
    registry
}

fn assert_page_failure(err: &FlatMergeError) {
    assert!(
        matches!(
            err,
            FlatMergeError::RenderError {
                document_index: 1,
                page_index: Some(1),
                document_name,
                ..
            } if document_name == "banner.pdf"
        ),
        "{err:?}"
    );
    assert!(err.to_string().contains("document #2 (banner.pdf)"));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_error_nonexistent_input() {
    let result = PdfReader::new()
        .load(&PathBuf::from("/nonexistent/file.pdf"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, FlatMergeError::FileNotFound { .. }));
    assert!(err.is_recoverable());
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_directory_as_input() {
    let dir = TempDir::new().unwrap();
    let err = PdfReader::new().load(dir.path()).await.unwrap_err();
    assert!(matches!(err, FlatMergeError::NotAFile { .. }));
}

#[tokio::test]
async fn test_error_empty_merge() {
    let err = Merger::new()
        .flatten_and_merge(Registry::new().snapshot(), &RenderParameters::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FlatMergeError::EmptyInput));
    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_error_resolution_out_of_range() {
    let mut registry = Registry::new();
    registry.register(solid_pdf(&[Rgb::RED]), "a.pdf");

    for dpi in [0, 35, 1201] {
        let params = RenderParameters::new(dpi, ImageCodec::Png);
        let err = Merger::new()
            .flatten_and_merge_blocking(registry.snapshot(), &params)
            .unwrap_err();
        assert!(matches!(err, FlatMergeError::InvalidConfig { .. }), "{dpi}: {err}");
    }
}

#[test]
fn test_error_jpeg_quality_out_of_range() {
    let params = RenderParameters::new(72, ImageCodec::Jpeg).with_jpeg_quality(0);
    assert!(params.validate().is_err());
    assert!(params.with_jpeg_quality(101).validate().is_err());
    assert!(params.with_jpeg_quality(100).validate().is_ok());
}

#[test]
fn test_render_error_names_document() {
    let err = render::render_document_pages(
        2,
        "scan.pdf",
        b"%not really a pdf",
        &RenderParameters::new(72, ImageCodec::Jpeg),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        FlatMergeError::RenderError {
            document_index: 2,
            page_index: None,
            ..
        }
    ));
    assert!(err.to_string().contains("document #3 (scan.pdf)"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_config_rejects_output_equal_to_input() {
    let config = Config {
        inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("out.pdf")],
        output: PathBuf::from("out.pdf"),
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_rejects_verbose_and_quiet() {
    let config = Config {
        inputs: vec![PathBuf::from("a.pdf")],
        output: PathBuf::from("out.pdf"),
        verbose: true,
        quiet: true,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_rejects_empty_input_list() {
    let config = Config {
        output: PathBuf::from("out.pdf"),
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_page_failure_aborts_merge() {
    let registry = registry_with_failing_page();
    let params = RenderParameters::new(36, ImageCodec::Jpeg);

    for jobs in [1, 2] {
        let err = Merger::new()
            .with_jobs(jobs)
            .flatten_and_merge(registry.snapshot(), &params)
            .await
            .unwrap_err();
        assert_page_failure(&err);
    }
}

#[test]
fn test_page_failure_aborts_blocking_merge() {
    let registry = registry_with_failing_page();
    let params = RenderParameters::new(36, ImageCodec::Jpeg);

    let err = Merger::new()
        .flatten_and_merge_blocking(registry.snapshot(), &params)
        .unwrap_err();
    assert_page_failure(&err);
}

#[test]
fn test_page_failure_produces_no_output() {
    let mut session = Session::new();
    for doc in registry_with_failing_page().snapshot() {
        session.register(doc.content().to_vec(), doc.display_name());
    }

    let params = RenderParameters::new(36, ImageCodec::Jpeg);
    let result = session.merge_blocking(&Merger::new(), &params);
    assert_page_failure(&result.unwrap_err());
    assert!(session.last_output().is_none());
}
