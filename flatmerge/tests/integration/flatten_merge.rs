//! Integration tests for flattening and merging.

use flatmerge::config::{ImageCodec, Metadata, RenderParameters};
use flatmerge::error::FlatMergeError;
use flatmerge::merge::{self, MetadataManager, Merger};
use flatmerge::registry::{RegisterOutcome, Registry};
use lopdf::Document;
use rstest::rstest;

use crate::common::{Rgb, form_pdf, page_image, sample_center, solid_pdf};

const TOLERANCE: u8 = 40;

fn registry_of(docs: &[Vec<u8>]) -> Registry {
    let mut registry = Registry::new();
    for (idx, bytes) in docs.iter().enumerate() {
        let outcome = registry.register(bytes.clone(), &format!("doc{idx}.pdf"));
        assert!(outcome.is_registered(), "{outcome:?}");
    }
    registry
}

fn assert_color(pdf: &[u8], page_index: usize, expected: Rgb) {
    let pixel = sample_center(pdf, page_index);
    assert!(
        expected.is_close(pixel, TOLERANCE),
        "page {page_index}: expected {expected:?}, got {pixel:?}"
    );
}

#[test]
fn test_pages_follow_document_then_page_order() {
    let a = solid_pdf(&[Rgb::RED, Rgb::GREEN]);
    let b = solid_pdf(&[Rgb::BLUE, Rgb::RED, Rgb::GREEN]);
    let registry = registry_of(&[a, b]);

    let params = RenderParameters::new(72, ImageCodec::Jpeg);
    let result = merge::flatten_and_merge_blocking(registry.snapshot(), &params).unwrap();

    assert_eq!(result.total_pages, 5);
    assert_eq!(Document::load_mem(&result.output_bytes).unwrap().get_pages().len(), 5);

    let expected = [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::RED, Rgb::GREEN];
    for (page_index, color) in expected.into_iter().enumerate() {
        assert_color(&result.output_bytes, page_index, color);
    }
}

#[test]
fn test_reorder_changes_output_order() {
    let mut registry = registry_of(&[solid_pdf(&[Rgb::RED]), solid_pdf(&[Rgb::BLUE])]);
    let ids: Vec<_> = registry.iter().map(|doc| doc.id()).collect();
    registry.reorder(&[ids[1], ids[0]]).unwrap();

    let params = RenderParameters::new(72, ImageCodec::Png);
    let result = merge::flatten_and_merge_blocking(registry.snapshot(), &params).unwrap();

    assert_color(&result.output_bytes, 0, Rgb::BLUE);
    assert_color(&result.output_bytes, 1, Rgb::RED);
}

#[test]
fn test_resolution_scales_images_not_pages() {
    let registry = registry_of(&[solid_pdf(&[Rgb::GREEN])]);
    let merger = Merger::new();

    let at_dpi = |dpi| {
        let params = RenderParameters::new(dpi, ImageCodec::Png);
        merger
            .flatten_and_merge_blocking(registry.snapshot(), &params)
            .unwrap()
    };
    let low = at_dpi(150);
    let high = at_dpi(300);

    let low = page_image(&low.output_bytes, 1);
    let high = page_image(&high.output_bytes, 1);

    // 144 pt at 150 and 300 DPI
    assert_eq!((low.width, low.height), (300, 300));
    assert_eq!((high.width, high.height), (600, 600));

    for (l, h) in low.media_box.iter().zip(high.media_box) {
        assert!((l - h).abs() < 0.5, "{:?} vs {:?}", low.media_box, high.media_box);
    }
    assert!((low.media_box[2] - 144.0).abs() < 0.5);
}

#[rstest]
#[case(ImageCodec::Jpeg, "DCTDecode")]
#[case(ImageCodec::Png, "FlateDecode")]
fn test_codec_selects_filter(#[case] codec: ImageCodec, #[case] filter: &str) {
    let registry = registry_of(&[solid_pdf(&[Rgb::RED, Rgb::BLUE])]);
    let result = merge::flatten_and_merge_blocking(
        registry.snapshot(),
        &RenderParameters::new(72, codec),
    )
    .unwrap();

    for page in 1..=2 {
        assert_eq!(page_image(&result.output_bytes, page).filter, filter);
    }
}

#[test]
fn test_png_output_is_lossless() {
    let source = solid_pdf(&[Rgb::BLUE]);
    let registry = registry_of(&[source.clone()]);

    let result = merge::flatten_and_merge_blocking(
        registry.snapshot(),
        &RenderParameters::new(72, ImageCodec::Png),
    )
    .unwrap();

    let original = sample_center(&source, 0);
    let flattened = sample_center(&result.output_bytes, 0);
    let original = Rgb(original[0], original[1], original[2]);
    assert!(original.is_close(flattened, 2), "{original:?} vs {flattened:?}");
}

#[test]
fn test_widget_appearance_is_baked_into_page() {
    let source = form_pdf();
    assert_color(&source, 0, Rgb::DARK);

    let registry = registry_of(&[source]);
    let result = merge::flatten_and_merge_blocking(
        registry.snapshot(),
        &RenderParameters::new(144, ImageCodec::Png),
    )
    .unwrap();

    assert_color(&result.output_bytes, 0, Rgb::DARK);

    let document = Document::load_mem(&result.output_bytes).unwrap();
    let page_id = document.get_pages()[&1];
    let page = document.get_dictionary(page_id).unwrap();
    assert!(page.get(b"Annots").is_err());
    assert!(document.catalog().unwrap().get(b"AcroForm").is_err());
}

#[tokio::test]
async fn test_async_matches_blocking_order() {
    let registry = registry_of(&[
        solid_pdf(&[Rgb::RED]),
        solid_pdf(&[Rgb::GREEN, Rgb::BLUE]),
        solid_pdf(&[Rgb::BLUE, Rgb::RED, Rgb::GREEN]),
        solid_pdf(&[Rgb::GREEN]),
    ]);
    let params = RenderParameters::new(72, ImageCodec::Png);
    let merger = Merger::new().with_jobs(4);

    let parallel = merger
        .flatten_and_merge(registry.snapshot(), &params)
        .await
        .unwrap();
    let sequential = merger
        .flatten_and_merge_blocking(registry.snapshot(), &params)
        .unwrap();

    assert_eq!(parallel.total_pages, 7);
    assert_eq!(parallel.total_pages, sequential.total_pages);
    for page_index in 0..parallel.total_pages {
        assert_eq!(
            sample_center(&parallel.output_bytes, page_index),
            sample_center(&sequential.output_bytes, page_index),
            "page {page_index}"
        );
    }
}

#[test]
fn test_removed_document_is_not_merged() {
    let mut registry = Registry::new();
    let a = match registry.register(solid_pdf(&[Rgb::RED, Rgb::RED]), "a.pdf") {
        RegisterOutcome::Registered { id, .. } => id,
        other => panic!("{other:?}"),
    };
    registry.register(solid_pdf(&[Rgb::GREEN, Rgb::BLUE, Rgb::GREEN]), "b.pdf");

    assert!(registry.remove(a));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.snapshot()[0].display_name(), "b.pdf");

    let result = merge::flatten_and_merge_blocking(
        registry.snapshot(),
        &RenderParameters::new(72, ImageCodec::Jpeg),
    )
    .unwrap();
    assert_eq!(result.total_pages, 3);
    assert_color(&result.output_bytes, 0, Rgb::GREEN);
}

#[test]
fn test_metadata_written_to_info() {
    let registry = registry_of(&[solid_pdf(&[Rgb::RED])]);
    let metadata = Metadata::new(
        Some("Signed forms".to_string()),
        Some("Records office".to_string()),
        None,
        Some("forms, 2024".to_string()),
    );
    let merger = Merger::new().with_metadata(metadata.clone());

    let params = RenderParameters::new(72, ImageCodec::Jpeg);
    let result = merger
        .flatten_and_merge_blocking(registry.snapshot(), &params)
        .unwrap();

    let document = Document::load_mem(&result.output_bytes).unwrap();
    let manager = MetadataManager::new();
    assert_eq!(manager.get_metadata(&document), metadata);
    assert_eq!(manager.get_field(&document, "Creator").as_deref(), Some("flatmerge"));
    assert!(manager.get_field(&document, "CreationDate").is_some());
}

#[test]
fn test_empty_registry_is_rejected() {
    let registry = Registry::new();
    let params = RenderParameters::default();
    let result = merge::flatten_and_merge_blocking(registry.snapshot(), &params);
    assert!(matches!(result, Err(FlatMergeError::EmptyInput)));
}
