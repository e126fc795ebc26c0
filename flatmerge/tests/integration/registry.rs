//! Integration tests for document registration and ordering.

use flatmerge::error::FlatMergeError;
use flatmerge::registry::{DocumentId, RegisterOutcome, Registry};

use crate::common::{Rgb, form_pdf, solid_pdf};

fn id_of(outcome: RegisterOutcome) -> DocumentId {
    match outcome {
        RegisterOutcome::Registered { id, .. } => id,
        other => panic!("expected registration, got {other:?}"),
    }
}

#[test]
fn test_register_reports_pages_and_size() {
    let bytes = solid_pdf(&[Rgb::RED, Rgb::GREEN, Rgb::BLUE]);
    let size = bytes.len();
    let mut registry = Registry::new();

    match registry.register(bytes, "three.pdf") {
        RegisterOutcome::Registered {
            page_count,
            byte_size,
            ..
        } => {
            assert_eq!(page_count, 3);
            assert_eq!(byte_size, size);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(registry.total_pages(), 3);
}

#[test]
fn test_duplicate_is_idempotent_regardless_of_name() {
    let bytes = solid_pdf(&[Rgb::RED]);
    let mut registry = Registry::new();

    let first = id_of(registry.register(bytes.clone(), "scan.pdf"));
    let second = registry.register(bytes.clone(), "scan (1).pdf");
    let third = registry.register(bytes, "scan.pdf");

    assert_eq!(second, RegisterOutcome::Duplicate { existing: first });
    assert_eq!(third, RegisterOutcome::Duplicate { existing: first });
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.snapshot()[0].display_name(), "scan.pdf");
}

#[test]
fn test_invalid_inputs_leave_registry_unchanged() {
    let mut registry = Registry::new();
    id_of(registry.register(solid_pdf(&[Rgb::BLUE]), "good.pdf"));

    for (bytes, name) in [
        (Vec::new(), "empty.pdf"),
        (b"\x89PNG\r\n\x1a\nnot a pdf".to_vec(), "image.png"),
    ] {
        let outcome = registry.register(bytes, name);
        assert!(
            matches!(outcome, RegisterOutcome::Invalid { .. }),
            "{name}: {outcome:?}"
        );
    }

    assert_eq!(registry.len(), 1);
}

#[test]
fn test_form_documents_register() {
    let mut registry = Registry::new();
    assert!(matches!(
        registry.register(form_pdf(), "application.pdf"),
        RegisterOutcome::Registered { page_count: 1, .. }
    ));
}

#[test]
fn test_reorder_then_snapshot() {
    let mut registry = Registry::new();
    let a = id_of(registry.register(solid_pdf(&[Rgb::RED]), "a.pdf"));
    let b = id_of(registry.register(solid_pdf(&[Rgb::GREEN]), "b.pdf"));
    let c = id_of(registry.register(solid_pdf(&[Rgb::BLUE]), "c.pdf"));

    registry.reorder(&[b, c, a]).unwrap();

    let names: Vec<_> = registry.iter().map(|doc| doc.display_name()).collect();
    assert_eq!(names, ["b.pdf", "c.pdf", "a.pdf"]);
}

#[test]
fn test_reorder_rejects_non_permutation() {
    let mut registry = Registry::new();
    let a = id_of(registry.register(solid_pdf(&[Rgb::RED]), "a.pdf"));
    let b = id_of(registry.register(solid_pdf(&[Rgb::GREEN]), "b.pdf"));

    for order in [vec![a], vec![a, a], vec![a, DocumentId::new()], vec![a, b, b]] {
        let err = registry.reorder(&order).unwrap_err();
        assert!(matches!(err, FlatMergeError::InvalidPermutation { .. }));
    }

    assert_eq!(registry.position(a), Some(0));
    assert_eq!(registry.position(b), Some(1));
}

#[test]
fn test_move_and_remove() {
    let mut registry = Registry::new();
    let a = id_of(registry.register(solid_pdf(&[Rgb::RED]), "a.pdf"));
    let b = id_of(registry.register(solid_pdf(&[Rgb::GREEN]), "b.pdf"));

    assert!(registry.move_by(b, -1));
    assert_eq!(registry.position(b), Some(0));

    assert!(registry.remove(a));
    assert!(!registry.remove(a));
    assert_eq!(registry.len(), 1);

    // The removed content can be registered again.
    assert!(registry.register(solid_pdf(&[Rgb::RED]), "a.pdf").is_registered());
}
