#![no_main]

use flatmerge::config::{ImageCodec, RenderParameters};
use flatmerge::registry::{RegisterOutcome, Registry};
use flatmerge::render;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();

    match registry.register(data, "fuzz.pdf") {
        RegisterOutcome::Registered { page_count, .. } => {
            assert_eq!(registry.len(), 1);
            assert_eq!(registry.total_pages(), page_count);

            // Rendering may fail on malformed content but must not panic.
            if page_count == 1 {
                let params = RenderParameters::new(36, ImageCodec::Jpeg);
                let _ = render::render_document_pages(0, "fuzz.pdf", data, &params);
            }
        }
        RegisterOutcome::Invalid { .. } => assert!(registry.is_empty()),
        RegisterOutcome::Duplicate { .. } => unreachable!("registry was empty"),
    }

    // Registering the same bytes again never grows the registry.
    let before = registry.len();
    registry.register(data, "again.pdf");
    assert_eq!(registry.len(), before);
});
