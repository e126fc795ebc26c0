//! Rasterization and encoding of source pages.
//!
//! [`render_document`] opens one source document, rasterizes each page in
//! order at the requested resolution, encodes the bitmap and hands it to a
//! sink. The MuPDF handle lives only for the duration of the call.

pub mod encode;
pub mod rasterize;

pub use encode::{EncodedImage, ImageFilter};

use crate::config::RenderParameters;
use crate::error::{FlatMergeError, Result};

/// Open PDF bytes and count their pages.
///
/// Used at registration time; the error is a human-readable reason.
pub fn probe_page_count(bytes: &[u8]) -> std::result::Result<usize, String> {
    let document = rasterize::open(bytes).map_err(|err| err.to_string())?;
    rasterize::page_count(&document).map_err(|err| err.to_string())
}

/// Flatten every page of one document, passing each encoded page to `on_page`
/// in page order.
///
/// Returns the number of pages rendered. Failures are reported as
/// [`FlatMergeError::RenderError`] carrying `document_index` and the page.
#[tracing::instrument(
    level = "debug",
    skip(content, params, on_page),
    fields(size = content.len())
)]
pub fn render_document<F>(
    document_index: usize,
    document_name: &str,
    content: &[u8],
    params: &RenderParameters,
    mut on_page: F,
) -> Result<usize>
where
    F: FnMut(EncodedImage) -> Result<()>,
{
    let document = rasterize::open(content)
        .map_err(|err| FlatMergeError::open_failed(document_index, document_name, err))?;
    let page_count = rasterize::page_count(&document)
        .map_err(|err| FlatMergeError::open_failed(document_index, document_name, err))?;

    let scale = params.scale();
    for page_index in 0..page_count {
        let page_failed =
            |err| FlatMergeError::render_failed(document_index, page_index, document_name, err);

        let bitmap = rasterize::rasterize_page(&document, page_index, scale).map_err(page_failed)?;
        let encoded = encode::encode_page(&bitmap, params).map_err(page_failed)?;

        tracing::trace!(
            page = page_index,
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.byte_size(),
            "Flattened page"
        );
        on_page(encoded)?;
    }

    Ok(page_count)
}

/// Flatten every page of one document into memory.
pub fn render_document_pages(
    document_index: usize,
    document_name: &str,
    content: &[u8],
    params: &RenderParameters,
) -> Result<Vec<EncodedImage>> {
    let mut pages = Vec::new();
    render_document(document_index, document_name, content, params, |page| {
        pages.push(page);
        Ok(())
    })?;
    Ok(pages)
}
