//! Page rasterization through MuPDF.
//!
//! MuPDF handles are not `Send`; everything here runs on the calling thread
//! and callers move the raw bytes, not the handles, between threads.

use image::RgbImage;
use mupdf::{Colorspace, Document, Matrix, Pixmap};

use crate::error::{FlatMergeError, Result};

const PDF_MIME: &str = "application/pdf";

/// Open PDF bytes, refusing empty input and documents that need a password.
pub fn open(bytes: &[u8]) -> Result<Document> {
    if bytes.is_empty() {
        return Err(FlatMergeError::other("Document is empty"));
    }

    let document = Document::from_bytes(bytes, PDF_MIME)?;
    if document.needs_password()? {
        return Err(FlatMergeError::other("Document is password-protected"));
    }

    Ok(document)
}

/// Number of pages in an open document.
pub fn page_count(document: &Document) -> Result<usize> {
    let count = document.page_count()?;
    usize::try_from(count)
        .map_err(|_| FlatMergeError::other(format!("Invalid page count reported: {count}")))
}

/// Rasterize one page into an opaque RGB bitmap.
///
/// The page is scaled uniformly by `scale` (pixels per point). Annotation
/// and widget appearances are drawn, so filled form fields, checkboxes and
/// signatures end up in the bitmap.
pub fn rasterize_page(document: &Document, page_index: usize, scale: f32) -> Result<RgbImage> {
    let index = i32::try_from(page_index)
        .map_err(|_| FlatMergeError::other(format!("Page index {page_index} out of range")))?;

    let page = document.load_page(index)?;
    let matrix = Matrix::new_scale(scale, scale);
    let pixmap = page.to_pixmap(&matrix, &Colorspace::device_rgb(), false, true)?;

    pixmap_to_rgb(&pixmap)
}

/// Copy the color channels of a pixmap into an `RgbImage`, dropping any
/// extra channels and row padding.
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<RgbImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let channels = pixmap.n() as usize;
    let samples = pixmap.samples();

    if width == 0 || height == 0 {
        return Err(FlatMergeError::other("Page rendered to an empty bitmap"));
    }
    if channels < 3 {
        return Err(FlatMergeError::other(format!(
            "Unexpected pixmap layout: {channels} channel(s)"
        )));
    }

    let row_len = width as usize * channels;
    let stride = samples.len() / height as usize;
    if stride < row_len {
        return Err(FlatMergeError::other("Pixmap sample buffer is truncated"));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in samples.chunks(stride).take(height as usize) {
        for pixel in row[..row_len].chunks_exact(channels) {
            rgb.extend_from_slice(&pixel[..3]);
        }
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| FlatMergeError::other("Failed to build RGB bitmap from pixmap"))
}
