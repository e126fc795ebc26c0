//! Bitmap encoding for embedding in the output PDF.
//!
//! JPEG output is embedded as-is with `/DCTDecode`. Lossless output is the
//! raw RGB samples zlib-compressed and embedded with `/FlateDecode`, which
//! PDF readers decode natively.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::config::{ImageCodec, RenderParameters};
use crate::error::Result;

/// How the bytes of an [`EncodedImage`] must be decoded by a PDF reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// Baseline JPEG (`/DCTDecode`).
    Dct,
    /// zlib-compressed RGB samples (`/FlateDecode`).
    Flate,
}

/// A page bitmap encoded for embedding as an image XObject.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Filtered image data.
    pub data: Vec<u8>,
    /// Filter needed to decode `data`.
    pub filter: ImageFilter,
}

impl EncodedImage {
    /// Size of the encoded data in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

/// Encode a bitmap with the codec selected in `params`.
pub fn encode_page(bitmap: &RgbImage, params: &RenderParameters) -> Result<EncodedImage> {
    match params.image_codec {
        ImageCodec::Jpeg => encode_jpeg(bitmap, params.jpeg_quality),
        ImageCodec::Png => encode_lossless(bitmap),
    }
}

fn encode_jpeg(bitmap: &RgbImage, quality: u8) -> Result<EncodedImage> {
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality).write_image(
        bitmap.as_raw(),
        bitmap.width(),
        bitmap.height(),
        ExtendedColorType::Rgb8,
    )?;

    Ok(EncodedImage {
        width: bitmap.width(),
        height: bitmap.height(),
        data,
        filter: ImageFilter::Dct,
    })
}

fn encode_lossless(bitmap: &RgbImage) -> Result<EncodedImage> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bitmap.as_raw())?;
    let data = encoder.finish()?;

    Ok(EncodedImage {
        width: bitmap.width(),
        height: bitmap.height(),
        data,
        filter: ImageFilter::Flate,
    })
}
