//! Assembly of the flattened output document.
//!
//! Every output page holds exactly one image XObject drawn over the full
//! page rectangle from the origin. Pages carry no annotations, form fields
//! or text.

use chrono::{DateTime, FixedOffset};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::config::{Metadata, RenderParameters};
use crate::error::Result;
use crate::merge::metadata::MetadataManager;
use crate::render::{EncodedImage, ImageFilter};

/// PDF version of the output document.
pub const OUTPUT_PDF_VERSION: &str = "1.5";

/// Resource name under which each page references its image.
const IMAGE_RESOURCE: &str = "Im0";

/// Builder for the output document, one image page at a time.
pub struct PageAssembler {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PageAssembler {
    /// Start an empty output document.
    pub fn new() -> Self {
        let mut document = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `image`.
    ///
    /// The page size in points is derived from the bitmap: pixels scaled by
    /// `72 / resolution_dpi`. The declared size of the source page plays no
    /// part.
    pub fn add_image_page(
        &mut self,
        image: EncodedImage,
        params: &RenderParameters,
    ) -> Result<ObjectId> {
        let width = params.pixels_to_points(image.width);
        let height = params.pixels_to_points(image.height);

        let image_id = self.document.add_object(image_xobject(image));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(width),
                        0.into(),
                        0.into(),
                        Object::Real(height),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE => image_id,
                },
            },
            "Contents" => content_id,
        });

        self.kids.push(page_id.into());
        Ok(page_id)
    }

    /// Close the page tree, write the Info dictionary and serialize.
    pub fn finish(
        mut self,
        metadata: &Metadata,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.document.objects.insert(self.pages_id, pages.into());

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        MetadataManager::new().set_metadata(&mut self.document, metadata, created_at)?;

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn image_xobject(image: EncodedImage) -> Stream {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    match image.filter {
        ImageFilter::Dct => dict.set("Filter", "DCTDecode"),
        ImageFilter::Flate => dict.set("Filter", "FlateDecode"),
    }

    // The data is already filtered; lopdf must not compress it again.
    Stream::new(dict, image.data).with_compression(false)
}
