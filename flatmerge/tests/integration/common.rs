//! Shared fixtures for flatmerge tests.
//!
//! PDFs are generated in memory with lopdf so that tests do not depend on
//! files checked into the repository. Pages are filled with a single color,
//! which makes it easy to tell which source page an output page came from.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use mupdf::{Colorspace, Matrix};

/// Side of the square pages produced by [`solid_pdf`], in points.
pub const PAGE_SIZE: f32 = 144.0;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(220, 20, 20);
    pub const GREEN: Rgb = Rgb(20, 180, 40);
    pub const BLUE: Rgb = Rgb(30, 40, 210);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const DARK: Rgb = Rgb(25, 25, 25);

    /// Whether `pixel` is within `tolerance` of this color on every channel.
    pub fn is_close(self, pixel: [u8; 3], tolerance: u8) -> bool {
        let Rgb(r, g, b) = self;
        [r, g, b]
            .iter()
            .zip(pixel)
            .all(|(&want, got)| want.abs_diff(got) <= tolerance)
    }

    fn fill_operator(self) -> Operation {
        let Rgb(r, g, b) = self;
        Operation::new(
            "rg",
            vec![
                Object::Real(r as f32 / 255.0),
                Object::Real(g as f32 / 255.0),
                Object::Real(b as f32 / 255.0),
            ],
        )
    }
}

/// A PDF with one `PAGE_SIZE` square page per color.
pub fn solid_pdf(colors: &[Rgb]) -> Vec<u8> {
    let pages: Vec<_> = colors
        .iter()
        .map(|&color| (PAGE_SIZE, PAGE_SIZE, color))
        .collect();
    sized_pdf(&pages)
}

/// A PDF with one page per `(width, height, color)` entry, sizes in points.
pub fn sized_pdf(pages: &[(f32, f32, Rgb)]) -> Vec<u8> {
    let mut builder = FixtureBuilder::new();
    for &(width, height, color) in pages {
        let content = fill_rect(color, 0.0, 0.0, width, height);
        builder.add_page(width, height, content, None);
    }
    builder.finish(None)
}

/// A single-page PDF with a text field widget in the middle of a white page.
///
/// The widget's appearance stream paints its rectangle `Rgb::DARK`. The
/// page content itself is plain white, so the dark square only shows up when
/// the widget is rendered.
pub fn form_pdf() -> Vec<u8> {
    let mut builder = FixtureBuilder::new();
    let page_id = builder.document.new_object_id();

    let side = PAGE_SIZE / 3.0;
    let appearance = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), Object::Real(side), Object::Real(side)],
        },
        fill_rect(Rgb::DARK, 0.0, 0.0, side, side),
    );
    let appearance_id = builder.document.add_object(appearance);

    let widget_id = builder.document.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("applicant"),
        "F" => 4,
        "Rect" => vec![
            Object::Real(side),
            Object::Real(side),
            Object::Real(2.0 * side),
            Object::Real(2.0 * side),
        ],
        "P" => page_id,
        "AP" => dictionary! { "N" => appearance_id },
    });

    let content = fill_rect(Rgb::WHITE, 0.0, 0.0, PAGE_SIZE, PAGE_SIZE);
    builder.insert_page(
        page_id,
        PAGE_SIZE,
        PAGE_SIZE,
        content,
        Some(vec![widget_id.into()]),
    );

    builder.finish(Some(dictionary! {
        "Fields" => vec![Object::Reference(widget_id)],
    }))
}

/// Render a page with MuPDF at 72 DPI, annotations included, and return the
/// color of its center pixel.
pub fn sample_center(pdf: &[u8], page_index: usize) -> [u8; 3] {
    let document = mupdf::Document::from_bytes(pdf, "application/pdf").unwrap();
    let page = document.load_page(page_index as i32).unwrap();
    let pixmap = page
        .to_pixmap(
            &Matrix::new_scale(1.0, 1.0),
            &Colorspace::device_rgb(),
            false,
            true,
        )
        .unwrap();

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let channels = pixmap.n() as usize;
    let samples = pixmap.samples();
    let stride = samples.len() / height;

    let offset = (height / 2) * stride + (width / 2) * channels;
    [samples[offset], samples[offset + 1], samples[offset + 2]]
}

/// Image XObject properties of one output page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub width: i64,
    pub height: i64,
    pub filter: String,
    pub media_box: [f32; 4],
}

/// Inspect the single image drawn on page `page_number` (1-based).
pub fn page_image(pdf: &[u8], page_number: u32) -> PageImage {
    let document = Document::load_mem(pdf).unwrap();
    let page_id = document.get_pages()[&page_number];
    let page = document.get_dictionary(page_id).unwrap();

    let media_box: Vec<f32> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|value| value.as_float().unwrap())
        .collect();

    let xobjects = page
        .get(b"Resources")
        .and_then(Object::as_dict)
        .and_then(|resources| resources.get(b"XObject"))
        .and_then(Object::as_dict)
        .unwrap();
    assert_eq!(xobjects.len(), 1, "expected exactly one image per page");

    let (_, image_ref) = xobjects.iter().next().unwrap();
    let image = document
        .get_object(image_ref.as_reference().unwrap())
        .and_then(Object::as_stream)
        .unwrap();

    PageImage {
        width: image.dict.get(b"Width").and_then(Object::as_i64).unwrap(),
        height: image.dict.get(b"Height").and_then(Object::as_i64).unwrap(),
        filter: String::from_utf8_lossy(
            image.dict.get(b"Filter").and_then(Object::as_name).unwrap(),
        )
        .into_owned(),
        media_box: [media_box[0], media_box[1], media_box[2], media_box[3]],
    }
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn fill_rect(color: Rgb, x: f32, y: f32, width: f32, height: f32) -> Vec<u8> {
    Content {
        operations: vec![
            color.fill_operator(),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("f", vec![]),
        ],
    }
    .encode()
    .unwrap()
}

struct FixtureBuilder {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl FixtureBuilder {
    fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    fn add_page(&mut self, width: f32, height: f32, content: Vec<u8>, annots: Option<Vec<Object>>) {
        let page_id = self.document.new_object_id();
        self.insert_page(page_id, width, height, content, annots);
    }

    fn insert_page(
        &mut self,
        page_id: ObjectId,
        width: f32,
        height: f32,
        content: Vec<u8>,
        annots: Option<Vec<Object>>,
    ) {
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Resources" => Dictionary::new(),
            "Contents" => content_id,
        };
        if let Some(annots) = annots {
            page.set("Annots", annots);
        }

        self.document.objects.insert(page_id, page.into());
        self.kids.push(page_id.into());
    }

    fn finish(mut self, acro_form: Option<Dictionary>) -> Vec<u8> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.document.objects.insert(self.pages_id, pages.into());

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if let Some(acro_form) = acro_form {
            catalog.set("AcroForm", acro_form);
        }
        let catalog_id = self.document.add_object(catalog);
        self.document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes).unwrap();
        bytes
    }
}
