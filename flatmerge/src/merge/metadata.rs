//! Output document metadata.
//!
//! This module writes the Info dictionary of the flattened document:
//! - Producer and Creator (always)
//! - CreationDate and ModDate (always)
//! - Title, Author, Subject, Keywords (when configured)
//!
//! Text that is not plain ASCII is stored as UTF-16BE with a byte order mark,
//! as PDF text strings require.

use chrono::{DateTime, FixedOffset};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::config::Metadata;
use crate::error::Result;

/// Name written to the Creator entry.
pub const CREATOR: &str = "flatmerge";

/// Writer and reader of the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write the Info dictionary of `doc`.
    ///
    /// Replaces any existing Info dictionary. Only non-empty optional fields
    /// of `metadata` are written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use flatmerge::merge::metadata::MetadataManager;
    /// # use flatmerge::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = MetadataManager::new();
    /// let metadata = Metadata::new(Some("Signed forms".to_string()), None, None, None);
    /// manager.set_metadata(&mut doc, &metadata, chrono::Local::now().fixed_offset())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(
        &self,
        doc: &mut Document,
        metadata: &Metadata,
        created_at: DateTime<FixedOffset>,
    ) -> Result<()> {
        let mut info = Dictionary::new();

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        let producer = format!("{CREATOR} {}", crate::VERSION);
        info.set("Creator", text_string(CREATOR));
        info.set("Producer", text_string(&producer));

        let date = format_pdf_date(&created_at);
        info.set("CreationDate", text_string(&date));
        info.set("ModDate", text_string(&date));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        Ok(())
    }

    /// Read the optional fields back from a document's Info dictionary.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = Self::info_dictionary(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            Self::get_string_field(info, b"Title"),
            Self::get_string_field(info, b"Author"),
            Self::get_string_field(info, b"Subject"),
            Self::get_string_field(info, b"Keywords"),
        )
    }

    /// Read a single text entry of the Info dictionary, such as `Producer`.
    pub fn get_field(&self, doc: &Document, key: &str) -> Option<String> {
        Self::info_dictionary(doc).and_then(|info| Self::get_string_field(info, key.as_bytes()))
    }

    /// Check if a document has an Info dictionary.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        Self::info_dictionary(doc).is_some()
    }

    fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
        let info_ref = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
        doc.get_dictionary(info_ref).ok()
    }

    fn get_string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
        match dict.get(key).ok()? {
            Object::String(bytes, _) => decode_text_string(bytes),
            _ => None,
        }
    }
}

/// Encode a PDF text string.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn decode_text_string(bytes: &[u8]) -> Option<String> {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Format a timestamp as a PDF date string: `D:YYYYMMDDHHmmSS+HH'mm'`.
pub fn format_pdf_date(time: &DateTime<FixedOffset>) -> String {
    let offset = time.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.unsigned_abs();

    format!(
        "D:{}{sign}{:02}'{:02}'",
        time.format("%Y%m%d%H%M%S"),
        offset / 3600,
        (offset % 3600) / 60
    )
}
