//! EXIF metadata: capture time, orientation and the curated tag block
//! written into outputs.

use chrono::NaiveDateTime;
use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::io::Cursor;
use std::time::SystemTime;

use crate::error::MetadataError;

/// EXIF date format, e.g. `2022:08:11 09:49:00`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Tags copied from the source into every output.
///
/// `Orientation` is deliberately absent: rotation is applied to the pixels.
pub const ALLOWED_TAGS: &[Tag] = &[
    Tag::DateTime,
    Tag::DateTimeOriginal,
    Tag::DateTimeDigitized,
    Tag::OffsetTime,
    Tag::OffsetTimeOriginal,
    Tag::OffsetTimeDigitized,
    Tag::Make,
    Tag::Model,
    Tag::GPSLatitudeRef,
    Tag::GPSLatitude,
    Tag::GPSLongitudeRef,
    Tag::GPSLongitude,
    Tag::GPSAltitudeRef,
    Tag::GPSAltitude,
    Tag::GPSDateStamp,
    Tag::GPSTimeStamp,
    Tag::GPSProcessingMethod,
    Tag::GPSAreaInformation,
];

/// Parsed EXIF of a source photo.
pub struct SourceMetadata {
    exif: Exif,
}

impl SourceMetadata {
    /// Read EXIF from a JPEG or HEIF container held in memory.
    pub fn read(bytes: &[u8]) -> Result<Self, MetadataError> {
        let exif = Reader::new().read_from_container(&mut Cursor::new(bytes))?;
        Ok(Self { exif })
    }

    /// Parse a raw TIFF-structured EXIF block (as stored in a WebP `EXIF` chunk).
    pub fn from_raw(tiff: Vec<u8>) -> Result<Self, MetadataError> {
        let exif = Reader::new().read_raw(tiff)?;
        Ok(Self { exif })
    }

    /// Capture time from `DateTimeOriginal`, falling back to
    /// `DateTimeDigitized` (CreateDate). Interpreted as UTC.
    pub fn capture_time(&self) -> Option<SystemTime> {
        [Tag::DateTimeOriginal, Tag::DateTimeDigitized]
            .into_iter()
            .find_map(|tag| self.ascii(tag).and_then(|s| parse_exif_datetime(&s)))
    }

    /// Raw orientation value, if present.
    pub fn orientation(&self) -> Option<u32> {
        self.exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    }

    /// First ASCII string of a primary-IFD field.
    pub fn ascii(&self, tag: Tag) -> Option<String> {
        let field = self.exif.get_field(tag, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(strings) => strings
                .first()
                .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string()),
            _ => None,
        }
    }

    /// Whether a tag is present in the primary IFD.
    pub fn has(&self, tag: Tag) -> bool {
        self.exif.get_field(tag, In::PRIMARY).is_some()
    }

    /// Build a fresh TIFF-structured EXIF block holding only [`ALLOWED_TAGS`].
    ///
    /// Returns `Ok(None)` when the source carries none of them.
    pub fn curated_block(&self) -> Result<Option<Vec<u8>>, MetadataError> {
        let fields: Vec<&Field> = self
            .exif
            .fields()
            .filter(|f| f.ifd_num == In::PRIMARY && ALLOWED_TAGS.contains(&f.tag))
            .collect();
        if fields.is_empty() {
            return Ok(None);
        }
        write_block(&fields).map(Some)
    }
}

/// Serialize fields into a little-endian TIFF-structured EXIF block.
pub fn write_block(fields: &[&Field]) -> Result<Vec<u8>, MetadataError> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, true)
        .map_err(|e| MetadataError::Build(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp as UTC.
pub fn parse_exif_datetime(value: &str) -> Option<SystemTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT)
        .ok()
        .map(|dt| SystemTime::from(dt.and_utc()))
}
