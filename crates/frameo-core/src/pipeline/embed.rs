//! Embedding a curated EXIF block into encoded output bytes.

use img_parts::jpeg::Jpeg;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};

use crate::config::OutputFormat;
use crate::error::MetadataError;

/// Insert `tiff` (a TIFF-structured EXIF block) into encoded image bytes.
///
/// JPEG gets an `APP1 Exif` segment, WebP an `EXIF` chunk (the container is
/// upgraded to VP8X when needed). Existing EXIF in `encoded` is replaced.
pub fn embed_exif(
    encoded: Vec<u8>,
    tiff: Vec<u8>,
    format: OutputFormat,
) -> Result<Vec<u8>, MetadataError> {
    let encoded = Bytes::from(encoded);
    let exif = Some(Bytes::from(tiff));
    let out = match format {
        OutputFormat::Jpeg => {
            let mut jpeg =
                Jpeg::from_bytes(encoded).map_err(|e| MetadataError::Embed(e.to_string()))?;
            jpeg.set_exif(exif);
            jpeg.encoder().bytes()
        }
        OutputFormat::Webp => {
            let mut webp =
                WebP::from_bytes(encoded).map_err(|e| MetadataError::Embed(e.to_string()))?;
            webp.set_exif(exif);
            webp.encoder().bytes()
        }
    };
    Ok(out.to_vec())
}

/// Raw EXIF block of encoded output bytes, if any.
pub fn extract_exif(encoded: &[u8], format: OutputFormat) -> Option<Vec<u8>> {
    let bytes = Bytes::copy_from_slice(encoded);
    let exif = match format {
        OutputFormat::Jpeg => Jpeg::from_bytes(bytes).ok()?.exif(),
        OutputFormat::Webp => WebP::from_bytes(bytes).ok()?.exif(),
    };
    exif.map(|b| b.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::OutputEncoder;
    use crate::pipeline::metadata::{write_block, SourceMetadata};
    use exif::{Field, In, Tag, Value};
    use image::DynamicImage;
    use std::path::Path;

    fn block() -> Vec<u8> {
        let field = Field {
            tag: Tag::DateTimeOriginal,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"2022:08:11 09:49:00".to_vec()]),
        };
        write_block(&[&field]).unwrap()
    }

    fn encoded(format: OutputFormat) -> Vec<u8> {
        OutputEncoder::new(format, 80)
            .encode(&DynamicImage::new_rgb8(32, 16), Path::new("t.jpg"))
            .unwrap()
    }

    #[test]
    fn test_embed_into_jpeg() {
        let out = embed_exif(encoded(OutputFormat::Jpeg), block(), OutputFormat::Jpeg).unwrap();

        // The container reader finds it like any camera JPEG
        let meta = SourceMetadata::read(&out).unwrap();
        assert_eq!(
            meta.ascii(Tag::DateTimeOriginal).as_deref(),
            Some("2022:08:11 09:49:00")
        );
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[test]
    fn test_embed_into_webp() {
        let out = embed_exif(encoded(OutputFormat::Webp), block(), OutputFormat::Webp).unwrap();

        let raw = extract_exif(&out, OutputFormat::Webp).unwrap();
        let meta = SourceMetadata::from_raw(raw).unwrap();
        assert_eq!(
            meta.ascii(Tag::DateTimeOriginal).as_deref(),
            Some("2022:08:11 09:49:00")
        );
        assert_eq!(&out[0..4], b"RIFF");
    }

    #[test]
    fn test_embed_rejects_foreign_bytes() {
        let err = embed_exif(b"not a jpeg".to_vec(), block(), OutputFormat::Jpeg).unwrap_err();
        assert!(matches!(err, MetadataError::Embed(_)));
    }

    #[test]
    fn test_extract_without_exif() {
        assert!(extract_exif(&encoded(OutputFormat::Webp), OutputFormat::Webp).is_none());
    }
}
