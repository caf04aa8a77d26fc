//! Image decoding, selected by source extension.

use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl DecodedImage {
    fn new(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }
}

/// Decodes source photos. HEIC goes through libheif, everything else
/// through the `image` crate.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode an image from an in-memory byte buffer.
    pub fn decode(bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
        if is_heic(path) {
            return heic::decode(bytes, path).map(DecodedImage::new);
        }

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(DecodedImage::new(image))
    }
}

fn is_heic(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("heic"))
}

#[cfg(feature = "heic")]
mod heic {
    use image::{DynamicImage, RgbImage};
    use libheif_rs::{ColorSpace, DecodingOptions, HeifContext, LibHeif, RgbChroma};
    use std::path::Path;

    use crate::error::PipelineError;

    pub(super) fn decode(bytes: &[u8], path: &Path) -> Result<DynamicImage, PipelineError> {
        let fail = |message: String| PipelineError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes).map_err(|e| fail(e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| fail(e.to_string()))?;

        // EXIF orientation is applied by the transformer, so keep the raw pixels
        let mut options = DecodingOptions::new();
        if let Some(options) = options.as_mut() {
            options.set_ignore_transformations(true);
        }
        let image = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), options)
            .map_err(|e| fail(e.to_string()))?;

        let planes = image.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| fail("missing interleaved RGB plane".to_string()))?;

        let width = plane.width;
        let height = plane.height;
        let row_len = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| fail("pixel buffer does not match image size".to_string()))
    }
}

#[cfg(not(feature = "heic"))]
mod heic {
    use image::DynamicImage;
    use std::path::Path;

    use crate::error::PipelineError;

    pub(super) fn decode(_bytes: &[u8], path: &Path) -> Result<DynamicImage, PipelineError> {
        Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: "heic (built without the `heic` feature)".to_string(),
        })
    }
}
