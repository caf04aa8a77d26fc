//! Output encoding: lossy WebP or baseline JPEG, both on a 0-100 quality scale.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::PipelineError;

/// Encodes resized images into the configured output format.
#[derive(Debug, Clone, Copy)]
pub struct OutputEncoder {
    format: OutputFormat,
    quality: u8,
}

impl OutputEncoder {
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.min(100),
        }
    }

    /// Encode to an in-memory buffer. `path` is only used for error context.
    pub fn encode(&self, image: &DynamicImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        // Neither target carries alpha for the frame, flatten to RGB
        let rgb = image.to_rgb8();
        match self.format {
            OutputFormat::Jpeg => {
                let mut buf = Vec::new();
                // The JPEG quantizer divides by quality, 0 is not a valid setting
                let quality = self.quality.max(1);
                DynamicImage::ImageRgb8(rgb)
                    .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
                    .map_err(|e| PipelineError::Encode {
                        path: path.to_path_buf(),
                        message: format!("jpeg: {}", e),
                    })?;
                Ok(buf)
            }
            OutputFormat::Webp => {
                let (width, height) = image.dimensions();
                let encoder = webp::Encoder::from_rgb(rgb.as_raw(), width, height);
                let memory = encoder
                    .encode_simple(false, self.quality as f32)
                    .map_err(|e| PipelineError::Encode {
                        path: path.to_path_buf(),
                        message: format!("webp: {:?}", e),
                    })?;
                Ok(memory.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_webp() {
        let img = DynamicImage::new_rgb8(200, 100);
        let bytes = OutputEncoder::new(OutputFormat::Webp, 80)
            .encode(&img, Path::new("x.jpg"))
            .unwrap();
        // WebP files start with "RIFF" and carry "WEBP" at offset 8
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_jpeg() {
        let img = DynamicImage::new_rgba8(64, 48);
        let bytes = OutputEncoder::new(OutputFormat::Jpeg, 75)
            .encode(&img, Path::new("x.jpg"))
            .unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 48));
    }

    #[test]
    fn test_quality_changes_size() {
        let mut rgb = image::RgbImage::new(128, 128);
        for (x, y, px) in rgb.enumerate_pixels_mut() {
            *px = image::Rgb([(x * 2) as u8, (y * 2) as u8, ((x ^ y) * 3) as u8]);
        }
        let img = DynamicImage::ImageRgb8(rgb);

        let low = OutputEncoder::new(OutputFormat::Jpeg, 10)
            .encode(&img, Path::new("x.jpg"))
            .unwrap();
        let high = OutputEncoder::new(OutputFormat::Jpeg, 95)
            .encode(&img, Path::new("x.jpg"))
            .unwrap();
        assert!(low.len() < high.len());
    }
}
