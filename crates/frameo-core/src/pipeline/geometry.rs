//! Orientation and fit-within geometry.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::Resolution;

/// Rotate decoded pixels upright according to the EXIF orientation value.
///
/// Only the pure rotations are handled (3, 6, 8); mirrored and unknown
/// values leave the image as is.
pub fn apply_orientation(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(3) => image.rotate180(),
        // 0th row on the visual right: turn 90° clockwise
        Some(6) => image.rotate90(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

/// Bounding box for an image of the given size.
///
/// Landscape and square images fit `long x short`; portrait images fit
/// `short x long`, regardless of how the resolution was written.
pub fn fit_box(resolution: Resolution, width: u32, height: u32) -> (u32, u32) {
    let (long, short) = (resolution.long_side(), resolution.short_side());
    if width >= height {
        (long, short)
    } else {
        (short, long)
    }
}

/// Largest size with the source aspect ratio that fits inside `max_w x max_h`.
///
/// Images already inside the box keep their size.
pub fn fit_dimensions(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_w && height <= max_h) {
        return (width, height);
    }

    let ratio = f64::min(
        max_w as f64 / width as f64,
        max_h as f64 / height as f64,
    );
    let fit_w = ((width as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let fit_h = ((height as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (fit_w, fit_h)
}

/// Resize to fit the frame for this image's orientation with Catmull-Rom.
pub fn fit_to_frame(image: DynamicImage, resolution: Resolution) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (box_w, box_h) = fit_box(resolution, width, height);
    let (target_w, target_h) = fit_dimensions(width, height, box_w, box_h);
    if (target_w, target_h) == (width, height) {
        return image;
    }
    image.resize_exact(target_w, target_h, FilterType::CatmullRom)
}
