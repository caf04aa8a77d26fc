//! Output file naming. Names must survive FAT32 on the frame's SD card.

use std::path::{Path, PathBuf};

use crate::config::OutputFormat;

/// Characters FAT32 rejects in file names.
const INVALID_CHARS: &[char] = &['\\', '/', ':', ';', '*', '?', '"', '<', '>', '|'];

/// Strip the extension and replace FAT32-invalid characters with `_`.
pub fn normalize_filename(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    };
    stem.replace(INVALID_CHARS, "_")
}

/// Output file name for an input file name.
pub fn output_filename(filename: &str, format: OutputFormat) -> String {
    format!("{}.{}", normalize_filename(filename), format.extension())
}

/// Output path, relative to the output root, for an input path relative to
/// the input root. The directory part is kept as is.
pub fn output_relative_path(input_relative: &Path, format: OutputFormat) -> PathBuf {
    let filename = input_relative
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let name = output_filename(&filename, format);
    match input_relative.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filename() {
        let cases = [
            ("photo.jpg", "photo"),
            ("photo:test.jpg", "photo_test"),
            ("photo*test?file.jpg", "photo_test_file"),
            ("photo\"test.jpg", "photo_test"),
            ("photo<test>.jpg", "photo_test_"),
            ("photo|test.jpg", "photo_test"),
            ("photo;test.jpg", "photo_test"),
            ("photo\\test.jpg", "photo_test"),
            ("archive.2020.jpeg", "archive.2020"),
            ("no_extension", "no_extension"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_filename(input), expected, "{input}");
        }
    }

    #[test]
    fn test_output_filename() {
        let cases = [
            ("photo.jpg", OutputFormat::Webp, "photo.webp"),
            ("photo.jpg", OutputFormat::Jpeg, "photo.jpg"),
            ("photo.heic", OutputFormat::Webp, "photo.webp"),
            ("photo:test.jpg", OutputFormat::Webp, "photo_test.webp"),
            ("photo:test.jpg", OutputFormat::Jpeg, "photo_test.jpg"),
            ("photo<test>.jpg", OutputFormat::Webp, "photo_test_.webp"),
            ("photo*test?.JPEG", OutputFormat::Jpeg, "photo_test_.jpg"),
        ];
        for (input, format, expected) in cases {
            assert_eq!(output_filename(input, format), expected, "{input}");
        }
    }

    #[test]
    fn test_output_relative_path_keeps_directories() {
        assert_eq!(
            output_relative_path(Path::new("2020/summer/IMG:1.jpg"), OutputFormat::Webp),
            PathBuf::from("2020/summer/IMG_1.webp")
        );
        assert_eq!(
            output_relative_path(Path::new("a.jpg"), OutputFormat::Jpeg),
            PathBuf::from("a.jpg")
        );
    }
}
