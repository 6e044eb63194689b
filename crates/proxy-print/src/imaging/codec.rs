//! Image file access
//!
//! Derived images keep the filename of their source but are always PNG
//! encoded, so decoding sniffs the content instead of trusting the
//! extension.

use crate::types::Result;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Decode an image file, whatever its extension claims
pub fn read_image(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// PNG bytes of an image
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write an image as PNG to `path`
pub fn write_png(path: &Path, image: &DynamicImage) -> Result<()> {
    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}

/// Whether a filename has one of the accepted image extensions
pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            crate::constants::IMAGE_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_png_under_jpg_name_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.jpg");
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3])));
        write_png(&path, &image).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a.png"));
        assert!(is_image_file("a.JPG"));
        assert!(is_image_file("b.jpeg"));
        assert!(is_image_file("c.gif"));
        assert!(!is_image_file("d.webp"));
        assert!(!is_image_file("png"));
        assert!(!is_image_file("img.cache"));
    }
}
