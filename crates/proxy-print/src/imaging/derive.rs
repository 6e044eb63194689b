//! Per-image transforms: crop, downsample, sharpen, uncrop
//!
//! Source images are scans or renders of a card including a fixed 0.12in
//! bleed border. Their resolution is not recorded anywhere reliable, so it
//! is inferred from the pixel size and the known physical frame.

use crate::constants::{
    CARD_SIZE_INCH, CARD_SIZE_WITH_BLEED_INCH, OVERSIZED_CARD_SIZE_INCH,
    OVERSIZED_CARD_SIZE_WITH_BLEED_INCH, SHARPEN_AFTER_RESIZE, SOURCE_BLEED_INCH, mm_to_inch,
};
use crate::types::{ProxyError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use super::Lut3d;

// =============================================================================
// Resolution
// =============================================================================

/// Physical size of a source image including its bleed border (inches)
pub fn source_frame(oversized: bool) -> (f32, f32) {
    if oversized {
        OVERSIZED_CARD_SIZE_WITH_BLEED_INCH
    } else {
        CARD_SIZE_WITH_BLEED_INCH
    }
}

/// Physical size of a precropped image, trimmed to the card edge (inches)
pub fn trimmed_frame(oversized: bool) -> (f32, f32) {
    if oversized {
        OVERSIZED_CARD_SIZE_INCH
    } else {
        CARD_SIZE_INCH
    }
}

/// Resolution of an image that covers `frame`. The smaller of the two axes
/// wins so a slightly off aspect ratio never crops into the artwork.
pub fn infer_dpi(dimensions: (u32, u32), frame: (f32, f32)) -> f32 {
    let (w, h) = dimensions;
    (w as f32 / frame.0).min(h as f32 / frame.1)
}

/// Pixels to remove on each side: the whole built-in border, minus the part
/// kept as the requested bleed edge.
pub fn crop_amount(dpi: f32, bleed_edge_mm: f32) -> u32 {
    let border = (SOURCE_BLEED_INCH * dpi).round_ties_even();
    let kept = if bleed_edge_mm > 0.0 {
        (dpi * mm_to_inch(bleed_edge_mm)).round_ties_even()
    } else {
        0.0
    };
    (border - kept).max(0.0) as u32
}

// =============================================================================
// Crop
// =============================================================================

/// Settings for deriving one cropped card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSettings {
    /// Bleed edge to keep, in millimeters
    pub bleed_edge_mm: f32,
    /// Resolution ceiling; larger crops are downsampled
    pub max_dpi: u32,
    /// Source shows an oversized card
    pub oversized: bool,
}

/// A derived card and how it was made
#[derive(Debug, Clone)]
pub struct CroppedCard {
    pub image: DynamicImage,
    pub dpi: f32,
    /// Pixels removed on each side
    pub cropped_px: u32,
    /// Size after downsampling, if the ceiling applied
    pub resized_to: Option<(u32, u32)>,
}

/// Crop the built-in border off a source image, keep the requested bleed
/// edge, apply the resolution ceiling and the optional color table.
pub fn crop_card(
    image: &DynamicImage,
    settings: &CropSettings,
    lut: Option<&Lut3d>,
) -> Result<CroppedCard> {
    let (w, h) = image.dimensions();
    let dpi = infer_dpi((w, h), source_frame(settings.oversized));
    let c = crop_amount(dpi, settings.bleed_edge_mm);

    if 2 * c >= w || 2 * c >= h {
        return Err(ProxyError::Derive(format!(
            "{}x{} image is too small to crop {} pixels per side",
            w, h, c
        )));
    }

    let mut cropped = image.crop_imm(c, c, w - 2 * c, h - 2 * c);
    let mut resized_to = None;

    let max_dpi = settings.max_dpi as f32;
    if dpi > max_dpi {
        let (cw, ch) = cropped.dimensions();
        let new_w = ((cw as f32 * max_dpi / dpi).round() as u32).max(1);
        let new_h = ((ch as f32 * max_dpi / dpi).round() as u32).max(1);
        log::debug!(
            "{:.0} dpi exceeds {} dpi, resizing to {}x{}",
            dpi,
            settings.max_dpi,
            new_w,
            new_h
        );
        cropped = cropped.resize_exact(new_w, new_h, FilterType::CatmullRom);
        let (sigma, percent, threshold) = SHARPEN_AFTER_RESIZE;
        cropped = unsharp_mask(&cropped, sigma, percent, threshold);
        resized_to = Some((new_w, new_h));
    }

    if let Some(lut) = lut {
        cropped = lut.apply(&cropped);
    }

    Ok(CroppedCard {
        image: cropped,
        dpi,
        cropped_px: c,
        resized_to,
    })
}

/// Unsharp mask: pixels differing from their blurred value by more than
/// `threshold` are pushed away from it by `percent` of the difference.
/// Alpha is left alone.
pub fn unsharp_mask(image: &DynamicImage, sigma: f32, percent: f32, threshold: i32) -> DynamicImage {
    let source = image.to_rgba8();
    let blurred = imageops::blur(&source, sigma);
    let amount = percent / 100.0;

    let mut out = RgbaImage::new(source.width(), source.height());
    for (x, y, pixel) in source.enumerate_pixels() {
        let soft = blurred.get_pixel(x, y);
        let mut sharp = pixel.0;
        for c in 0..3 {
            let diff = pixel.0[c] as i32 - soft.0[c] as i32;
            if diff.abs() > threshold {
                let value = pixel.0[c] as f32 + diff as f32 * amount;
                sharp[c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
        out.put_pixel(x, y, Rgba(sharp));
    }

    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(out)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(out).to_rgb8())
    }
}

// =============================================================================
// Uncrop
// =============================================================================

/// Rebuild a source-like image from a precropped one by padding a synthetic
/// border of the built-in bleed width, repeating the outermost pixels.
pub fn uncrop_card(image: &DynamicImage, oversized: bool) -> DynamicImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }
    let dpi = infer_dpi((w, h), trimmed_frame(oversized));
    let pad = (dpi * SOURCE_BLEED_INCH).round_ties_even() as u32;

    let source = image.to_rgba8();
    let out = RgbaImage::from_fn(w + 2 * pad, h + 2 * pad, |x, y| {
        let sx = x.saturating_sub(pad).min(w - 1);
        let sy = y.saturating_sub(pad).min(h - 1);
        *source.get_pixel(sx, sy)
    });

    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(out)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(out).to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// Card at `dpi` with a red border the width of the built-in bleed
    fn bordered_card(dpi: f32) -> DynamicImage {
        let (fw, fh) = CARD_SIZE_WITH_BLEED_INCH;
        let w = (fw * dpi).round() as u32;
        let h = (fh * dpi).round() as u32;
        let border = (SOURCE_BLEED_INCH * dpi).round() as u32;
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            if x < border || y < border || x >= w - border || y >= h - border {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }))
    }

    #[test]
    fn test_infer_dpi_uses_smaller_axis() {
        let dpi = infer_dpi((272, 370), CARD_SIZE_WITH_BLEED_INCH);
        assert!((dpi - 100.0).abs() < 1e-3);
        // Wider than the frame: height decides
        let dpi = infer_dpi((400, 370), CARD_SIZE_WITH_BLEED_INCH);
        assert!((dpi - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_crop_amount() {
        assert_eq!(crop_amount(300.0, 0.0), 36);
        // 1mm at 300 dpi is 11.8 pixels
        assert_eq!(crop_amount(300.0, 1.0), 24);
        // Bleed wider than the border never goes negative
        assert_eq!(crop_amount(300.0, 10.0), 0);
    }

    #[test]
    fn test_crop_removes_border() {
        let card = bordered_card(300.0);
        let settings = CropSettings {
            bleed_edge_mm: 0.0,
            max_dpi: 1200,
            oversized: false,
        };
        let out = crop_card(&card, &settings, None).unwrap();

        assert_eq!(out.cropped_px, 36);
        assert!(out.resized_to.is_none());
        assert_eq!(out.image.dimensions(), (816 - 72, 1110 - 72));
        let rgb = out.image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_crop_keeps_bleed_edge() {
        let card = bordered_card(300.0);
        let settings = CropSettings {
            bleed_edge_mm: 1.0,
            max_dpi: 1200,
            oversized: false,
        };
        let out = crop_card(&card, &settings, None).unwrap();
        assert_eq!(out.cropped_px, 24);
        // Border pixels remain at the edge
        assert_eq!(out.image.to_rgb8().get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_downsample_above_ceiling() {
        let card = bordered_card(400.0);
        let settings = CropSettings {
            bleed_edge_mm: 0.0,
            max_dpi: 200,
            oversized: false,
        };
        let out = crop_card(&card, &settings, None).unwrap();
        let (w, h) = out.image.dimensions();
        assert_eq!(out.resized_to, Some((w, h)));
        // 2.48in x 3.46in at 200 dpi
        assert!((w as i32 - 496).abs() <= 1);
        assert!((h as i32 - 692).abs() <= 1);
    }

    #[test]
    fn test_oversized_uses_its_own_frame() {
        let (fw, fh) = OVERSIZED_CARD_SIZE_WITH_BLEED_INCH;
        let image = DynamicImage::ImageRgb8(RgbImage::new(
            (fw * 100.0).round() as u32,
            (fh * 100.0).round() as u32,
        ));
        let settings = CropSettings {
            bleed_edge_mm: 0.0,
            max_dpi: 1200,
            oversized: true,
        };
        let out = crop_card(&image, &settings, None).unwrap();
        assert!((out.dpi - 100.0).abs() < 1e-3);
        assert_eq!(out.cropped_px, 12);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let settings = CropSettings {
            bleed_edge_mm: 0.0,
            max_dpi: 1200,
            oversized: false,
        };
        assert!(matches!(
            crop_card(&image, &settings, None),
            Err(ProxyError::Derive(_))
        ));
    }

    #[test]
    fn test_unsharp_mask_leaves_flat_areas() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([90, 90, 90])));
        let out = unsharp_mask(&flat, 1.0, 20.0, 8);
        assert_eq!(out.to_rgb8(), flat.to_rgb8());
    }

    #[test]
    fn test_unsharp_mask_boosts_edges() {
        let edge = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 8, |x, _| {
            if x < 4 { Rgb([50, 50, 50]) } else { Rgb([200, 200, 200]) }
        }));
        let out = unsharp_mask(&edge, 1.0, 100.0, 0).to_rgb8();
        assert!(out.get_pixel(3, 4).0[0] < 50);
        assert!(out.get_pixel(4, 4).0[0] > 200);
    }

    #[test]
    fn test_crop_then_uncrop_restores_size() {
        let card = bordered_card(300.0);
        let settings = CropSettings {
            bleed_edge_mm: 0.0,
            max_dpi: 1200,
            oversized: false,
        };
        let cropped = crop_card(&card, &settings, None).unwrap().image;
        let restored = uncrop_card(&cropped, false);

        let (w, h) = restored.dimensions();
        assert!((w as i32 - 816).abs() <= 2);
        assert!((h as i32 - 1110).abs() <= 2);

        // Padding repeats the edge pixels
        assert_eq!(restored.to_rgb8().get_pixel(0, 0).0, [0, 0, 255]);
    }
}
