//! Shared constants for card layout
//!
//! This module centralizes unit conversions and the physical card
//! dimensions used throughout cropping and page layout.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Inches per millimeter
pub const INCHES_PER_MM: f32 = 0.0393701;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert millimeters to inches
#[inline]
pub fn mm_to_inch(mm: f32) -> f32 {
    mm * INCHES_PER_MM
}

/// Convert inches to millimeters
#[inline]
pub fn inch_to_mm(inch: f32) -> f32 {
    inch / INCHES_PER_MM
}

/// Convert inches to points
#[inline]
pub fn inch_to_pt(inch: f32) -> f32 {
    inch * POINTS_PER_INCH
}

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    inch_to_pt(mm_to_inch(mm))
}

// =============================================================================
// Card Dimensions
// =============================================================================

/// Bleed border built into every source image (inches per side)
pub const SOURCE_BLEED_INCH: f32 = 0.12;

/// Trim size of a regular card (width, height) in inches
pub const CARD_SIZE_INCH: (f32, f32) = (2.48, 3.46);

/// Regular card including the built-in bleed border
pub const CARD_SIZE_WITH_BLEED_INCH: (f32, f32) = (
    CARD_SIZE_INCH.0 + 2.0 * SOURCE_BLEED_INCH,
    CARD_SIZE_INCH.1 + 2.0 * SOURCE_BLEED_INCH,
);

/// Trim size of an oversized card as stored on disk (portrait), in inches.
/// On the sheet it lies on its side across two card slots.
pub const OVERSIZED_CARD_SIZE_INCH: (f32, f32) = (CARD_SIZE_INCH.1, 2.0 * CARD_SIZE_INCH.0);

/// Oversized card including the built-in bleed border
pub const OVERSIZED_CARD_SIZE_WITH_BLEED_INCH: (f32, f32) = (
    OVERSIZED_CARD_SIZE_INCH.0 + 2.0 * SOURCE_BLEED_INCH,
    OVERSIZED_CARD_SIZE_INCH.1 + 2.0 * SOURCE_BLEED_INCH,
);

/// Largest bleed edge that can be kept from the source border (mm)
#[inline]
pub fn max_bleed_edge_mm() -> f32 {
    inch_to_mm(SOURCE_BLEED_INCH)
}

/// Largest backside offset accepted, in either direction (mm)
pub const MAX_BACKSIDE_OFFSET_MM: f32 = 10.0;

// =============================================================================
// Files
// =============================================================================

/// Image extensions picked up from the image root
pub const IMAGE_EXTENSIONS: [&str; 4] = ["gif", "jpg", "jpeg", "png"];

/// Cards whose filename starts with this prefix start deselected
pub const HIDDEN_PREFIX: &str = "__";

/// Name of the crop directory inside the image root
pub const CROP_DIR_NAME: &str = "crop";

/// Name of the vibrance subtree inside the crop directory
pub const VIBRANCE_DIR_NAME: &str = "vibrance";

// =============================================================================
// Previews
// =============================================================================

/// Width of the cached card preview (pixels)
pub const PREVIEW_WIDTH_PX: u32 = 248;

/// Width of the cached uncropped preview (pixels)
pub const UNCROPPED_PREVIEW_WIDTH_PX: u32 = 186;

/// Thumbnail scale relative to the preview
pub const THUMBNAIL_SCALE: f32 = 0.45;

// =============================================================================
// Guides
// =============================================================================

/// Half-length of a registration cross arm (points)
pub const GUIDE_CROSS_SIZE: f32 = 6.0;

/// Stroke width and dash length of guide lines (points)
pub const GUIDE_LINE_WIDTH: f32 = 1.0;

// =============================================================================
// Resampling
// =============================================================================

/// Unsharp mask applied after downsampling: (sigma, percent, threshold)
pub const SHARPEN_AFTER_RESIZE: (f32, f32, i32) = (1.0, 20.0, 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_roundtrip() {
        assert!((inch_to_mm(mm_to_inch(25.4)) - 25.4).abs() < 1e-4);
        assert!((mm_to_pt(25.4) - 72.0).abs() < 0.01);
        assert_eq!(inch_to_pt(1.0), 72.0);
    }

    #[test]
    fn test_card_sizes_include_bleed() {
        assert!((CARD_SIZE_WITH_BLEED_INCH.0 - 2.72).abs() < 1e-5);
        assert!((CARD_SIZE_WITH_BLEED_INCH.1 - 3.70).abs() < 1e-5);
        assert!((OVERSIZED_CARD_SIZE_WITH_BLEED_INCH.0 - 3.70).abs() < 1e-5);
        assert!((OVERSIZED_CARD_SIZE_WITH_BLEED_INCH.1 - 5.20).abs() < 1e-5);
    }

    #[test]
    fn test_max_bleed_edge() {
        let max = max_bleed_edge_mm();
        assert!(max > 3.04 && max < 3.05);
    }
}
