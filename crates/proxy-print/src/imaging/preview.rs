//! Small preview renditions kept in the image cache

use crate::constants::{PREVIEW_WIDTH_PX, THUMBNAIL_SCALE, UNCROPPED_PREVIEW_WIDTH_PX};
use crate::types::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use super::encode_png;

/// An encoded preview and its pixel size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBlob {
    pub png: Vec<u8>,
    pub size: (u32, u32),
}

impl PreviewBlob {
    fn encode(image: &DynamicImage) -> Result<Self> {
        Ok(Self {
            png: encode_png(image)?,
            size: image.dimensions(),
        })
    }
}

/// Resize to `width` pixels wide, keeping the aspect ratio
pub fn scale_to_width(image: &DynamicImage, width: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    if w == 0 {
        return image.clone();
    }
    let height = ((h as f32 * width as f32 / w as f32).round() as u32).max(1);
    image.resize_exact(width, height, FilterType::Triangle)
}

/// Preview of a cropped card
pub fn card_preview(cropped: &DynamicImage) -> Result<(DynamicImage, PreviewBlob)> {
    let preview = scale_to_width(cropped, PREVIEW_WIDTH_PX);
    let blob = PreviewBlob::encode(&preview)?;
    Ok((preview, blob))
}

/// Thumbnail derived from a preview
pub fn thumbnail(preview: &DynamicImage) -> Result<PreviewBlob> {
    let (w, h) = preview.dimensions();
    let tw = ((w as f32 * THUMBNAIL_SCALE).round() as u32).max(1);
    let th = ((h as f32 * THUMBNAIL_SCALE).round() as u32).max(1);
    PreviewBlob::encode(&preview.resize_exact(tw, th, FilterType::Triangle))
}

/// Preview of the full source image, border included
pub fn uncropped_preview(source: &DynamicImage) -> Result<PreviewBlob> {
    PreviewBlob::encode(&scale_to_width(source, UNCROPPED_PREVIEW_WIDTH_PX))
}
