use crate::constants::mm_to_pt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Cannot derive image: {0}")]
    Derive(String),
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Invalid color lookup table: {0}")]
    Lut(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    #[default]
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Page size in points with orientation applied
    pub fn dimensions_pt(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_with_orientation(orientation);
        (mm_to_pt(w), mm_to_pt(h))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaperSize::A3 => "A3",
            PaperSize::A4 => "A4",
            PaperSize::A5 => "A5",
            PaperSize::Letter => "Letter",
            PaperSize::Legal => "Legal",
            PaperSize::Tabloid => "Tabloid",
            PaperSize::Custom { .. } => "Custom",
        }
    }
}

/// RGB color with channels in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const LIGHT_GREY: Rgb = Rgb(0.75, 0.75, 0.75);
}

/// The two tones of a dashed guide line. The second tone fills the
/// gaps left by the first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideColors {
    pub first: Rgb,
    pub second: Rgb,
}

impl Default for GuideColors {
    fn default() -> Self {
        Self {
            first: Rgb::LIGHT_GREY,
            second: Rgb::BLACK,
        }
    }
}

/// Statistics about a print layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    /// Card columns per sheet
    pub columns: usize,
    /// Card rows per sheet
    pub rows: usize,
    /// Total copies requested by the job
    pub cards_requested: usize,
    /// Copies placed on sheets
    pub cards_placed: usize,
    /// Oversized copies placed on sheets
    pub oversized_placed: usize,
    /// Copies that could not be placed in this layout
    pub cards_unplaced: usize,
    /// Number of printed sheets
    pub sheets: usize,
    /// Number of output pages (fronts plus backs)
    pub output_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_swaps_dimensions() {
        let (w, h) = PaperSize::Letter.dimensions_pt(Orientation::Landscape);
        assert!((w - 792.0).abs() < 0.1);
        assert!((h - 612.0).abs() < 0.1);
    }

    #[test]
    fn test_custom_paper() {
        let custom = PaperSize::Custom {
            width_mm: 100.0,
            height_mm: 200.0,
        };
        assert_eq!(custom.dimensions_mm(), (100.0, 200.0));
        assert_eq!(custom.name(), "Custom");
    }
}
