//! Sheet geometry
//!
//! Page-space positions of the card grid: how many card cells fit the page,
//! where the centred grid starts, and the rectangle of each cell.

use crate::constants::{CARD_SIZE_INCH, inch_to_pt, mm_to_inch};

use super::{GridPosition, PageCapacity, Rect};

/// Card grid on one sheet, all values in points.
///
/// The grid is anchored at its top edge: `origin_y` is the y coordinate of
/// row 0's top, and rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Card cell size including the bleed edge on both sides
    pub card_width: f32,
    pub card_height: f32,
    /// Bleed edge per side
    pub bleed: f32,
    pub cols: usize,
    pub rows: usize,
    /// Left edge of column 0
    pub origin_x: f32,
    /// Top edge of row 0
    pub origin_y: f32,
}

impl SheetGeometry {
    /// Geometry for a page size in points and a bleed edge in millimeters.
    pub fn new(page_size_pt: (f32, f32), bleed_edge_mm: f32) -> Self {
        let (page_width, page_height) = page_size_pt;
        let bleed_inch = mm_to_inch(bleed_edge_mm.max(0.0));

        let card_width = inch_to_pt(CARD_SIZE_INCH.0 + 2.0 * bleed_inch);
        let card_height = inch_to_pt(CARD_SIZE_INCH.1 + 2.0 * bleed_inch);

        let cols = (page_width / card_width).floor().max(0.0) as usize;
        let rows = (page_height / card_height).floor().max(0.0) as usize;

        // Half to even, so odd leftovers split the same way every time
        let origin_x = ((page_width - card_width * cols as f32) / 2.0).round_ties_even();
        let margin_y = ((page_height - card_height * rows as f32) / 2.0).round_ties_even();

        Self {
            page_width,
            page_height,
            card_width,
            card_height,
            bleed: inch_to_pt(bleed_inch),
            cols,
            rows,
            origin_x,
            origin_y: page_height - margin_y,
        }
    }

    /// Per-page capacity for packing
    pub fn capacity(&self) -> PageCapacity {
        PageCapacity::new(self.rows, self.cols)
    }

    pub fn has_bleed(&self) -> bool {
        self.bleed > 0.0
    }

    /// Page-space point of a grid intersection, column line `ix`, row line `iy`
    pub fn grid_point(&self, ix: usize, iy: usize) -> (f32, f32) {
        (
            self.origin_x + ix as f32 * self.card_width,
            self.origin_y - iy as f32 * self.card_height,
        )
    }

    /// Drawing rectangle of a card whose leftmost cell is `position`.
    /// Oversized cards cover two cells.
    pub fn card_rect(&self, position: GridPosition, oversized: bool) -> Rect {
        let (x, top) = self.grid_point(position.col, position.row);
        let span = if oversized { 2.0 } else { 1.0 };
        Rect::new(
            x,
            top - self.card_height,
            self.card_width * span,
            self.card_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Orientation, PaperSize};

    #[test]
    fn test_letter_fits_three_by_three() {
        let page = PaperSize::Letter.dimensions_pt(Orientation::Portrait);
        let geometry = SheetGeometry::new(page, 0.0);

        assert_eq!(geometry.cols, 3);
        assert_eq!(geometry.rows, 3);
        assert!((geometry.card_width - 178.56).abs() < 0.01);
        assert!((geometry.card_height - 249.12).abs() < 0.01);
        // (612 - 535.68) / 2 = 38.16
        assert_eq!(geometry.origin_x, 38.0);
    }

    #[test]
    fn test_landscape_letter() {
        let page = PaperSize::Letter.dimensions_pt(Orientation::Landscape);
        let geometry = SheetGeometry::new(page, 0.0);
        assert_eq!(geometry.cols, 4);
        assert_eq!(geometry.rows, 2);
    }

    #[test]
    fn test_bleed_grows_cells() {
        let page = PaperSize::A4.dimensions_pt(Orientation::Portrait);
        let plain = SheetGeometry::new(page, 0.0);
        let bleed = SheetGeometry::new(page, 2.0);

        assert!(bleed.has_bleed());
        assert!(!plain.has_bleed());
        let expected = 2.0 * bleed.bleed;
        assert!((bleed.card_width - plain.card_width - expected).abs() < 0.01);
        assert!((bleed.card_height - plain.card_height - expected).abs() < 0.01);
    }

    #[test]
    fn test_card_rects_tile_downwards() {
        let geometry = SheetGeometry::new((600.0, 800.0), 0.0);
        let first = geometry.card_rect(GridPosition::new(0, 0), false);
        let below = geometry.card_rect(GridPosition::new(1, 0), false);
        let right = geometry.card_rect(GridPosition::new(0, 1), false);

        assert_eq!(first.top(), geometry.origin_y);
        assert!((below.top() - first.y).abs() < 1e-3);
        assert!((right.x - first.right()).abs() < 1e-3);
    }

    #[test]
    fn test_oversized_rect_spans_two_cells() {
        let geometry = SheetGeometry::new((600.0, 800.0), 0.0);
        let rect = geometry.card_rect(GridPosition::new(0, 0), true);
        let next = geometry.card_rect(GridPosition::new(0, 1), false);
        assert!((rect.right() - next.right()).abs() < 1e-3);
        assert_eq!(rect.height, geometry.card_height);
    }

    #[test]
    fn test_page_smaller_than_card() {
        let geometry = SheetGeometry::new((100.0, 100.0), 0.0);
        assert_eq!(geometry.capacity().slots(), 0);
    }
}
