//! Registration guides for card sheets
//!
//! Guides are small crosses at card corners, drawn as two-tone dashed lines
//! so they stay visible on both light and dark artwork. With extended
//! guides, crosses on the outer grid lines also get a line running to the
//! page edge, which makes guillotine cuts easy to line up.

use crate::constants::{GUIDE_CROSS_SIZE, GUIDE_LINE_WIDTH};
use crate::layout::{Grid, SheetGeometry};
use crate::render::{PageSink, Stroke};
use crate::types::{GuideColors, Result};

/// A guide line segment in page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

impl GuideLine {
    fn new(from: (f32, f32), to: (f32, f32)) -> Self {
        Self { from, to }
    }
}

/// Cross centred on `(x, y)`
fn cross(x: f32, y: f32) -> [GuideLine; 2] {
    let c = GUIDE_CROSS_SIZE;
    [
        GuideLine::new((x, y - c), (x, y + c)),
        GuideLine::new((x - c, y), (x + c, y)),
    ]
}

/// Cross at grid intersection `(ix, iy)`, shifted by `(dx, dy)`
fn cross_at_grid(
    geometry: &SheetGeometry,
    ix: usize,
    iy: usize,
    (dx, dy): (f32, f32),
    extended: bool,
    lines: &mut Vec<GuideLine>,
) {
    let (gx, gy) = geometry.grid_point(ix, iy);
    let (x, y) = (gx + dx, gy + dy);
    lines.extend(cross(x, y));

    if extended {
        if ix == 0 {
            lines.push(GuideLine::new((x, y), (0.0, y)));
        }
        if ix == geometry.cols {
            lines.push(GuideLine::new((x, y), (geometry.page_width, y)));
        }
        if iy == 0 {
            lines.push(GuideLine::new((x, y), (x, geometry.page_height)));
        }
        if iy == geometry.rows {
            lines.push(GuideLine::new((x, y), (x, 0.0)));
        }
    }
}

/// Guide lines for the front of a sheet.
///
/// Without a bleed edge every grid intersection gets a cross. With a bleed
/// edge each card gets four crosses at its trim corners, inset by the bleed.
pub fn generate_guides(geometry: &SheetGeometry, grid: &Grid, extended: bool) -> Vec<GuideLine> {
    let mut lines = Vec::new();

    if geometry.has_bleed() {
        let b = geometry.bleed;
        for placement in grid.placements() {
            let x = placement.position.col;
            let y = placement.position.row;
            let span = if placement.card.oversized { 2 } else { 1 };

            cross_at_grid(geometry, x, y, (b, -b), extended, &mut lines);
            cross_at_grid(geometry, x + span, y, (-b, -b), extended, &mut lines);
            cross_at_grid(geometry, x + span, y + 1, (-b, b), extended, &mut lines);
            cross_at_grid(geometry, x, y + 1, (b, b), extended, &mut lines);
        }
    } else {
        for iy in 0..=geometry.rows {
            for ix in 0..=geometry.cols {
                cross_at_grid(geometry, ix, iy, (0.0, 0.0), extended, &mut lines);
            }
        }
    }

    lines
}

/// Draw one guide as two dashed passes, the second filling the gaps of
/// the first.
pub fn draw_guide<S: PageSink + ?Sized>(
    sink: &mut S,
    line: &GuideLine,
    colors: &GuideColors,
) -> Result<()> {
    let s = GUIDE_LINE_WIDTH;
    let mut stroke = Stroke {
        from: line.from,
        to: line.to,
        width: s,
        color: colors.first,
        dash: Some((s, s)),
        dash_phase: 0.0,
    };
    sink.draw_line(&stroke)?;

    stroke.color = colors.second;
    stroke.dash_phase = s;
    sink.draw_line(&stroke)
}
