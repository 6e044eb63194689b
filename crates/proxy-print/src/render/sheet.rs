//! Sheet rendering
//!
//! Walks the packed pages of a job and issues drawing calls: card images
//! and guides on the front of each sheet, then, with backsides enabled, the
//! mirrored backside images on a second page.

use crate::layout::{
    CardRotation, Grid, PackItem, SheetGeometry, pack_job, place_sheet,
};
use crate::marks::{draw_guide, generate_guides};
use crate::options::PrintJob;
use crate::progress::{Progress, ProgressSink, Stage};
use crate::types::Result;
use std::path::Path;

use super::sink::{ImageSource, PageSink};

/// Outcome of rendering a job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Printed sheets
    pub sheets: usize,
    /// Pages emitted, fronts plus backs
    pub pages: usize,
    /// Card images drawn on fronts
    pub cards: usize,
    /// Images that were drawn as placeholders
    pub missing: Vec<String>,
    /// Copies the layout cannot hold
    pub unplaced: Vec<PackItem>,
}

/// Render every sheet of a job into `sink`.
///
/// `image_dir` is the directory of derived images matching the job's bleed
/// and color settings. Missing images become placeholders.
pub fn render_job<S: PageSink + ?Sized>(
    job: &PrintJob,
    image_dir: &Path,
    sink: &mut S,
    progress: &dyn ProgressSink,
) -> Result<RenderSummary> {
    let geometry = SheetGeometry::new(job.page_size_pt(), job.bleed_edge_mm());
    let packing = pack_job(job, geometry.capacity());
    let backside_offset = job.backside_offset_pt();

    log::info!(
        "Rendering {} sheet(s) of {}x{} cards",
        packing.pages.len(),
        geometry.cols,
        geometry.rows
    );

    let mut summary = RenderSummary {
        unplaced: packing.unplaced,
        ..Default::default()
    };

    for (p, page) in packing.pages.iter().enumerate() {
        let (front, back) = place_sheet(page, geometry.rows, geometry.cols)?;

        draw_side(
            job,
            &geometry,
            &front,
            image_dir,
            Side::Front,
            p + 1,
            sink,
            progress,
            &mut summary,
        )?;
        for line in generate_guides(&geometry, &front, job.extended_guides) {
            draw_guide(sink, &line, &job.guide_colors)?;
        }
        sink.show_page()?;
        summary.pages += 1;

        if job.backside_enabled {
            draw_side(
                job,
                &geometry,
                &back,
                image_dir,
                Side::Back {
                    offset: backside_offset,
                },
                p + 1,
                sink,
                progress,
                &mut summary,
            )?;
            sink.show_page()?;
            summary.pages += 1;
        }

        summary.sheets += 1;
    }

    Ok(summary)
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Front,
    /// Backside, shifted horizontally by `offset` points
    Back { offset: f32 },
}

#[allow(clippy::too_many_arguments)]
fn draw_side<S: PageSink + ?Sized>(
    job: &PrintJob,
    geometry: &SheetGeometry,
    grid: &Grid,
    image_dir: &Path,
    side: Side,
    page_number: usize,
    sink: &mut S,
    progress: &dyn ProgressSink,
    summary: &mut RenderSummary,
) -> Result<()> {
    let placements = grid.placements();
    let total = placements.len();

    for (i, placement) in placements.iter().enumerate() {
        let card = &placement.card;
        let (stage, name, is_backside, dx) = match side {
            Side::Front => (Stage::RenderingFront, card.name.as_str(), false, 0.0),
            Side::Back { offset } => (
                Stage::RenderingBack,
                job.backside_for(&card.name),
                true,
                offset,
            ),
        };
        progress.report(&Progress::new(stage, name, i + 1, total).on_page(page_number));

        let path = image_dir.join(name);
        let source = if path.exists() {
            ImageSource::File(path)
        } else {
            log::warn!("Missing image {}, drawing placeholder", path.display());
            if !summary.missing.iter().any(|m| m == name) {
                summary.missing.push(name.to_string());
            }
            ImageSource::Placeholder
        };

        let rect = geometry
            .card_rect(placement.position, card.oversized)
            .shifted(dx);
        let rotation = CardRotation::for_card(is_backside, card.oversized, card.short_edge);
        sink.draw_image(&source, rect, rotation)?;

        if !is_backside {
            summary.cards += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use crate::options::CardEntry;
    use crate::progress::NoProgress;
    use crate::render::{DrawCall, RecordingSink};

    fn job(cards: &[(&str, u32)]) -> PrintJob {
        let mut job = PrintJob::default();
        for &(name, copies) in cards {
            job.cards.insert(
                name.to_string(),
                CardEntry {
                    copies,
                    ..Default::default()
                },
            );
        }
        job
    }

    fn image_rects(calls: &[DrawCall]) -> Vec<Rect> {
        calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_job_renders_nothing() {
        let mut sink = RecordingSink::new();
        let summary = render_job(&job(&[]), Path::new("."), &mut sink, &NoProgress).unwrap();
        assert_eq!(summary.pages, 0);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_front_pages_and_placeholders() {
        let mut sink = RecordingSink::new();
        let summary = render_job(
            &job(&[("a.png", 10)]),
            Path::new("/nonexistent"),
            &mut sink,
            &NoProgress,
        )
        .unwrap();

        assert_eq!(summary.sheets, 2);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.cards, 10);
        assert_eq!(summary.missing, vec!["a.png".to_string()]);

        let pages = sink.pages();
        assert_eq!(image_rects(pages[0]).len(), 9);
        assert_eq!(image_rects(pages[1]).len(), 1);
        assert!(sink.images().all(|(s, _, _)| *s == ImageSource::Placeholder));
    }

    #[test]
    fn test_backs_mirror_and_shift() {
        let mut job = job(&[("a.png", 1)]);
        job.backside_enabled = true;
        job.set_backside_offset("2");

        let mut sink = RecordingSink::new();
        let summary = render_job(&job, Path::new("/nonexistent"), &mut sink, &NoProgress).unwrap();
        assert_eq!(summary.pages, 2);

        let pages = sink.pages();
        let front = image_rects(pages[0]);
        let back = image_rects(pages[1]);
        let geometry = SheetGeometry::new(job.page_size_pt(), 0.0);

        // Front card in column 0, back in the last column, shifted
        assert_eq!(front[0].x, geometry.origin_x);
        let expected = geometry.origin_x
            + (geometry.cols - 1) as f32 * geometry.card_width
            + job.backside_offset_pt();
        assert!((back[0].x - expected).abs() < 1e-3);

        // Backs carry images only
        assert!(pages[1].iter().all(|c| matches!(c, DrawCall::Image { .. })));
        assert!(summary.missing.contains(&"__back.png".to_string()));
    }

    #[test]
    fn test_progress_reports_every_card() {
        let seen = std::cell::RefCell::new(Vec::new());
        let sink_fn = |p: &Progress| seen.borrow_mut().push(p.to_string());
        let mut sink = RecordingSink::new();
        render_job(&job(&[("a.png", 2)]), Path::new("/nonexistent"), &mut sink, &sink_fn)
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(
            seen,
            vec![
                "Rendering page 1... Image number 1 - a.png".to_string(),
                "Rendering page 1... Image number 2 - a.png".to_string(),
            ]
        );
    }
}
