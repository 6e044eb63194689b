use crate::layout::{SheetGeometry, pack_job};
use crate::options::PrintJob;
use crate::types::*;

/// Calculate layout statistics for a job printed on `page_size_pt`
pub fn calculate_statistics(job: &PrintJob, page_size_pt: (f32, f32)) -> LayoutStatistics {
    let geometry = SheetGeometry::new(page_size_pt, job.bleed_edge_mm());
    let packing = pack_job(job, geometry.capacity());

    let cards_placed = packing.pages.iter().map(|p| p.card_count()).sum();
    let oversized_placed = packing.pages.iter().map(|p| p.oversized.len()).sum();
    let sheets = packing.pages.len();

    // Fronts, plus one back per sheet when duplexing
    let output_pages = if job.backside_enabled {
        sheets * 2
    } else {
        sheets
    };

    LayoutStatistics {
        columns: geometry.cols,
        rows: geometry.rows,
        cards_requested: job.total_copies(),
        cards_placed,
        oversized_placed,
        cards_unplaced: packing.unplaced.len(),
        sheets,
        output_pages,
    }
}
