use proxy_print::*;

fn job_with(cards: &[(&str, u32, bool)]) -> PrintJob {
    let mut job = PrintJob::default();
    for (name, copies, oversized) in cards {
        job.cards.insert(
            name.to_string(),
            CardEntry {
                copies: *copies,
                oversized: *oversized,
                ..Default::default()
            },
        );
    }
    job
}

fn letter(job: &PrintJob) -> LayoutStatistics {
    calculate_statistics(job, job.page_size_pt())
}

#[test]
fn test_letter_portrait_statistics() {
    let job = job_with(&[("a.png", 7, false), ("b.png", 3, false)]);
    let stats = letter(&job);

    assert_eq!(stats.columns, 3);
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.cards_requested, 10);
    assert_eq!(stats.cards_placed, 10);
    assert_eq!(stats.sheets, 2);
    assert_eq!(stats.output_pages, 2);
    assert_eq!(stats.cards_unplaced, 0);
}

#[test]
fn test_backsides_double_output_pages() {
    let mut job = job_with(&[("a.png", 10, false)]);
    job.backside_enabled = true;
    let stats = letter(&job);
    assert_eq!(stats.sheets, 2);
    assert_eq!(stats.output_pages, 4);
}

#[test]
fn test_landscape_statistics() {
    let mut job = job_with(&[("a.png", 9, false)]);
    job.orientation = Orientation::Landscape;
    let stats = letter(&job);
    assert_eq!((stats.columns, stats.rows), (4, 2));
    assert_eq!(stats.sheets, 2);
}

#[test]
fn test_oversized_statistics() {
    let mut job = job_with(&[("big.png", 1, true), ("a.png", 8, false)]);

    // Flag is ignored until the job enables oversized cards
    let stats = letter(&job);
    assert_eq!(stats.oversized_placed, 0);
    assert_eq!(stats.sheets, 1);

    job.oversized_enabled = true;
    let stats = letter(&job);
    assert_eq!(stats.oversized_placed, 1);
    assert_eq!(stats.cards_placed, 9);
    // Two of nine slots go to the oversized card, so one regular card
    // spills onto a second sheet
    assert_eq!(stats.sheets, 2);
}

#[test]
fn test_empty_job() {
    let stats = letter(&PrintJob::default());
    assert_eq!(stats.cards_requested, 0);
    assert_eq!(stats.sheets, 0);
    assert_eq!(stats.output_pages, 0);
}
