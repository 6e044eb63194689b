//! Card packing
//!
//! Distributes every requested copy of every card onto pages of fixed
//! capacity. The policy is greedy first-fit over the pages that are still
//! open, with oversized copies packed first. Its tie-breaks decide which
//! page a borderline card lands on, so they must stay exactly as they are
//! for layouts to remain stable between runs.

use crate::options::PrintJob;

use super::{Packing, PackItem, Page, PageCard};

/// Expand the job's cards into one item per physical copy.
///
/// Oversized copies come first; the relative order inside each group
/// follows the job's card order.
pub fn expand_job(job: &PrintJob) -> Vec<PackItem> {
    let mut items: Vec<PackItem> = job
        .cards
        .iter()
        .flat_map(|(name, entry)| {
            let item = PackItem {
                name: name.clone(),
                short_edge: entry.backside_short_edge,
                oversized: job.is_oversized(name),
            };
            std::iter::repeat_n(item, entry.copies as usize)
        })
        .collect();

    // Stable: keeps job order inside both groups
    items.sort_by_key(|item| !item.oversized);
    items
}

/// Capacity of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCapacity {
    pub rows: usize,
    pub cols: usize,
}

impl PageCapacity {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Single-slot equivalents per page
    pub fn slots(&self) -> usize {
        self.rows * self.cols
    }

    /// Oversized cards that fit on one page
    pub fn oversized_slots(&self) -> usize {
        self.rows * (self.cols / 2)
    }

    fn accepts(&self, page: &Page, item: &PackItem) -> bool {
        let used = page.used_slots();
        if item.oversized {
            self.oversized_slots() > page.oversized.len() && used + 1 < self.slots()
        } else {
            used < self.slots()
        }
    }

    fn is_full(&self, page: &Page) -> bool {
        page.used_slots() >= self.slots()
    }

    fn can_ever_hold(&self, item: &PackItem) -> bool {
        if item.oversized {
            self.oversized_slots() > 0
        } else {
            self.slots() > 0
        }
    }
}

/// Pack items onto pages, first fit over the open pages in creation order.
///
/// A page closes as soon as it has no free slot left. Pages still open at
/// the end follow the closed ones in creation order.
pub fn pack_cards(items: &[PackItem], capacity: PageCapacity) -> Packing {
    let mut open: Vec<Page> = Vec::new();
    let mut closed: Vec<Page> = Vec::new();
    let mut unplaced = Vec::new();

    for item in items {
        if !capacity.can_ever_hold(item) {
            log::warn!(
                "{} does not fit a {}x{} sheet, skipping copy",
                item.name,
                capacity.cols,
                capacity.rows
            );
            unplaced.push(item.clone());
            continue;
        }

        let index = match open.iter().position(|page| capacity.accepts(page, item)) {
            Some(index) => index,
            None => {
                open.push(Page::default());
                open.len() - 1
            }
        };

        let card = PageCard {
            name: item.name.clone(),
            short_edge: item.short_edge,
        };
        let page = &mut open[index];
        if item.oversized {
            page.oversized.push(card);
        } else {
            page.regular.push(card);
        }

        if capacity.is_full(page) {
            closed.push(open.remove(index));
        }
    }

    closed.extend(open);
    Packing {
        pages: closed,
        unplaced,
    }
}

/// Expand and pack a whole job
pub fn pack_job(job: &PrintJob, capacity: PageCapacity) -> Packing {
    pack_cards(&expand_job(job), capacity)
}
