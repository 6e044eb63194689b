//! Layout data types
//!
//! These types represent the intermediate results between the job's
//! card list and rendering: packed pages, placed grids and cell geometry.

/// One physical copy of a card waiting to be packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    /// Source image filename
    pub name: String,
    /// Backside flips around the short edge
    pub short_edge: bool,
    /// Card spans two horizontal slots
    pub oversized: bool,
}

/// A card assigned to a page, before it gets a grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCard {
    pub name: String,
    pub short_edge: bool,
}

/// The cards assigned to one sheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub regular: Vec<PageCard>,
    pub oversized: Vec<PageCard>,
}

impl Page {
    /// Single-slot equivalents in use (an oversized card counts twice)
    pub fn used_slots(&self) -> usize {
        self.regular.len() + 2 * self.oversized.len()
    }

    pub fn card_count(&self) -> usize {
        self.regular.len() + self.oversized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.card_count() == 0
    }
}

/// Result of packing a job onto pages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packing {
    /// Pages in output order
    pub pages: Vec<Page>,
    /// Copies the layout cannot hold at all (e.g. oversized cards on a
    /// single-column sheet)
    pub unplaced: Vec<PackItem>,
}

/// Order in which grid slot indices walk a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Front side
    LeftToRight,
    /// Mirrored, for the backside of a duplex sheet
    RightToLeft,
}

impl ScanDirection {
    pub fn mirrored(self) -> Self {
        match self {
            ScanDirection::LeftToRight => ScanDirection::RightToLeft,
            ScanDirection::RightToLeft => ScanDirection::LeftToRight,
        }
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A card occupying a grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCard {
    pub name: String,
    pub short_edge: bool,
    pub oversized: bool,
}

/// Content of one grid cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridCell {
    #[default]
    Empty,
    Card(PlacedCard),
    /// Second cell of an oversized card placed in the previous slot
    Reserved,
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty)
    }
}

/// Drawing rotation of a card image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRotation {
    None,
    Clockwise90,
    CounterClockwise90,
    Rotate180,
}

impl CardRotation {
    /// Rotation for a card, depending on the sheet side, its size and
    /// the duplex flip axis.
    ///
    /// Oversized cards lie on their side across two slots, and backsides
    /// must turn so they register under the front after the sheet flips.
    pub fn for_card(is_backside: bool, oversized: bool, short_edge: bool) -> Self {
        match (is_backside, oversized, short_edge) {
            (false, true, _) => CardRotation::Clockwise90,
            (false, false, _) => CardRotation::None,
            (true, true, true) => CardRotation::Clockwise90,
            (true, true, false) => CardRotation::CounterClockwise90,
            (true, false, true) => CardRotation::Rotate180,
            (true, false, false) => CardRotation::None,
        }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Same rectangle moved horizontally
    pub fn shifted(&self, dx: f32) -> Rect {
        Rect::new(self.x + dx, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_table() {
        use CardRotation::*;
        let cases = [
            ((false, true, false), Clockwise90),
            ((false, true, true), Clockwise90),
            ((false, false, false), None),
            ((false, false, true), None),
            ((true, true, true), Clockwise90),
            ((true, true, false), CounterClockwise90),
            ((true, false, true), Rotate180),
            ((true, false, false), None),
        ];
        for ((back, oversized, short_edge), expected) in cases {
            assert_eq!(
                CardRotation::for_card(back, oversized, short_edge),
                expected,
                "back={back} oversized={oversized} short_edge={short_edge}"
            );
        }
    }

    #[test]
    fn test_page_slots() {
        let card = |name: &str| PageCard {
            name: name.to_string(),
            short_edge: false,
        };
        let page = Page {
            regular: vec![card("a"), card("b")],
            oversized: vec![card("c")],
        };
        assert_eq!(page.used_slots(), 4);
        assert_eq!(page.card_count(), 3);
        assert!(Page::default().is_empty());
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.top(), 60.0);
        assert_eq!(rect.shifted(-5.0).x, 5.0);
    }
}
