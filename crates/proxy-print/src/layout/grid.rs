//! Grid placement
//!
//! Assigns the cards of a packed page to concrete grid cells. Slot indices
//! run row by row; the scan direction decides whether a row is walked from
//! the left or from the right, which is how the backside grid mirrors the
//! front.

use crate::types::{ProxyError, Result};

use super::{GridCell, GridPosition, Page, PlacedCard, ScanDirection};

/// A fully placed sheet side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub direction: ScanDirection,
    /// Cells in visual row-major order (row 0 at the top, column 0 left)
    cells: Vec<GridCell>,
}

/// A card and the leftmost cell it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub position: GridPosition,
    pub card: PlacedCard,
}

impl Grid {
    /// An empty grid
    pub fn new(rows: usize, cols: usize, direction: ScanDirection) -> Self {
        Self {
            rows,
            cols,
            direction,
            cells: vec![GridCell::Empty; rows * cols],
        }
    }

    /// Number of slot indices
    pub fn slots(&self) -> usize {
        self.rows * self.cols
    }

    /// Visual position of a slot index
    pub fn position_of(&self, index: usize) -> GridPosition {
        let row = index / self.cols;
        let step = index % self.cols;
        let col = match self.direction {
            ScanDirection::LeftToRight => step,
            ScanDirection::RightToLeft => self.cols - 1 - step,
        };
        GridPosition::new(row, col)
    }

    pub fn cell(&self, position: GridPosition) -> &GridCell {
        &self.cells[position.row * self.cols + position.col]
    }

    fn slot(&self, index: usize) -> &GridCell {
        self.cell(self.position_of(index))
    }

    fn set_slot(&mut self, index: usize, cell: GridCell) {
        let position = self.position_of(index);
        self.cells[position.row * self.cols + position.col] = cell;
    }

    /// Slot `index` and the next one are free and on the same row
    fn has_free_pair(&self, index: usize) -> bool {
        index % self.cols != self.cols - 1
            && self.slot(index).is_empty()
            && self.slot(index + 1).is_empty()
    }

    /// Cards in slot order, each with the leftmost cell it covers
    pub fn placements(&self) -> Vec<Placement> {
        (0..self.slots())
            .filter_map(|index| match self.slot(index) {
                GridCell::Card(card) => {
                    let mut position = self.position_of(index);
                    // The partner cell sits to the left when scanning leftwards
                    if card.oversized && self.direction == ScanDirection::RightToLeft {
                        position.col -= 1;
                    }
                    Some(Placement {
                        position,
                        card: card.clone(),
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Number of cards on the grid
    pub fn card_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, GridCell::Card(_)))
            .count()
    }
}

/// Place a packed page on a grid.
///
/// Oversized cards go first, each at the earliest slot whose right
/// neighbour in scan order is free and on the same row; that neighbour is
/// reserved. Regular cards then fill the remaining empty slots in order.
pub fn place_cards(
    page: &Page,
    rows: usize,
    cols: usize,
    direction: ScanDirection,
) -> Result<Grid> {
    let mut grid = Grid::new(rows, cols, direction);
    let slots = grid.slots();

    let mut index = 0;
    for card in &page.oversized {
        while index < slots && !grid.has_free_pair(index) {
            index += 1;
        }
        if index >= slots {
            return Err(ProxyError::Layout(format!(
                "No room for oversized card {} on a {}x{} grid",
                card.name, cols, rows
            )));
        }
        grid.set_slot(
            index,
            GridCell::Card(PlacedCard {
                name: card.name.clone(),
                short_edge: card.short_edge,
                oversized: true,
            }),
        );
        grid.set_slot(index + 1, GridCell::Reserved);
        index += 2;
    }

    let mut free = (0..slots).filter(|&i| grid.slot(i).is_empty()).collect::<Vec<_>>();
    free.reverse();
    for card in &page.regular {
        let Some(index) = free.pop() else {
            return Err(ProxyError::Layout(format!(
                "No room for card {} on a {}x{} grid",
                card.name, cols, rows
            )));
        };
        grid.set_slot(
            index,
            GridCell::Card(PlacedCard {
                name: card.name.clone(),
                short_edge: card.short_edge,
                oversized: false,
            }),
        );
    }

    Ok(grid)
}

/// Front and back grids for one sheet. The back is the front placement
/// run in the mirrored direction.
pub fn place_sheet(page: &Page, rows: usize, cols: usize) -> Result<(Grid, Grid)> {
    let front = place_cards(page, rows, cols, ScanDirection::LeftToRight)?;
    let back = place_cards(page, rows, cols, ScanDirection::LeftToRight.mirrored())?;
    Ok((front, back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageCard;

    fn card(name: &str) -> PageCard {
        PageCard {
            name: name.to_string(),
            short_edge: false,
        }
    }

    fn page(regular: &[&str], oversized: &[&str]) -> Page {
        Page {
            regular: regular.iter().map(|n| card(n)).collect(),
            oversized: oversized.iter().map(|n| card(n)).collect(),
        }
    }

    fn name_at(grid: &Grid, row: usize, col: usize) -> Option<&str> {
        match grid.cell(GridPosition::new(row, col)) {
            GridCell::Card(card) => Some(card.name.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_regular_cards_fill_row_major() {
        let grid = place_cards(&page(&["a", "b", "c", "d"], &[]), 2, 3, ScanDirection::LeftToRight)
            .unwrap();
        assert_eq!(name_at(&grid, 0, 0), Some("a"));
        assert_eq!(name_at(&grid, 0, 2), Some("c"));
        assert_eq!(name_at(&grid, 1, 0), Some("d"));
        assert!(grid.cell(GridPosition::new(1, 1)).is_empty());
    }

    #[test]
    fn test_right_to_left_mirrors_columns() {
        let grid = place_cards(&page(&["a", "b", "c", "d"], &[]), 2, 3, ScanDirection::RightToLeft)
            .unwrap();
        assert_eq!(name_at(&grid, 0, 2), Some("a"));
        assert_eq!(name_at(&grid, 0, 0), Some("c"));
        assert_eq!(name_at(&grid, 1, 2), Some("d"));
    }

    #[test]
    fn test_oversized_reserves_neighbour() {
        let grid = place_cards(&page(&["a", "b"], &["big"]), 2, 3, ScanDirection::LeftToRight)
            .unwrap();
        assert_eq!(name_at(&grid, 0, 0), Some("big"));
        assert_eq!(grid.cell(GridPosition::new(0, 1)), &GridCell::Reserved);
        assert_eq!(name_at(&grid, 0, 2), Some("a"));
        assert_eq!(name_at(&grid, 1, 0), Some("b"));
    }

    #[test]
    fn test_oversized_never_wraps_rows() {
        // Three columns: the second oversized card cannot start in column 2
        let grid = place_cards(&page(&[], &["o1", "o2"]), 2, 3, ScanDirection::LeftToRight)
            .unwrap();
        assert_eq!(name_at(&grid, 0, 0), Some("o1"));
        assert!(grid.cell(GridPosition::new(0, 2)).is_empty());
        assert_eq!(name_at(&grid, 1, 0), Some("o2"));
        assert_eq!(grid.cell(GridPosition::new(1, 1)), &GridCell::Reserved);
    }

    #[test]
    fn test_back_placement_spans_same_cells_mirrored() {
        let (front, back) = place_sheet(&page(&["a"], &["big"]), 1, 3).unwrap();

        let front_big = &front.placements()[0];
        assert_eq!(front_big.position, GridPosition::new(0, 0));

        // On the back the anchor is column 2 and its partner column 1
        assert_eq!(name_at(&back, 0, 2), Some("big"));
        assert_eq!(back.cell(GridPosition::new(0, 1)), &GridCell::Reserved);
        let back_big = &back.placements()[0];
        assert_eq!(back_big.position, GridPosition::new(0, 1));
        assert_eq!(name_at(&back, 0, 0), Some("a"));
    }

    #[test]
    fn test_seven_plus_one_fills_grid() {
        let grid = place_cards(
            &page(&["1", "2", "3", "4", "5", "6", "7"], &["big"]),
            3,
            3,
            ScanDirection::LeftToRight,
        )
        .unwrap();
        assert_eq!(grid.card_count(), 8);
        for row in 0..3 {
            for col in 0..3 {
                assert!(!grid.cell(GridPosition::new(row, col)).is_empty());
            }
        }
    }

    #[test]
    fn test_overfull_page_is_an_error() {
        let result = place_cards(&page(&["a", "b", "c"], &[]), 1, 2, ScanDirection::LeftToRight);
        assert!(matches!(result, Err(ProxyError::Layout(_))));

        let result = place_cards(&page(&[], &["big"]), 2, 1, ScanDirection::LeftToRight);
        assert!(matches!(result, Err(ProxyError::Layout(_))));
    }
}
