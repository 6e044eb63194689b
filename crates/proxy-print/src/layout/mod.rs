//! Layout calculation for card sheets
//!
//! This module handles everything between the job's card list and drawing:
//! - Packing copies onto pages (which card goes on which sheet)
//! - Grid placement (which cell a card occupies, front and back)
//! - Sheet geometry (cell dimensions and page-space positions)

mod geometry;
mod grid;
mod packing;
mod types;

pub use geometry::*;
pub use grid::*;
pub use packing::*;
pub use types::*;
