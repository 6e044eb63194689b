//! Rendering of card sheets
//!
//! - A drawing sink abstraction with a recording implementation
//! - The PDF sink built on lopdf
//! - The sheet walk that turns a job into drawing calls

mod pdf;
mod sheet;
mod sink;

pub use pdf::{PdfSink, image_matrix};
pub use sheet::{RenderSummary, render_job};
pub use sink::*;
